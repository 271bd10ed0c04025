use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::types::{BoundingBox, OcrBackend, OcrPageResult, OcrToken};
use super::EnsembleError;

/// Tesseract invoked as an external binary, reading the image from stdin and
/// writing TSV to stdout.
pub struct TesseractCli {
    binary: PathBuf,
    languages: String,
    engine_id: String,
}

impl TesseractCli {
    /// Defaults to the `tesseract` binary on `PATH` with German + English models.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            languages: "deu+eng".to_string(),
            engine_id: "tesseract".to_string(),
        }
    }

    /// Set language(s) for OCR (e.g., "deu", "deu+eng")
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.languages = langs.to_string();
        self
    }

    pub fn with_binary(mut self, binary: &Path) -> Self {
        self.binary = binary.to_path_buf();
        self
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractCli {
    fn engine_id(&self) -> &str {
        &self.engine_id
    }

    fn available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, EnsembleError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.languages, "--oem", "3", "--psm", "3", "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EnsembleError::BackendUnavailable(format!("{}: {e}", self.binary.display())))?;

        // stdin is closed at the end of this block; the child is always reaped
        // below, even when it stopped reading early.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_bytes),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EnsembleError::Recognition {
                engine: self.engine_id.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result?;

        let tsv = String::from_utf8(output.stdout)
            .map_err(|e| EnsembleError::EncodingError(e.to_string()))?;

        Ok(parse_tesseract_tsv(&tsv))
    }
}

/// Mock OCR engine for unit testing without a real engine.
pub struct MockOcrEngine {
    pub engine_id: String,
    pub text: String,
    pub confidence: f32,
}

impl MockOcrEngine {
    pub fn new(engine_id: &str, text: &str, confidence: f32) -> Self {
        Self {
            engine_id: engine_id.to_string(),
            text: text.to_string(),
            confidence,
        }
    }
}

impl OcrBackend for MockOcrEngine {
    fn engine_id(&self) -> &str {
        &self.engine_id
    }

    fn available(&self) -> bool {
        true
    }

    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, EnsembleError> {
        let tokens = self
            .text
            .split_whitespace()
            .map(|w| OcrToken {
                text: w.to_string(),
                confidence: self.confidence,
                bounding_box: None,
            })
            .collect();

        Ok(OcrPageResult {
            text: self.text.clone(),
            tokens,
        })
    }
}

/// Engine that always errors; `available` controls whether it survives resolution.
pub struct FailingOcrEngine {
    pub engine_id: String,
    pub available: bool,
}

impl FailingOcrEngine {
    pub fn new(engine_id: &str, available: bool) -> Self {
        Self {
            engine_id: engine_id.to_string(),
            available,
        }
    }
}

impl OcrBackend for FailingOcrEngine {
    fn engine_id(&self) -> &str {
        &self.engine_id
    }

    fn available(&self) -> bool {
        self.available
    }

    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, EnsembleError> {
        Err(EnsembleError::Recognition {
            engine: self.engine_id.clone(),
            reason: "model failed to load".into(),
        })
    }
}

/// Parse Tesseract TSV output into page text and per-word tokens.
/// TSV columns: level page_num block_num par_num line_num word_num left top width height conf text
/// Level 5 = individual word entries. Confidence stays on the 0-100 scale; Tesseract
/// reports -1 for words it can't score.
pub fn parse_tesseract_tsv(tsv: &str) -> OcrPageResult {
    let mut tokens = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut current_line: Option<(&str, &str, &str, &str)> = None;

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = match fields[0].parse() {
            Ok(l) => l,
            Err(_) => continue,
        };
        if level != 5 {
            continue;
        }

        let conf: f32 = match fields[10].parse() {
            Ok(c) => c,
            Err(_) => continue,
        };

        let word = fields[11].trim();
        if word.is_empty() {
            continue;
        }

        // page, block, paragraph, line
        let line_key = (fields[1], fields[2], fields[3], fields[4]);
        match lines.last_mut() {
            Some(last) if current_line == Some(line_key) => {
                last.push(' ');
                last.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_line = Some(line_key);
            }
        }

        tokens.push(OcrToken {
            text: word.to_string(),
            confidence: conf,
            bounding_box: parse_bounding_box(fields[6], fields[7], fields[8], fields[9]),
        });
    }

    OcrPageResult {
        text: lines.join("\n"),
        tokens,
    }
}

/// Returns None if any field fails to parse.
fn parse_bounding_box(left: &str, top: &str, width: &str, height: &str) -> Option<BoundingBox> {
    Some(BoundingBox {
        x: left.parse().ok()?,
        y: top.parse().ok()?,
        width: width.parse().ok()?,
        height: height.parse().ok()?,
    })
}
