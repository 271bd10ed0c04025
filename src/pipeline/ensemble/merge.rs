use super::confidence::{significant_chars, thresholds};
use super::types::{DecisionReason, MergedText, RawOcrResult};

/// Merge per-engine OCR results into one text using the default high-confidence threshold.
///
/// The first result is the primary engine. Pure function: no I/O, no state.
pub fn merge(results: &[RawOcrResult]) -> MergedText {
    merge_with_threshold(results, thresholds::HIGH_CONF)
}

/// Merge with an explicit high-confidence threshold (engine scale, 0-100).
///
/// Rules, first match wins:
/// 1. exactly one engine at or above `high_conf` wins;
/// 2. several engines at or above `high_conf`: longest text wins, earliest on ties;
/// 3. primary has < 20 non-whitespace chars and a secondary has > 50: that secondary wins;
/// 4. strictly highest confidence wins, primary on ties.
pub fn merge_with_threshold(results: &[RawOcrResult], high_conf: f32) -> MergedText {
    let Some(primary) = results.first() else {
        return MergedText {
            text: String::new(),
            winning_engine: String::new(),
            decision_reason: DecisionReason::NoInput,
        };
    };

    if results.len() == 1 {
        return decide(primary, DecisionReason::SingleEngine);
    }

    let confident: Vec<&RawOcrResult> = results.iter().filter(|r| r.confidence >= high_conf).collect();

    match confident.as_slice() {
        [only] => return decide(only, DecisionReason::HighConfidenceSingle),
        [first, rest @ ..] => {
            let mut best = *first;
            for candidate in rest {
                if candidate.text.chars().count() > best.text.chars().count() {
                    best = *candidate;
                }
            }
            return decide(best, DecisionReason::HighConfidenceLonger);
        }
        [] => {}
    }

    if significant_chars(&primary.text) < thresholds::PRIMARY_MIN_CHARS {
        if let Some(secondary) = results[1..]
            .iter()
            .find(|r| significant_chars(&r.text) > thresholds::SECONDARY_MIN_CHARS)
        {
            return decide(secondary, DecisionReason::PrimaryTooShort);
        }
    }

    let mut best = primary;
    for candidate in &results[1..] {
        if candidate.confidence > best.confidence {
            best = candidate;
        }
    }
    decide(best, DecisionReason::HigherConfidence)
}

fn decide(winner: &RawOcrResult, reason: DecisionReason) -> MergedText {
    tracing::debug!(
        engine = %winner.engine_id,
        confidence = winner.confidence,
        reason = reason.as_str(),
        "OCR ensemble decision"
    );
    MergedText {
        text: winner.text.clone(),
        winning_engine: winner.engine_id.clone(),
        decision_reason: reason,
    }
}
