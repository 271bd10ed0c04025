pub mod detector;
pub mod hash;
pub mod types;

pub use detector::*;
pub use hash::sha256_hex;
pub use types::*;
