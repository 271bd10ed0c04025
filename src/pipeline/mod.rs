pub mod ensemble;
pub mod features;
pub mod embedding;
pub mod classify;
pub mod duplicate;
pub mod processor;
