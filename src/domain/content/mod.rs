pub mod fingerprint;
pub mod latex;
pub mod normalizer;

pub use fingerprint::fingerprint;
pub use normalizer::{normalize, CONTENT_SEGMENT_DELIMITER};
