//! Classification
//!
//! - `normalizer`: canonical taxonomy over the raw model reply
//! - `classifier`: gateway call + retry loop producing one result per ticket

pub mod classifier;
pub mod normalizer;

pub use classifier::{Classifier, RATE_LIMIT_EXHAUSTED, RetryPolicy};
pub use normalizer::{RawClassification, normalize};
