//! Corpus preprocessing: raw sentence-per-line text into event files.
//!
//! The learner itself only consumes the tab-separated event-file shape; this
//! module produces it.

pub mod corpus;

pub use corpus::{compress_events, Preprocessor};
