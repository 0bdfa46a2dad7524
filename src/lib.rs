//! # NDL Core
//!
//! A naive discriminative learning engine: a single-layer linear associative
//! model trained incrementally on symbolic cue → outcome events extracted
//! from text. Events stream lazily from a tab-separated file; every distinct
//! symbol gets a stable dense index, and the weight matrix is updated one
//! event at a time with the Rescorla-Wagner / Widrow-Hoff delta rule.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Write;
//! use ndl_core::Learner;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // event files are tab-separated with a mandatory header
//! let mut file = tempfile::NamedTempFile::new()?;
//! writeln!(file, "Cues\tOutcomes\tFrequency")?;
//! writeln!(file, "b_an_ban\tbanana\t1")?;
//! writeln!(file, "b_an_and\tbandana\t1")?;
//! file.flush()?;
//!
//! let mut learner = Learner::new(file.path())?;
//! learner.learn_all()?;
//!
//! let table = learner.named_weights(None, None);
//! let weight = table.value("an", "banana").unwrap();
//! assert!(weight > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Network and preprocessing configuration via TOML
//! - [`events`] - Event files, lazy event streams and symbol indexing
//! - [`neural`] - N-hot encoding and the online linear network
//! - [`learner`] - Training orchestration and named weight tables
//! - [`preprocess`] - Raw corpus text into event files
//! - [`logging`] - JSON line-delimited diagnostics

pub mod config;
pub mod events;
pub mod learner;
pub mod logging;
pub mod neural;
pub mod preprocess;

pub use config::{Activation, ConfigError, InitScheme, NetworkConfig, PreprocessingConfig};
pub use events::{Event, EventError, EventFile, EventStream, Numberer};
pub use learner::{Learner, WeightTable};
pub use neural::{BatchEncoder, IndexError, NdlNetwork};
pub use preprocess::Preprocessor;
