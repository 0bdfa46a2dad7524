//! Single-layer linear network and its sample encoding.
//!
//! [`BatchEncoder`] turns decoded events into n-hot rows; [`NdlNetwork`]
//! consumes them one at a time with the online delta rule.

pub mod encoder;
pub mod ndl;

pub use encoder::BatchEncoder;
pub use ndl::{IndexError, NdlNetwork};
