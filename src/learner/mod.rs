//! Learner module - high-level interface between network and corpus.
//!
//! The [`Learner`] glues the event source, the encoder and the network
//! together: it clamps learning requests to the events actually available,
//! resolves token-level weight queries, and exposes progress introspection.

pub mod table;
pub mod training;

pub use table::WeightTable;
pub use training::Learner;
