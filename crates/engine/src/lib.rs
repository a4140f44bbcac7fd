//! `seqrecon-engine` — Multi-judge ranking reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded ranking and auxiliary records,
//! returns canonical mappings, aggregated ratings, and join results.
//! No CLI or file IO dependencies.

pub mod aggregate;
pub mod agreement;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod join;
pub mod model;
pub mod resolve;

pub use config::MergeConfig;
pub use engine::{run, MergeInput, MergeResult};
pub use error::MergeError;
pub use model::{AuxRow, CanonicalMap, JoinOutput, MergeEdge, RatingMap, ScoreRow};
