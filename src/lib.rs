//! `dlreason` - a weighted, multi-source Description-Logic knowledge base.
//!
//! A TBox (`rel`) of named classes and object-property sides related by
//! subsumption and disjointness is closed once, then used to materialize
//! (`materialize`) an ABox of polarity- and provenance-tagged facts held in
//! a `FactStore` (`store`). `repair` measures and restores per-origin
//! consistency. `query` compiles a small conjunctive rule language over the
//! materialized store. `dl` parses the prefix-notation surface syntax both
//! the TBox and ABox documents are written in.

pub mod config;
pub mod dl;
pub mod error;
pub mod materialize;
pub mod rel;
pub mod repair;
pub mod query;
pub mod store;
pub mod weight;

pub use error::{KernelError, Result};
pub use rel::Relation;
pub use store::{FactStore, SqliteStore};
