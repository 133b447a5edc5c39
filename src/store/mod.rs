//! STORE - the fact store contract.
//!
//! A thin, passive substrate: one table per class name and per derived
//! property-side name (`value, polarity, weight, origin`), one table per
//! property (`left_value, right_value, polarity, weight, origin`), and a
//! metadata table holding JSON blobs. `FactStore` is a trait so
//! `materialize`, `repair` and `query::plan` depend on the contract rather
//! than on `rusqlite` directly - the teacher keeps the same separation
//! between its storage trait/engine and `StorageError` in
//! `src/storage_engine/mod.rs` / `src/storage/error.rs`.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;

/// One asserted row, polarity-tagged and provenance-weighted.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryRow {
    pub value: String,
    pub positive: bool,
    pub weight: f64,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRow {
    pub left_value: String,
    pub right_value: String,
    pub positive: bool,
    pub weight: f64,
    pub origin: String,
}

/// The four keys under which `save_metadata`/`load_metadata` persist the
/// kernel's JSON-encoded state, per spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    TBox,
    Origins,
    ClassNames,
    ObjectPropertyNames,
}

impl MetadataKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::TBox => "TBox",
            MetadataKey::Origins => "origins",
            MetadataKey::ClassNames => "classNames",
            MetadataKey::ObjectPropertyNames => "objectPropertyNames",
        }
    }
}

/// The left/right mangling applied to an object property's domain/range
/// sides. Kept as a two-suffix shape matching
/// `examples/original_source/godl-import/import.go`'s
/// `P__GoDL_LEFT__`/`P__GoDL_RIGHT__`, renamed to this crate's vocabulary.
pub fn left_side_table(property: &str) -> String {
    format!("{property}__dl_left__")
}

pub fn right_side_table(property: &str) -> String {
    format!("{property}__dl_right__")
}

pub trait FactStore {
    /// Creates one table per class/derived-side name and one per property.
    fn create_tables(&self, class_names: &[String], property_names: &[String]) -> Result<()>;

    fn insert_unary(&self, table: &str, row: &UnaryRow) -> Result<()>;
    fn insert_binary(&self, table: &str, row: &BinaryRow) -> Result<()>;

    /// Copies every positive (or, if `flip_polarity`, every positive row
    /// re-tagged negative) row of `src` into `dst`. Used by MAT's
    /// equivalence saturation and induction steps; insert-ignore, so
    /// idempotent.
    fn copy_unary(&self, src: &str, dst: &str, flip_polarity: bool) -> Result<()>;
    fn copy_binary(&self, src: &str, dst: &str, flip_polarity: bool) -> Result<()>;

    /// All distinct `(value, weight, origin)` triples in `table` that carry
    /// both polarities and are jointly witnessed by the given origin set,
    /// used by REP's degree computation.
    fn polarity_collisions(&self, table: &str, origins: &[String]) -> Result<Vec<(f64, String)>>;

    /// Deletes every row of `table` with the given origin and weight `<=
    /// threshold`. NaN weights never satisfy `<=`, so rows with NaN weight
    /// are never cut - this falls directly out of `f64`'s `PartialOrd`.
    fn cut(&self, table: &str, origin: &str, threshold: f64) -> Result<()>;

    /// Runs an arbitrary selection plan (produced by `query::plan`) and
    /// returns the rows as a vector of tab-width-agnostic string columns.
    fn select(&self, sql: &str, n_columns: usize) -> Result<Vec<Vec<String>>>;

    fn save_metadata(&self, key: MetadataKey, json: &str) -> Result<()>;
    fn load_metadata(&self, key: MetadataKey) -> Result<String>;

    /// `ANALYZE`-backed row-count statistics per table, for `compile -s`.
    fn table_stats(&self, tables: &[String]) -> Result<Vec<(String, u64)>>;
}
