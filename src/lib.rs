//! Offline InnoDB schema reconstruction and record decoding.
//!
//! The `ibd-schema` crate (library name `ibd`) rebuilds relational table
//! schemas from the SDI data dictionary document embedded in MySQL 8.0+
//! tablespace files, then uses the rebuilt schema to decode the physical
//! byte layout of individual rows without a running server.
//!
//! The crate is strictly read-only and performs no I/O of its own: page
//! buffers and the already-decompressed SDI JSON are supplied by the caller
//! (see [`innodb::page::PageSource`] for the page boundary). Its job is the
//! hard middle: fusing the declarative dictionary description with the
//! engine's physical layout rules — including both generations of instant
//! ADD/DROP COLUMN — and computing, for an arbitrary record, the exact byte
//! range and status of every column.
//!
//! # Quick example
//!
//! ```no_run
//! use ibd::innodb::table::TableSchema;
//! use ibd::innodb::record::RecordView;
//!
//! let sdi_json = std::fs::read_to_string("table_sdi.json").unwrap();
//! let table = TableSchema::from_sdi_json(&sdi_json).unwrap();
//! let index = table.clustered().unwrap();
//!
//! let page: Vec<u8> = std::fs::read("page_4.bin").unwrap();
//! let rec = RecordView::parse(&table, index, &page, 99 + 13).unwrap();
//! for f in rec.fields() {
//!     println!("{:?} {}..{} {:?}", f.name, f.start, f.end, f.status);
//! }
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`innodb::sdi`] | Typed SDI data-dictionary document model (serde) |
//! | [`innodb::properties`] | `key=value;` engine attribute string parsing |
//! | [`innodb::column`] | Fused logical + physical column descriptions |
//! | [`innodb::index`] | Index layouts: physical field lists, nullable tables |
//! | [`innodb::table`] | Schema fusion: column catalog, system columns, indexes |
//! | [`innodb::record`] | Per-record offset and status computation |
//! | [`innodb::page`] | Page-I/O boundary: headers, record chains, `PageSource` |
//! | [`innodb::constants`] | Record/page/dictionary format constants |
//!
//! ## Support boundaries
//!
//! Partitioned, encrypted, and out-of-range-version tables, plus full-text,
//! spatial, and virtual-column-keyed indexes, are recognized and reported
//! but excluded from record decoding (they keep a reason mask, see
//! [`innodb::table::TableSchema::unsupported_reason`]). REDUNDANT row format
//! is rejected; only DYNAMIC and COMPACT records are decoded.

pub mod innodb;

use thiserror::Error;

/// Errors returned by `ibd` operations.
///
/// The variants mirror the crate's failure taxonomy: a malformed document
/// discards the entity being parsed (siblings keep loading), a corrupt
/// record aborts the current record/page (siblings may continue), and an
/// unsupported operation means the caller ignored an entity's capability
/// mask. Nothing is ever silently substituted for a failed decode.
#[derive(Error, Debug)]
pub enum IbdError {
    /// An I/O error occurred in a [`innodb::page::PageSource`] implementation.
    #[error("I/O error: {0}")]
    Io(String),

    /// A required field of the SDI document is missing or mis-typed, or the
    /// document is internally inconsistent. Fatal for the table or index
    /// being constructed.
    #[error("Malformed SDI document: {0}")]
    Malformed(String),

    /// A record or page image violates the format: an offset computation
    /// would run past the supplied buffer, or header bits contradict the
    /// schema. Fatal for the current record/page.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The operation targets an entity that was excluded from record
    /// decoding (unsupported index/table, or REDUNDANT row format).
    #[error("Unsupported: {0}")]
    Unsupported(String),
}
