//! InnoDB schema fusion and record decoding.
//!
//! This module contains the types that rebuild a table's physical layout
//! from its SDI data dictionary document and decode compact-format records
//! against it. Start with [`table::TableSchema::from_sdi_json`], then build
//! [`record::RecordView`]s against the table's indexes.

pub mod column;
pub mod constants;
pub mod index;
pub mod page;
pub mod properties;
pub mod record;
pub mod sdi;
pub mod table;
