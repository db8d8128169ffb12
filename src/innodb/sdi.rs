//! SDI data-dictionary document model.
//!
//! MySQL 8.0+ embeds complete table definitions as SDI JSON inside every
//! `.ibd` file. This module deserializes the (already-decompressed) JSON
//! into typed structs. Fields the schema-fusion pass depends on are
//! mandatory: a document missing one of them, or carrying it with the
//! wrong shape, fails with [`IbdError::Malformed`] and the table is
//! discarded while sibling SDI records keep loading.
//!
//! Decompression and extraction of the SDI blob from its B-tree is the
//! caller's job; this module starts at the JSON text.

use serde::Deserialize;

use crate::IbdError;

/// Top-level SDI envelope wrapping a dd_object.
#[derive(Debug, Deserialize)]
pub struct SdiEnvelope {
    /// MySQL server version ID that wrote the SDI (e.g. 80040 for 8.0.40).
    #[serde(default)]
    pub mysqld_version_id: u64,
    /// Object type: "Table" or "Tablespace".
    #[serde(default)]
    pub dd_object_type: String,
    /// The data dictionary object.
    pub dd_object: DdTable,
}

/// Data dictionary table definition.
#[derive(Debug, Deserialize)]
pub struct DdTable {
    /// Table name.
    pub name: String,
    /// Schema (database) name.
    #[serde(default)]
    pub schema_ref: String,
    /// MySQL version the table was created/altered under.
    #[serde(default)]
    pub mysql_version_id: u32,
    /// Hidden kind: 1=visible, 2=system, 3=SE-hidden, 4=DDL-hidden.
    #[serde(default = "default_visible")]
    pub hidden: u64,
    /// Serialized table options (`key=value;` string).
    #[serde(default)]
    pub options: String,
    /// Serialized engine-private attributes (`key=value;` string).
    #[serde(default)]
    pub se_private_data: String,
    /// Engine-side table id.
    #[serde(default)]
    pub se_private_id: u64,
    /// Storage engine name.
    #[serde(default)]
    pub engine: String,
    /// Row format code (1=FIXED, 2=DYNAMIC, 3=COMPRESSED, 4=REDUNDANT, 5=COMPACT).
    pub row_format: u64,
    /// Partition type (0 = not partitioned).
    #[serde(default)]
    pub partition_type: u64,
    /// Default collation id.
    #[serde(default)]
    pub collation_id: u64,
    /// Column definitions, in declaration order.
    pub columns: Vec<DdColumn>,
    /// Index definitions, in declaration order (clustered first).
    pub indexes: Vec<DdIndex>,
}

/// Data dictionary column definition.
#[derive(Debug, Deserialize)]
pub struct DdColumn {
    /// Column name.
    pub name: String,
    /// Logical type code (1..=31; see `column::LogicalType`).
    #[serde(rename = "type")]
    pub dd_type: u64,
    /// Whether the column allows NULL.
    pub is_nullable: bool,
    /// Whether the column is unsigned.
    #[serde(default)]
    pub is_unsigned: bool,
    /// Whether the column is zerofill.
    #[serde(default)]
    pub is_zerofill: bool,
    /// Whether the column is AUTO_INCREMENT.
    #[serde(default)]
    pub is_auto_increment: bool,
    /// Whether the column is virtual (generated, not stored).
    #[serde(default)]
    pub is_virtual: bool,
    /// Hidden kind: 1=visible, 2=SE-hidden, 3=SQL-hidden, 4=user-hidden.
    pub hidden: u64,
    /// Position in the declared column list (1-based).
    pub ordinal_position: u32,
    /// Declared length in bytes.
    #[serde(default)]
    pub char_length: u32,
    /// Numeric precision (DECIMAL).
    #[serde(default)]
    pub numeric_precision: u32,
    /// Numeric scale (DECIMAL).
    #[serde(default)]
    pub numeric_scale: u32,
    /// Fractional seconds precision (temporal v2 types).
    #[serde(default)]
    pub datetime_precision: u32,
    /// Whether the column has no default.
    #[serde(default)]
    pub has_no_default: bool,
    /// Default value as UTF-8 text.
    #[serde(default)]
    pub default_value_utf8: String,
    /// Whether the UTF-8 default is NULL.
    #[serde(default)]
    pub default_value_utf8_null: bool,
    /// Collation id for this column.
    #[serde(default)]
    pub collation_id: u64,
    /// SQL type string from the server (e.g. "varchar(255)").
    #[serde(default)]
    pub column_type_utf8: String,
    /// ENUM/SET value elements.
    #[serde(default)]
    pub elements: Vec<DdColumnElement>,
    /// Serialized column options.
    #[serde(default)]
    pub options: String,
    /// Serialized engine-private attributes (instant ADD/DROP metadata
    /// lives here: `version_added`, `version_dropped`, `physical_pos`,
    /// `default`, `default_null`).
    #[serde(default)]
    pub se_private_data: String,
}

/// ENUM or SET value element.
#[derive(Debug, Default, Deserialize)]
pub struct DdColumnElement {
    /// The element value string.
    #[serde(default)]
    pub name: String,
    /// 1-based element index.
    #[serde(default)]
    pub index: u64,
}

/// Data dictionary index definition.
#[derive(Debug, Deserialize)]
pub struct DdIndex {
    /// Index name.
    pub name: String,
    /// True for the implicit clustered index of a table without an
    /// explicit primary key.
    pub hidden: bool,
    /// Whether the index was generated by the server.
    #[serde(default)]
    pub is_generated: bool,
    /// Position in the index list (1-based).
    #[serde(default)]
    pub ordinal_position: u32,
    /// Index type: 1=PRIMARY, 2=UNIQUE, 3=MULTIPLE, 4=FULLTEXT, 5=SPATIAL.
    #[serde(rename = "type")]
    pub index_type: u64,
    /// Algorithm code (2=BTREE, 3=RTREE, 4=HASH, 5=FULLTEXT).
    #[serde(default)]
    pub algorithm: u64,
    /// Whether the index is visible to the optimizer.
    #[serde(default)]
    pub is_visible: bool,
    /// Serialized index options.
    #[serde(default)]
    pub options: String,
    /// Serialized engine-private attributes (`id`, `root`, ...).
    #[serde(default)]
    pub se_private_data: String,
    /// Index elements (column references), in key order.
    pub elements: Vec<DdIndexElement>,
}

/// Data dictionary index element (column reference).
#[derive(Debug, Deserialize)]
pub struct DdIndexElement {
    /// 1-based position within the element list.
    #[serde(default)]
    pub ordinal_position: u32,
    /// Key part length in bytes; 4294967295 means the full column.
    #[serde(default = "default_full_length")]
    pub length: u64,
    /// Sort order: 2=ASC, 1=DESC.
    #[serde(default)]
    pub order: u64,
    /// Whether this element is an internal (hidden) suffix rather than a
    /// user-declared key part.
    #[serde(default)]
    pub hidden: bool,
    /// 0-based index into the table's columns array.
    pub column_opx: u64,
}

fn default_visible() -> u64 {
    1
}

fn default_full_length() -> u64 {
    u64::from(u32::MAX)
}

/// Sentinel meaning "full column" in [`DdIndexElement::length`].
pub const INDEX_ELEMENT_FULL_LENGTH: u64 = u32::MAX as u64;

/// Parse and validate an SDI table document.
///
/// Fails with [`IbdError::Malformed`] when a required field is missing or
/// mis-typed, when the envelope is not a Table object, when an index
/// element references a column out of range, or when an index's element
/// positions disagree with its array length.
///
/// # Examples
///
/// ```
/// use ibd::innodb::sdi::parse_sdi_table;
///
/// let json = r#"{
///   "mysqld_version_id": 80040,
///   "dd_object_type": "Table",
///   "dd_object": {
///     "name": "t",
///     "mysql_version_id": 80040,
///     "row_format": 2,
///     "columns": [
///       { "name": "a", "type": 4, "is_nullable": false, "hidden": 1,
///         "ordinal_position": 1 }
///     ],
///     "indexes": [
///       { "name": "PRIMARY", "type": 1, "hidden": false,
///         "elements": [ { "column_opx": 0, "length": 4,
///                         "ordinal_position": 1 } ] }
///     ]
///   }
/// }"#;
///
/// let env = parse_sdi_table(json).unwrap();
/// assert_eq!(env.dd_object.name, "t");
/// assert_eq!(env.dd_object.columns.len(), 1);
/// ```
pub fn parse_sdi_table(json: &str) -> Result<SdiEnvelope, IbdError> {
    let env: SdiEnvelope = serde_json::from_str(json)
        .map_err(|e| IbdError::Malformed(format!("failed to parse SDI JSON: {}", e)))?;
    if !env.dd_object_type.is_empty() && env.dd_object_type != "Table" {
        return Err(IbdError::Malformed(format!(
            "expected a Table object, found {:?}",
            env.dd_object_type
        )));
    }
    validate_dd_table(&env.dd_object)?;
    Ok(env)
}

/// Structural validation of a parsed dd_object.
pub fn validate_dd_table(dd: &DdTable) -> Result<(), IbdError> {
    if dd.columns.is_empty() {
        return Err(IbdError::Malformed(format!(
            "table {} declares no columns",
            dd.name
        )));
    }
    for idx in &dd.indexes {
        if idx.elements.is_empty() {
            return Err(IbdError::Malformed(format!(
                "index {} declares no elements",
                idx.name
            )));
        }
        for (i, elem) in idx.elements.iter().enumerate() {
            if elem.column_opx as usize >= dd.columns.len() {
                return Err(IbdError::Malformed(format!(
                    "index {} element {} references column {} of {}",
                    idx.name,
                    i,
                    elem.column_opx,
                    dd.columns.len()
                )));
            }
            // The element list is positional; a declared position that
            // disagrees with the array means the document lost elements.
            if elem.ordinal_position != 0 && elem.ordinal_position as usize != i + 1 {
                return Err(IbdError::Malformed(format!(
                    "index {} element count mismatch: position {} at array slot {}",
                    idx.name,
                    elem.ordinal_position,
                    i + 1
                )));
            }
        }
    }
    Ok(())
}
