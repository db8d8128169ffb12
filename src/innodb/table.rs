//! Table schema fusion.
//!
//! [`TableSchema`] owns the column catalog (declaration order plus a
//! second, physical ordering that includes implicit system columns and
//! retained instantly-dropped columns) and orchestrates index layout
//! construction. Fusion is a one-shot pass over the parsed SDI document:
//! run it once per document, then share the result freely across reader
//! threads — nothing here mutates after construction returns.
//!
//! Tables the reader recognizes but cannot decode (partitioned,
//! encrypted, FTS auxiliary, out-of-range server version) are not errors:
//! they parse to a schema carrying a reason mask, with their indexes
//! listed in declared shape only.

use crate::innodb::column::{ColumnModel, FieldKind, LogicalType, PhysicalType};
use crate::innodb::constants::{
    DATA_N_SYS_COLS, DATA_ROLL_PTR_LEN, DATA_ROW_ID_LEN, DATA_TRX_ID_LEN,
};
use crate::innodb::index::{BuildFacts, IndexLayout};
use crate::innodb::properties::Properties;
use crate::innodb::sdi::{parse_sdi_table, validate_dd_table, DdTable};
use crate::IbdError;

/// Name of the implicit full-text document id column.
pub const FTS_DOC_ID_COL_NAME: &str = "FTS_DOC_ID";
/// Name of the auxiliary index over the document id column.
pub const FTS_DOC_ID_INDEX_NAME: &str = "FTS_DOC_ID_INDEX";

/// Unsupported-table reason bits.
pub const UNSUPP_TABLE_PARTITION: u32 = 0x1;
pub const UNSUPP_TABLE_ENCRYPT: u32 = 0x2;
pub const UNSUPP_TABLE_FTS_AUX_INDEX: u32 = 0x4;
pub const UNSUPP_TABLE_FTS_COM_INDEX: u32 = 0x8;
pub const UNSUPP_TABLE_VERSION: u32 = 0x10;
const UNSUPP_TABLE_MASK: u32 = 0x1F;

/// Lowest and highest server versions whose SDI layout this reader has
/// been verified against.
const MIN_SUPPORTED_VERSION: u32 = 80016;
const MAX_SUPPORTED_VERSION: u32 = 80040;

/// Declared row format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    Fixed = 1,
    Dynamic,
    Compressed,
    Redundant,
    Compact,
    Paged,
}

impl RowFormat {
    fn from_dd(code: u64) -> Result<Self, IbdError> {
        Ok(match code {
            1 => RowFormat::Fixed,
            2 => RowFormat::Dynamic,
            3 => RowFormat::Compressed,
            4 => RowFormat::Redundant,
            5 => RowFormat::Compact,
            6 => RowFormat::Paged,
            other => {
                return Err(IbdError::Malformed(format!(
                    "unrecognized row format code {}",
                    other
                )))
            }
        })
    }

    /// SQL-facing name.
    pub fn name(&self) -> &'static str {
        match self {
            RowFormat::Fixed => "FIXED",
            RowFormat::Dynamic => "DYNAMIC",
            RowFormat::Compressed => "COMPRESSED",
            RowFormat::Redundant => "REDUNDANT",
            RowFormat::Compact => "COMPACT",
            RowFormat::Paged => "PAGED",
        }
    }
}

/// Table hidden kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableHidden {
    Visible = 1,
    System,
    Se,
    Ddl,
}

impl TableHidden {
    fn from_dd(code: u64) -> Result<Self, IbdError> {
        Ok(match code {
            1 => TableHidden::Visible,
            2 => TableHidden::System,
            3 => TableHidden::Se,
            4 => TableHidden::Ddl,
            other => {
                return Err(IbdError::Malformed(format!(
                    "unrecognized table hidden kind {}",
                    other
                )))
            }
        })
    }
}

/// A table's fused schema: column arena, physical ordering, and index
/// layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Schema (database) name.
    pub schema_name: String,
    /// Server version that wrote the table's dictionary entry.
    pub mysql_version_id: u32,
    /// Table hidden kind.
    pub hidden: TableHidden,
    /// Declared row format.
    pub row_format: RowFormat,
    /// Whether the table is partitioned (unsupported).
    pub partitioned: bool,
    /// Default collation id.
    pub collation_id: u64,
    /// Engine-side table id.
    pub se_private_id: u64,
    /// Unsupported reason bits; non-zero excludes the table from record
    /// decoding but the schema stays listable.
    pub unsupported: u32,

    /// Column arena: declared columns in document order, followed by any
    /// synthesized ones. All column references are indices into this.
    pub cols: Vec<ColumnModel>,
    /// Number of declared columns at the front of the arena.
    pub n_declared_cols: usize,
    /// Non-SE-hidden column count.
    pub fields: u32,
    /// Nullable count among those.
    pub null_fields: u32,

    /// Physical (stored) column count including system columns.
    pub n_cols: u32,
    /// Physical count plus virtual columns.
    pub n_t_cols: u32,
    /// Virtual column count.
    pub n_v_cols: u32,
    /// Physical column count when the first-generation instant ADD
    /// happened (equals `n_cols` when it never did).
    pub n_instant_cols: u32,
    /// Whether the table carries first-generation instant metadata.
    pub upgraded_instant: bool,
    /// Columns the table was created with.
    pub initial_col_count: u32,
    /// Live columns now.
    pub current_col_count: u32,
    /// Live plus dropped-but-retained columns.
    pub total_col_count: u32,
    /// Highest row version stamped by any instant ADD/DROP.
    pub current_row_version: u32,
    /// Whether this is a reserved catalog table.
    pub is_system_table: bool,

    /// Physical column ordering: arena indices of user columns, then
    /// DB_ROW_ID / DB_TRX_ID / DB_ROLL_PTR, then retained dropped columns.
    pub phys_cols: Vec<usize>,
    /// Index layouts in declaration order.
    pub indexes: Vec<IndexLayout>,
    /// Position of the clustered layout within `indexes`.
    pub clust_index: Option<usize>,
}

impl TableSchema {
    /// Parse an SDI JSON document and fuse it into a schema.
    pub fn from_sdi_json(json: &str) -> Result<TableSchema, IbdError> {
        let env = parse_sdi_table(json)?;
        TableSchema::from_dd(&env.dd_object)
    }

    /// Fuse an already-parsed dictionary object.
    pub fn from_dd(dd: &DdTable) -> Result<TableSchema, IbdError> {
        validate_dd_table(dd)?;
        let row_format = RowFormat::from_dd(dd.row_format)?;
        let hidden = TableHidden::from_dd(dd.hidden)?;
        let options = Properties::parse(&dd.options)?;
        let se_private = Properties::parse(&dd.se_private_data)?;

        let mut cols = dd
            .columns
            .iter()
            .map(ColumnModel::from_dd)
            .collect::<Result<Vec<_>, _>>()?;
        let n_declared_cols = cols.len();

        let s_field: Vec<usize> = (0..n_declared_cols)
            .filter(|&i| !cols[i].is_se_hidden())
            .collect();
        let fields = s_field.len() as u32;
        let null_fields = s_field.iter().filter(|&&i| cols[i].nullable).count() as u32;

        // Pre-check: recognized-but-undecodable table shapes.
        let mut unsupported = 0u32;
        if dd.mysql_version_id < MIN_SUPPORTED_VERSION
            || dd.mysql_version_id > MAX_SUPPORTED_VERSION
        {
            unsupported |= UNSUPP_TABLE_VERSION;
        }
        if dd.partition_type != 0 {
            unsupported |= UNSUPP_TABLE_PARTITION;
        }
        if let Some(enc) = options.get("encrypt_type") {
            if !enc.is_empty() && enc != "N" && enc != "n" {
                unsupported |= UNSUPP_TABLE_ENCRYPT;
            }
        }
        for idx in &dd.indexes {
            if hidden != TableHidden::Se {
                continue;
            }
            if idx.name == "FTS_INDEX_TABLE_IND" {
                unsupported |= UNSUPP_TABLE_FTS_AUX_INDEX;
            } else if idx.name == "FTS_COMMON_TABLE_IND" {
                unsupported |= UNSUPP_TABLE_FTS_COM_INDEX;
            }
        }

        let mut table = TableSchema {
            name: dd.name.clone(),
            schema_name: dd.schema_ref.clone(),
            mysql_version_id: dd.mysql_version_id,
            hidden,
            row_format,
            partitioned: dd.partition_type != 0,
            collation_id: dd.collation_id,
            se_private_id: dd.se_private_id,
            unsupported,
            cols: Vec::new(),
            n_declared_cols,
            fields,
            null_fields,
            n_cols: 0,
            n_t_cols: 0,
            n_v_cols: 0,
            n_instant_cols: 0,
            upgraded_instant: false,
            initial_col_count: 0,
            current_col_count: 0,
            total_col_count: 0,
            current_row_version: 0,
            is_system_table: false,
            phys_cols: Vec::new(),
            indexes: Vec::new(),
            clust_index: None,
        };

        if !table.is_supported() {
            // Declared shape only: listings keep working, decoding is off.
            for decl in &dd.indexes {
                table.indexes.push(IndexLayout::shell(decl, &cols)?);
            }
            table.cols = cols;
            return Ok(table);
        }

        table.is_system_table = matches!(
            dd.schema_ref.as_str(),
            "mysql" | "information_schema" | "performance_schema"
        );

        // Implicit full-text document id.
        let doc_id_pos = cols.iter().position(|c| c.name == FTS_DOC_ID_COL_NAME);
        let has_doc_id = doc_id_pos.map_or(false, |i| {
            cols[i].logical == LogicalType::Longlong && !cols[i].nullable
        });
        let add_doc_id = has_doc_id && doc_id_pos.map_or(false, |i| cols[i].is_se_hidden());

        let n_v_cols = s_field.iter().filter(|&&i| cols[i].is_virtual).count() as u32;

        // Instant ADD/DROP census over the declared columns.
        let mut has_phys_pos_metadata = false;
        let mut current_row_version = 0u32;
        let (mut n_dropped, mut n_added, mut n_added_and_dropped, mut n_current) =
            (0u32, 0u32, 0u32, 0u32);
        for col in &cols {
            if col.is_system_column() || col.is_virtual {
                continue;
            }
            if col.dd_physical_pos.is_some() {
                has_phys_pos_metadata = true;
            }
            if let Some(vd) = col.dd_version_dropped {
                n_dropped += 1;
                if col.dd_version_added.is_some() {
                    n_added_and_dropped += 1;
                }
                current_row_version = current_row_version.max(u32::from(vd));
                continue;
            }
            if let Some(va) = col.dd_version_added {
                n_added += 1;
                current_row_version = current_row_version.max(u32::from(va));
            }
            n_current += 1;
        }

        table.initial_col_count = (n_current - n_added) + (n_dropped - n_added_and_dropped);
        table.current_col_count = n_current;
        table.total_col_count = n_current + n_dropped;
        table.current_row_version = current_row_version;

        table.n_t_cols = fields + u32::from(add_doc_id) + DATA_N_SYS_COLS;
        table.n_v_cols = n_v_cols;
        table.n_cols = table.n_t_cols - n_v_cols;
        table.n_instant_cols = table.n_cols;
        if let Some(instant_col) = se_private.get_u32("instant_col") {
            table.n_instant_cols = instant_col + DATA_N_SYS_COLS;
            table.upgraded_instant = true;
        }

        if table.has_row_versions()
            && table.total_col_count + DATA_N_SYS_COLS != table.n_cols + n_dropped
        {
            return Err(IbdError::Malformed(format!(
                "table {}: column census inconsistent ({} total, {} physical, {} dropped)",
                table.name, table.total_col_count, table.n_cols, n_dropped
            )));
        }

        // Physical column vector: user columns in declaration order.
        let mut phys_cols: Vec<usize> = Vec::new();
        for &ci in &s_field {
            if cols[ci].is_virtual {
                continue;
            }
            let col = &mut cols[ci];
            col.phys_index = Some(phys_cols.len() as u32);
            col.version_added = col.dd_version_added;
            col.version_dropped = None;
            col.phy_pos = if has_phys_pos_metadata {
                col.dd_physical_pos
            } else {
                None
            };
            col.col_len = stored_col_len(col);
            phys_cols.push(ci);
        }

        if add_doc_id {
            let idx = cols.len();
            cols.push(ColumnModel::new_fts_doc_id(phys_cols.len() as u32));
            phys_cols.push(idx);
        }

        // DB_ROW_ID is declared only for tables without an explicit
        // primary key; synthesize it otherwise so the slot always exists.
        let row_id_idx = match cols.iter().position(|c| c.name == "DB_ROW_ID") {
            Some(ci) => {
                fuse_system_column(
                    &mut cols[ci],
                    phys_cols.len() as u32,
                    DATA_ROW_ID_LEN,
                    has_phys_pos_metadata,
                );
                ci
            }
            None => {
                let idx = cols.len();
                cols.push(ColumnModel::new_sys(
                    "DB_ROW_ID",
                    phys_cols.len() as u32,
                    DATA_ROW_ID_LEN,
                ));
                idx
            }
        };
        phys_cols.push(row_id_idx);

        for (sys_name, sys_len) in [
            ("DB_TRX_ID", DATA_TRX_ID_LEN),
            ("DB_ROLL_PTR", DATA_ROLL_PTR_LEN),
        ] {
            let ci = cols
                .iter()
                .position(|c| c.name == sys_name)
                .ok_or_else(|| {
                    IbdError::Malformed(format!("table {}: missing {}", dd.name, sys_name))
                })?;
            fuse_system_column(
                &mut cols[ci],
                phys_cols.len() as u32,
                sys_len,
                has_phys_pos_metadata,
            );
            phys_cols.push(ci);
        }

        // Retained dropped columns go last and keep their recorded
        // physical positions.
        if n_dropped > 0 {
            for ci in 0..n_declared_cols {
                if cols[ci].is_system_column() || cols[ci].dd_version_dropped.is_none() {
                    continue;
                }
                let col = &mut cols[ci];
                col.phys_index = Some(phys_cols.len() as u32);
                col.version_added = col.dd_version_added;
                col.version_dropped = col.dd_version_dropped;
                col.phy_pos = Some(col.dd_physical_pos.ok_or_else(|| {
                    IbdError::Malformed(format!(
                        "dropped column {} has no recorded physical position",
                        col.name
                    ))
                })?);
                col.visible = false;
                col.col_len = stored_col_len(col);
                phys_cols.push(ci);
            }
        }

        // Instant default markers select default vs. null substitution
        // for rows that predate an instantly-added column.
        if table.has_instant_cols() || table.has_row_versions() {
            for ci in 0..n_declared_cols {
                let col = &mut cols[ci];
                if col.is_virtual || col.is_system_column() || col.dd_version_dropped.is_some() {
                    continue;
                }
                col.instant_default = col.dd_default && !col.dd_default_null;
            }
        }

        // Index layouts, clustered first by declaration order.
        if dd.indexes.is_empty() {
            return Err(IbdError::Malformed(format!(
                "table {} declares no indexes",
                dd.name
            )));
        }
        let mut indexes: Vec<IndexLayout> = Vec::new();
        for (pos, decl) in dd.indexes.iter().enumerate() {
            let facts = BuildFacts {
                phys_cols: &phys_cols,
                n_cols: table.n_cols,
                total_cols: if table.has_row_versions() {
                    table.n_cols + n_dropped
                } else {
                    table.n_cols
                },
                has_row_versions: table.has_row_versions(),
                current_row_version: table.current_row_version,
                is_system_table: table.is_system_table,
                has_instant_cols: table.has_instant_cols(),
                n_instant_drop_cols: table.n_instant_drop_cols(),
                n_instant_add_cols: table.n_instant_add_cols(),
                n_instant_added_v1: table.n_instant_added_v1(),
            };
            let clustered = indexes.iter().find(|l| l.is_clustered());
            let layout = IndexLayout::build(decl, pos, &mut cols, &facts, clustered)?;
            indexes.push(layout);
        }
        table.clust_index = indexes.iter().position(|l| l.is_clustered());
        table.indexes = indexes;
        table.phys_cols = phys_cols;
        table.cols = cols;
        Ok(table)
    }

    /// Whether the table uses second-generation per-row schema versioning.
    pub fn has_row_versions(&self) -> bool {
        self.current_row_version > 0
    }

    /// Physical column count including retained dropped columns.
    pub fn total_cols(&self) -> u32 {
        if self.has_row_versions() {
            self.n_cols + self.n_instant_drop_cols()
        } else {
            self.n_cols
        }
    }

    /// Columns instantly added over the table's lifetime.
    pub fn n_instant_add_cols(&self) -> u32 {
        self.total_col_count - self.initial_col_count
    }

    /// Whether any column was ever instantly added (either generation).
    pub fn has_instant_add_cols(&self) -> bool {
        self.n_instant_add_cols() > 0
    }

    /// Columns instantly dropped but retained in older rows.
    pub fn n_instant_drop_cols(&self) -> u32 {
        self.total_col_count - self.current_col_count
    }

    /// Whether any column was instantly dropped.
    pub fn has_instant_drop_cols(&self) -> bool {
        self.n_instant_drop_cols() > 0
    }

    /// Columns added by the first-generation instant mechanism.
    pub fn n_instant_added_v1(&self) -> u32 {
        (self.n_cols + self.n_instant_drop_cols())
            .saturating_sub(self.n_instant_add_cols())
            .saturating_sub(self.n_instant_cols)
    }

    /// Whether the table ever used first-generation instant ADD.
    pub fn has_instant_cols(&self) -> bool {
        self.upgraded_instant || self.n_instant_cols < self.n_cols
    }

    /// Whether records use the compact family of formats.
    pub fn is_compact(&self) -> bool {
        self.row_format != RowFormat::Redundant
    }

    /// Whether the table passed all pre-checks.
    pub fn is_supported(&self) -> bool {
        self.unsupported & UNSUPP_TABLE_MASK == 0
    }

    /// Human-readable unsupported reasons.
    pub fn unsupported_reason(&self) -> String {
        let mut reason = String::new();
        if self.unsupported & UNSUPP_TABLE_PARTITION != 0 {
            reason.push_str("[Partitioned table]");
        }
        if self.unsupported & UNSUPP_TABLE_ENCRYPT != 0 {
            reason.push_str("[Encrypted table]");
        }
        if self.unsupported & UNSUPP_TABLE_FTS_AUX_INDEX != 0 {
            reason.push_str("[FTS auxiliary index table]");
        }
        if self.unsupported & UNSUPP_TABLE_FTS_COM_INDEX != 0 {
            reason.push_str("[FTS common index table]");
        }
        if self.unsupported & UNSUPP_TABLE_VERSION != 0 {
            reason.push_str(&format!(
                "[Table was created by unsupported version {}, expected {}..={}]",
                self.mysql_version_id, MIN_SUPPORTED_VERSION, MAX_SUPPORTED_VERSION
            ));
        }
        reason
    }

    /// Whether records of this table can be decoded at all.
    pub fn is_record_decoding_supported(&self) -> bool {
        self.is_supported()
            && matches!(self.row_format, RowFormat::Dynamic | RowFormat::Compact)
    }

    /// Column by arena index.
    pub fn col(&self, idx: usize) -> &ColumnModel {
        &self.cols[idx]
    }

    /// The clustered index layout.
    pub fn clustered(&self) -> Option<&IndexLayout> {
        self.clust_index.map(|i| &self.indexes[i])
    }

    /// Index layout by name.
    pub fn index_by_name(&self, name: &str) -> Option<&IndexLayout> {
        self.indexes.iter().find(|l| l.name == name)
    }
}

/// Engine-side stored length: VARCHAR excludes its length prefix, every
/// other type stores its full packed length.
fn stored_col_len(col: &ColumnModel) -> u32 {
    if col.field_kind() == FieldKind::Varchar {
        col.pack_length() - col.varchar_len_bytes()
    } else {
        col.pack_length()
    }
}

fn fuse_system_column(
    col: &mut ColumnModel,
    phys_index: u32,
    col_len: u32,
    has_phys_pos_metadata: bool,
) {
    col.phys_index = Some(phys_index);
    col.mtype = PhysicalType::Sys;
    col.visible = false;
    col.version_added = None;
    col.version_dropped = None;
    col.phy_pos = if has_phys_pos_metadata {
        col.dd_physical_pos
    } else {
        None
    };
    col.col_len = col_len;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic_table_json() -> serde_json::Value {
        json!({
            "mysqld_version_id": 80040,
            "dd_object_type": "Table",
            "dd_object": {
                "name": "users",
                "schema_ref": "app",
                "mysql_version_id": 80040,
                "row_format": 2,
                "collation_id": 255,
                "se_private_id": 1199,
                "columns": [
                    { "name": "id", "type": 4, "is_nullable": false, "hidden": 1,
                      "ordinal_position": 1, "collation_id": 8 },
                    { "name": "txt", "type": 16, "is_nullable": true, "hidden": 1,
                      "ordinal_position": 2, "char_length": 100, "collation_id": 8 },
                    { "name": "DB_TRX_ID", "type": 10, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 3 },
                    { "name": "DB_ROLL_PTR", "type": 9, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 4 }
                ],
                "indexes": [
                    { "name": "PRIMARY", "type": 1, "hidden": false,
                      "se_private_data": "id=330;root=4;",
                      "elements": [
                        { "column_opx": 0, "length": 4, "ordinal_position": 1 },
                        { "column_opx": 2, "hidden": true, "ordinal_position": 2 },
                        { "column_opx": 3, "hidden": true, "ordinal_position": 3 }
                      ] }
                ]
            }
        })
    }

    #[test]
    fn test_basic_fusion() {
        let table = TableSchema::from_sdi_json(&basic_table_json().to_string()).unwrap();
        assert!(table.is_supported());
        assert!(table.is_record_decoding_supported());
        assert_eq!(table.fields, 2);
        assert_eq!(table.null_fields, 1);
        assert_eq!(table.n_cols, 5);
        assert!(!table.has_row_versions());
        assert!(!table.has_instant_cols());

        // physical order: user columns, then the three system columns
        let names: Vec<&str> = table
            .phys_cols
            .iter()
            .map(|&ci| table.cols[ci].name.as_str())
            .collect();
        assert_eq!(names, ["id", "txt", "DB_ROW_ID", "DB_TRX_ID", "DB_ROLL_PTR"]);
        // DB_ROW_ID was not declared, so it was synthesized
        let row_id = &table.cols[table.phys_cols[2]];
        assert!(row_id.synthesized);
        assert_eq!(row_id.col_len, 6);

        // physical count invariant
        assert_eq!(
            table.phys_cols.len() as u32,
            table.current_col_count + table.n_instant_drop_cols() + DATA_N_SYS_COLS
        );
    }

    #[test]
    fn test_clustered_layout_order() {
        let table = TableSchema::from_sdi_json(&basic_table_json().to_string()).unwrap();
        let clust = table.clustered().unwrap();
        assert!(clust.is_clustered());
        assert!(clust.is_unique());
        assert_eq!(clust.id, 330);
        assert_eq!(clust.root_page, 4);
        assert_eq!(clust.n_uniq, 1);
        assert_eq!(clust.n_def, 4);
        assert_eq!(clust.n_nullable, 1);

        let names: Vec<&str> = clust
            .fields
            .iter()
            .map(|slot| table.cols[slot.col].name.as_str())
            .collect();
        // explicit PK: no DB_ROW_ID in the field list
        assert_eq!(names, ["id", "DB_TRX_ID", "DB_ROLL_PTR", "txt"]);

        // physical positions assigned in field order
        let positions: Vec<u32> = clust
            .fields
            .iter()
            .map(|slot| table.cols[slot.col].phy_pos.unwrap())
            .collect();
        assert_eq!(positions, [0, 1, 2, 3]);

        // fixed lengths: int 4, trx 6, roll 7, varchar variable
        let fixed: Vec<u32> = clust.fields.iter().map(|s| s.fixed_len).collect();
        assert_eq!(fixed, [4, 6, 7, 0]);

        // back-reference into the clustered slot list
        assert_eq!(table.cols[table.phys_cols[0]].clustered_slot, Some(0));
        assert_eq!(table.cols[table.phys_cols[1]].clustered_slot, Some(3));
    }

    #[test]
    fn test_secondary_carries_clustering_key() {
        let mut v = basic_table_json();
        v["dd_object"]["indexes"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "name": "ix_txt", "type": 3, "hidden": false,
                "se_private_data": "id=331;root=5;",
                "elements": [
                    { "column_opx": 1, "length": 100, "ordinal_position": 1 },
                    { "column_opx": 0, "hidden": true, "ordinal_position": 2 }
                ]
            }));
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        let ix = table.index_by_name("ix_txt").unwrap();
        assert!(!ix.is_clustered());
        assert!(!ix.is_unique());
        let names: Vec<&str> = ix
            .fields
            .iter()
            .map(|slot| table.cols[slot.col].name.as_str())
            .collect();
        assert_eq!(names, ["txt", "id"]);
        // non-unique secondary: uniqueness is structural over all fields
        assert_eq!(ix.n_uniq, 2);
        assert_eq!(ix.n_fields, 2);
    }

    #[test]
    fn test_unique_secondary_unique_count() {
        let mut v = basic_table_json();
        v["dd_object"]["indexes"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "name": "ux_txt", "type": 2, "hidden": false,
                "elements": [
                    { "column_opx": 1, "length": 100, "ordinal_position": 1 },
                    { "column_opx": 0, "hidden": true, "ordinal_position": 2 }
                ]
            }));
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        let ux = table.index_by_name("ux_txt").unwrap();
        assert!(ux.is_unique());
        assert_eq!(ux.n_uniq, 1);
        assert_eq!(ux.n_fields, 2);
    }

    #[test]
    fn test_implicit_clustered_index() {
        let v = json!({
            "mysqld_version_id": 80040,
            "dd_object_type": "Table",
            "dd_object": {
                "name": "nopk",
                "schema_ref": "app",
                "mysql_version_id": 80040,
                "row_format": 2,
                "columns": [
                    { "name": "a", "type": 4, "is_nullable": true, "hidden": 1,
                      "ordinal_position": 1 },
                    { "name": "DB_ROW_ID", "type": 10, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 2 },
                    { "name": "DB_TRX_ID", "type": 10, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 3 },
                    { "name": "DB_ROLL_PTR", "type": 9, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 4 }
                ],
                "indexes": [
                    { "name": "PRIMARY", "type": 1, "hidden": true,
                      "elements": [
                        { "column_opx": 1, "hidden": true, "ordinal_position": 1 },
                        { "column_opx": 2, "hidden": true, "ordinal_position": 2 },
                        { "column_opx": 3, "hidden": true, "ordinal_position": 3 },
                        { "column_opx": 0, "hidden": true, "ordinal_position": 4 }
                      ] }
                ]
            }
        });
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        let clust = table.clustered().unwrap();
        assert!(clust.is_clustered());
        // implicit clustered index never gets the unique flag
        assert!(!clust.is_unique());
        // uniqueness provided by the hidden row id
        assert_eq!(clust.n_uniq, 1);
        let names: Vec<&str> = clust
            .fields
            .iter()
            .map(|slot| table.cols[slot.col].name.as_str())
            .collect();
        assert_eq!(names, ["DB_ROW_ID", "DB_TRX_ID", "DB_ROLL_PTR", "a"]);
    }

    #[test]
    fn test_partitioned_table_listed_not_decoded() {
        let mut v = basic_table_json();
        v["dd_object"]["partition_type"] = json!(7);
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        assert!(!table.is_supported());
        assert!(!table.is_record_decoding_supported());
        assert!(table.unsupported_reason().contains("Partitioned"));
        // indexes stay listed in declared shape
        assert_eq!(table.indexes.len(), 1);
        assert_eq!(table.indexes[0].name, "PRIMARY");
        assert_eq!(table.indexes[0].user_defined_key_parts, 1);
    }

    #[test]
    fn test_version_range_check() {
        let mut v = basic_table_json();
        v["dd_object"]["mysql_version_id"] = json!(80400);
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        assert!(!table.is_supported());
        assert!(table.unsupported_reason().contains("80400"));
    }

    #[test]
    fn test_encrypted_table_rejected() {
        let mut v = basic_table_json();
        v["dd_object"]["options"] = json!("encrypt_type=Y;");
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        assert!(!table.is_supported());
        assert!(table.unsupported_reason().contains("Encrypted"));
    }

    #[test]
    fn test_redundant_row_format_not_decoded() {
        let mut v = basic_table_json();
        v["dd_object"]["row_format"] = json!(4);
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        assert!(table.is_supported());
        assert!(!table.is_compact());
        assert!(!table.is_record_decoding_supported());
    }

    #[test]
    fn test_missing_trx_id_fails() {
        let mut v = basic_table_json();
        v["dd_object"]["columns"].as_array_mut().unwrap().remove(2);
        v["dd_object"]["indexes"][0]["elements"]
            .as_array_mut()
            .unwrap()
            .truncate(1);
        assert!(matches!(
            TableSchema::from_sdi_json(&v.to_string()),
            Err(IbdError::Malformed(_))
        ));
    }

    #[test]
    fn test_fts_doc_id_synthesis() {
        let mut v = basic_table_json();
        v["dd_object"]["columns"].as_array_mut().unwrap().insert(
            2,
            json!({ "name": "FTS_DOC_ID", "type": 9, "is_nullable": false, "hidden": 2,
                    "ordinal_position": 3 }),
        );
        // fix ordinals and index references after the insert
        v["dd_object"]["columns"][3]["ordinal_position"] = json!(4);
        v["dd_object"]["columns"][4]["ordinal_position"] = json!(5);
        v["dd_object"]["indexes"][0]["elements"][1]["column_opx"] = json!(3);
        v["dd_object"]["indexes"][0]["elements"][2]["column_opx"] = json!(4);

        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        // the hidden doc id is synthesized into the physical vector
        let names: Vec<&str> = table
            .phys_cols
            .iter()
            .map(|&ci| table.cols[ci].name.as_str())
            .collect();
        assert_eq!(
            names,
            ["id", "txt", "FTS_DOC_ID", "DB_ROW_ID", "DB_TRX_ID", "DB_ROLL_PTR"]
        );
        let doc = &table.cols[table.phys_cols[2]];
        assert!(doc.synthesized);
        assert_eq!(doc.col_len, 8);
        assert_eq!(table.n_cols, 6);
    }

    #[test]
    fn test_fts_doc_id_index_rebinding() {
        let v = json!({
            "mysqld_version_id": 80040,
            "dd_object_type": "Table",
            "dd_object": {
                "name": "articles",
                "schema_ref": "app",
                "mysql_version_id": 80040,
                "row_format": 2,
                "columns": [
                    { "name": "id", "type": 4, "is_nullable": false, "hidden": 1,
                      "ordinal_position": 1 },
                    { "name": "body", "type": 27, "is_nullable": true, "hidden": 1,
                      "ordinal_position": 2, "char_length": 65535, "collation_id": 255 },
                    { "name": "FTS_DOC_ID", "type": 9, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 3 },
                    { "name": "DB_TRX_ID", "type": 10, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 4 },
                    { "name": "DB_ROLL_PTR", "type": 9, "is_nullable": false, "hidden": 2,
                      "ordinal_position": 5 }
                ],
                "indexes": [
                    { "name": "PRIMARY", "type": 1, "hidden": false,
                      "elements": [
                        { "column_opx": 0, "length": 4, "ordinal_position": 1 },
                        { "column_opx": 3, "hidden": true, "ordinal_position": 2 },
                        { "column_opx": 4, "hidden": true, "ordinal_position": 3 }
                      ] },
                    { "name": "FTS_DOC_ID_INDEX", "type": 2, "hidden": false,
                      "elements": [
                        { "column_opx": 2, "length": 8, "ordinal_position": 1 },
                        { "column_opx": 0, "hidden": true, "ordinal_position": 2 }
                      ] }
                ]
            }
        });
        let table = TableSchema::from_sdi_json(&v.to_string()).unwrap();
        let ix = table.index_by_name("FTS_DOC_ID_INDEX").unwrap();

        // the declared doc-id element lacks physical attributes; the slot
        // must point at the table's canonical doc-id column instead
        let doc = &table.cols[ix.fields[0].col];
        assert!(doc.synthesized);
        assert_eq!(doc.col_len, 8);
        assert_eq!(ix.fields[0].fixed_len, 8);

        let names: Vec<&str> = ix
            .fields
            .iter()
            .map(|slot| table.cols[slot.col].name.as_str())
            .collect();
        assert_eq!(names, ["FTS_DOC_ID", "id"]);
        assert_eq!(ix.n_uniq, 1);
    }

    #[test]
    fn test_idempotent_fusion() {
        let json = basic_table_json().to_string();
        let a = TableSchema::from_sdi_json(&json).unwrap();
        let b = TableSchema::from_sdi_json(&json).unwrap();
        assert_eq!(a, b);
    }
}
