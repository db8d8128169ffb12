//! Index layouts: ordered physical field lists and per-index bookkeeping.
//!
//! An [`IndexLayout`] is the decode-side shape of one index: its
//! classification flags, the authoritative physical field order (declared
//! key parts, then hidden system columns, then remaining columns, then
//! retained instantly-dropped columns), uniqueness counts, and — for
//! row-versioned clustered indexes — the physical-position map and the
//! per-version nullable-field table that record decoding consults.
//!
//! Construction happens once per index during table fusion and the layout
//! is immutable afterward; any number of records may then be decoded
//! against it concurrently.

use crate::innodb::column::{ColumnModel, PhysicalType};
use crate::innodb::constants::{
    DATA_MBR_LEN, DATA_N_SYS_COLS, DICT_CLUSTERED, DICT_FTS, DICT_MAX_FIXED_COL_LEN, DICT_SPATIAL,
    DICT_UNIQUE, MAX_ROW_VERSION,
};
use crate::innodb::properties::Properties;
use crate::innodb::sdi::{DdIndex, INDEX_ELEMENT_FULL_LENGTH};
use crate::IbdError;

// TABLE_SHARE key flags.
const HA_NOSAME: u32 = 1;
const HA_FULLTEXT: u32 = 1 << 7;
const HA_SPATIAL: u32 = 1 << 10;

/// Unsupported-index reason bits.
pub const UNSUPP_INDEX_VIRTUAL: u32 = 0x1;
pub const UNSUPP_INDEX_FTS: u32 = 0x2;
pub const UNSUPP_INDEX_SPATIAL: u32 = 0x4;
const UNSUPP_INDEX_MASK: u32 = 0x7;

/// Declared index type from the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Primary = 1,
    Unique,
    Multiple,
    Fulltext,
    Spatial,
}

impl IndexType {
    fn from_dd(code: u64) -> Result<Self, IbdError> {
        Ok(match code {
            1 => IndexType::Primary,
            2 => IndexType::Unique,
            3 => IndexType::Multiple,
            4 => IndexType::Fulltext,
            5 => IndexType::Spatial,
            other => {
                return Err(IbdError::Malformed(format!(
                    "unrecognized index type code {}",
                    other
                )))
            }
        })
    }
}

/// One column's occurrence in one index's physical field list.
///
/// `col` indexes the owning table's column arena. `fixed_len` is the
/// index-local fixed length override: 0 means the field takes the
/// variable-length path within this index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    /// Arena index of the underlying column.
    pub col: usize,
    /// Declared prefix truncation length in bytes (0 = full column).
    pub prefix_len: u32,
    /// Computed fixed-length override (0 = variable within this index).
    pub fixed_len: u32,
}

/// One index's physical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLayout {
    /// Index name.
    pub name: String,
    /// Declared index type.
    pub dd_type: IndexType,
    /// True for the implicit clustered index of a PK-less table.
    pub hidden: bool,
    /// Engine-side index id.
    pub id: u64,
    /// Root page number.
    pub root_page: u32,
    /// Engine classification flags (DICT_CLUSTERED and friends).
    pub type_flags: u32,
    /// Unsupported reason bits; non-zero excludes the index from record
    /// decoding but it stays visible in schema listings.
    pub unsupported: u32,
    /// Number of user-declared key parts.
    pub user_defined_key_parts: u32,
    /// Sum of declared key part lengths.
    pub key_length: u32,
    /// Live field count (excludes retained dropped columns for
    /// row-versioned clustered indexes).
    pub n_fields: u32,
    /// Fields participating in uniqueness within the tree.
    pub n_uniq: u32,
    /// Total defined fields including retained dropped columns.
    pub n_def: u32,
    /// Nullable live fields.
    pub n_nullable: u32,
    /// Total physical fields (equals `n_def`).
    pub n_total_fields: u32,
    /// Physical field list in append order.
    pub fields: Vec<FieldSlot>,
    /// Physical position -> field list index, for row-versioned clustered
    /// indexes of non-catalog tables; empty otherwise.
    pub fields_array: Vec<u16>,
    /// Nullable live field count visible to a record of each row version.
    pub nullables: [u32; MAX_ROW_VERSION as usize + 1],
    /// Whether the owning table uses per-row schema versioning (clustered
    /// index only).
    pub row_versions: bool,
    /// Whether the owning table ever used first-generation instant ADD
    /// (clustered index only).
    pub instant_cols: bool,
    /// Nullable count before any instant ADD/DROP happened.
    pub n_instant_nullable: u32,
}

/// Table-level facts the index build consumes.
pub(crate) struct BuildFacts<'a> {
    pub phys_cols: &'a [usize],
    pub n_cols: u32,
    pub total_cols: u32,
    pub has_row_versions: bool,
    pub current_row_version: u32,
    pub is_system_table: bool,
    pub has_instant_cols: bool,
    pub n_instant_drop_cols: u32,
    pub n_instant_add_cols: u32,
    pub n_instant_added_v1: u32,
}

impl IndexLayout {
    /// Declared-shape-only layout: key part counts, flags, and the
    /// unsupported mask. Used when the owning table is itself excluded
    /// from record decoding, so listings still see the index.
    pub(crate) fn shell(decl: &DdIndex, cols: &[ColumnModel]) -> Result<IndexLayout, IbdError> {
        let dd_type = IndexType::from_dd(decl.index_type)?;
        let mut layout = IndexLayout {
            name: decl.name.clone(),
            dd_type,
            hidden: decl.hidden,
            id: 0,
            root_page: 0,
            type_flags: 0,
            unsupported: 0,
            user_defined_key_parts: 0,
            key_length: 0,
            n_fields: 0,
            n_uniq: 0,
            n_def: 0,
            n_nullable: 0,
            n_total_fields: 0,
            fields: Vec::new(),
            fields_array: Vec::new(),
            nullables: [0; MAX_ROW_VERSION as usize + 1],
            row_versions: false,
            instant_cols: false,
            n_instant_nullable: 0,
        };
        for elem in &decl.elements {
            if elem.hidden {
                continue;
            }
            layout.user_defined_key_parts += 1;
            layout.key_length = layout
                .key_length
                .saturating_add(elem.length.min(u64::from(u32::MAX)) as u32);
        }
        if dd_type == IndexType::Fulltext {
            layout.unsupported |= UNSUPP_INDEX_FTS;
        }
        if dd_type == IndexType::Spatial {
            layout.unsupported |= UNSUPP_INDEX_SPATIAL;
        }
        for elem in &decl.elements {
            if elem.hidden {
                continue;
            }
            if cols[elem.column_opx as usize].is_virtual {
                layout.unsupported |= UNSUPP_INDEX_VIRTUAL;
                break;
            }
        }
        Ok(layout)
    }

    /// Build the physical layout of one index.
    ///
    /// `ordinal` is the index's position in declaration order (the first
    /// becomes clustered). `clustered` must be the already-built clustered
    /// layout for every non-first index.
    pub(crate) fn build(
        decl: &DdIndex,
        ordinal: usize,
        cols: &mut [ColumnModel],
        facts: &BuildFacts<'_>,
        clustered: Option<&IndexLayout>,
    ) -> Result<IndexLayout, IbdError> {
        let mut layout = IndexLayout::shell(decl, cols)?;

        let s_flags = match layout.dd_type {
            IndexType::Multiple => 0,
            IndexType::Fulltext => HA_FULLTEXT,
            IndexType::Spatial => HA_SPATIAL,
            IndexType::Primary | IndexType::Unique => HA_NOSAME,
        };

        // Classification is recorded even for indexes the mask excludes,
        // so schema listings still report their kind.
        layout.n_fields = layout.user_defined_key_parts;
        layout.n_uniq = layout.n_fields;
        if s_flags & HA_SPATIAL != 0 {
            layout.type_flags = DICT_SPATIAL;
            if layout.user_defined_key_parts != 1 {
                return Err(IbdError::Malformed(format!(
                    "spatial index {} must have exactly one key field, has {}",
                    layout.name, layout.user_defined_key_parts
                )));
            }
        } else if s_flags & HA_FULLTEXT != 0 {
            layout.type_flags = DICT_FTS;
            layout.n_uniq = 0;
        } else if ordinal == 0 {
            if s_flags & HA_NOSAME == 0 {
                return Err(IbdError::Malformed(format!(
                    "first index {} is not a candidate clustered key",
                    layout.name
                )));
            }
            if layout.n_uniq == 0 && !decl.hidden {
                return Err(IbdError::Malformed(format!(
                    "explicit primary index {} has no key fields",
                    layout.name
                )));
            }
            // a hidden first index is the implicit clustered index of a
            // table without an explicit primary key
            layout.type_flags = if decl.hidden {
                DICT_CLUSTERED
            } else {
                DICT_CLUSTERED | DICT_UNIQUE
            };
        } else {
            layout.type_flags = if s_flags & HA_NOSAME != 0 { DICT_UNIQUE } else { 0 };
        }

        if !layout.is_supported() {
            return Ok(layout);
        }

        // Declared non-hidden key parts.
        let mut slot_of_elem: Vec<Option<usize>> = vec![None; decl.elements.len()];
        for (ei, elem) in decl.elements.iter().enumerate() {
            if elem.hidden {
                continue;
            }
            let ci = elem.column_opx as usize;
            let prefix = prefix_len_of(&cols[ci], elem.length);
            slot_of_elem[ei] = Some(layout.fields.len());
            layout.add_col(cols, ci, prefix);
        }

        // The doc-id auxiliary index declares FTS_DOC_ID without physical
        // attributes; rebind to the table's canonical doc-id column and
        // append it for hidden occurrences.
        if decl.name == super::table::FTS_DOC_ID_INDEX_NAME {
            let canonical = facts
                .phys_cols
                .iter()
                .copied()
                .find(|&ci| cols[ci].name == super::table::FTS_DOC_ID_COL_NAME);
            if let Some(canon) = canonical {
                for (ei, elem) in decl.elements.iter().enumerate() {
                    if cols[elem.column_opx as usize].name != super::table::FTS_DOC_ID_COL_NAME {
                        continue;
                    }
                    match slot_of_elem[ei] {
                        Some(slot) => {
                            layout.fields[slot].col = canon;
                            layout.fields[slot].fixed_len =
                                fixed_len_override(&cols[canon], 0, false);
                        }
                        None => layout.add_col(cols, canon, 0),
                    }
                }
            }
        }

        if layout.is_clustered() {
            layout.build_clustered(cols, facts)?;
        } else {
            layout.build_secondary(cols, facts, clustered)?;
        }

        let se = Properties::parse(&decl.se_private_data)?;
        layout.id = se.get_u64("id").unwrap_or(0);
        layout.root_page = se.get_u32("root").unwrap_or(0);

        layout.n_fields = layout.n_def;
        if layout.is_clustered() && facts.has_row_versions {
            layout.n_fields = layout
                .n_def
                .checked_sub(facts.n_instant_drop_cols)
                .ok_or_else(|| {
                    IbdError::Malformed(format!(
                        "index {}: more dropped columns than fields",
                        layout.name
                    ))
                })?;
        }
        layout.n_total_fields = layout.n_def;
        layout.n_instant_nullable = layout.n_nullable;
        if layout.is_clustered() {
            layout.row_versions = facts.has_row_versions;
            if facts.has_instant_cols {
                layout.instant_cols = true;
                let n_orig = layout.n_original_fields(
                    facts.n_instant_drop_cols,
                    facts.n_instant_add_cols,
                    facts.n_instant_added_v1,
                );
                layout.n_instant_nullable =
                    layout.calc_n_instant_nullable(cols, facts.has_row_versions, n_orig);
            }
        }
        Ok(layout)
    }

    fn build_clustered(
        &mut self,
        cols: &mut [ColumnModel],
        facts: &BuildFacts<'_>,
    ) -> Result<(), IbdError> {
        if !self.is_unique() {
            // implicit row id participates in uniqueness
            self.n_uniq += 1;
        }

        for (i, slot) in self.fields.iter().enumerate() {
            assign_phy_pos(&mut cols[slot.col], facts.has_row_versions, i as u32)?;
        }
        let mut n_processed = self.fields.len() as u32;

        // Hidden system columns, in their fixed physical-vector order.
        let (mut found_row_id, mut found_trx_id, mut found_roll_ptr) = (false, false, false);
        for &ci in facts.phys_cols {
            let wanted = match cols[ci].name.as_str() {
                "DB_ROW_ID" if !self.is_unique() => {
                    found_row_id = true;
                    true
                }
                "DB_TRX_ID" => {
                    found_trx_id = true;
                    true
                }
                "DB_ROLL_PTR" => {
                    found_roll_ptr = true;
                    true
                }
                _ => false,
            };
            if !wanted {
                continue;
            }
            assign_phy_pos(&mut cols[ci], facts.has_row_versions, n_processed)?;
            self.add_col(cols, ci, 0);
            n_processed += 1;
        }
        if (!self.is_unique() && !found_row_id) || !found_trx_id || !found_roll_ptr {
            return Err(IbdError::Malformed(format!(
                "index {}: system columns missing from the physical column vector",
                self.name
            )));
        }

        // Every remaining live column, in physical-column order.
        let mut indexed = vec![false; facts.total_cols as usize];
        self.mark_indexed(cols, &mut indexed)?;
        for i in 0..(facts.n_cols - DATA_N_SYS_COLS) as usize {
            let ci = facts.phys_cols[i];
            let pi = phys_index_of(&cols[ci])? as usize;
            if indexed[pi] {
                continue;
            }
            assign_phy_pos(&mut cols[ci], facts.has_row_versions, n_processed)?;
            self.add_col(cols, ci, 0);
            n_processed += 1;
        }

        // Retained dropped columns reuse the position recorded when they
        // were dropped; they never receive a new one.
        for i in facts.n_cols as usize..facts.total_cols as usize {
            let ci = facts.phys_cols[i];
            self.add_col(cols, ci, 0);
            n_processed += 1;
        }
        let _ = n_processed;

        if !facts.is_system_table && facts.has_row_versions {
            self.fields_array = vec![0u16; self.n_def as usize];
            for (i, slot) in self.fields.iter().enumerate() {
                let pos = cols[slot.col].phy_pos.ok_or_else(|| {
                    IbdError::Malformed(format!(
                        "index {}: field without physical position",
                        self.name
                    ))
                })? as usize;
                if pos >= self.fields_array.len() {
                    return Err(IbdError::Malformed(format!(
                        "index {}: physical position {} out of range",
                        self.name, pos
                    )));
                }
                self.fields_array[pos] = i as u16;
            }

            let current = facts.current_row_version as usize;
            for slot in &self.fields {
                let col = &cols[slot.col];
                if col.is_system_column() || !col.nullable {
                    continue;
                }
                let start = match col.version_added {
                    Some(v) if v > 0 => v as usize,
                    _ => 0,
                };
                for v in start..=current {
                    self.nullables[v] += 1;
                }
                if let Some(dropped) = col.version_dropped.filter(|&v| v > 0) {
                    for v in dropped as usize..=current {
                        if self.nullables[v] == 0 {
                            return Err(IbdError::Malformed(format!(
                                "index {}: nullable count underflow at version {}",
                                self.name, v
                            )));
                        }
                        self.nullables[v] -= 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn build_secondary(
        &mut self,
        cols: &mut [ColumnModel],
        facts: &BuildFacts<'_>,
        clustered: Option<&IndexLayout>,
    ) -> Result<(), IbdError> {
        let clust = clustered.ok_or_else(|| {
            IbdError::Malformed(format!(
                "index {}: table has no clustered index before it",
                self.name
            ))
        })?;

        let mut indexed = vec![false; facts.total_cols as usize];
        self.mark_indexed(cols, &mut indexed)?;

        // Ordinary secondary indexes carry the full clustering key as
        // trailing fields.
        for i in 0..clust.n_uniq as usize {
            let slot = clust.fields.get(i).ok_or_else(|| {
                IbdError::Malformed(format!(
                    "index {}: clustered uniqueness prefix out of range",
                    self.name
                ))
            })?;
            let pi = phys_index_of(&cols[slot.col])? as usize;
            if !indexed[pi] {
                self.add_col(cols, slot.col, 0);
            }
        }

        self.n_uniq = if self.is_unique() {
            self.n_fields
        } else {
            self.n_def
        };
        Ok(())
    }

    fn mark_indexed(&self, cols: &[ColumnModel], indexed: &mut [bool]) -> Result<(), IbdError> {
        for slot in &self.fields {
            let col = &cols[slot.col];
            if col.is_virtual {
                continue;
            }
            let pi = phys_index_of(col)? as usize;
            if pi >= indexed.len() {
                return Err(IbdError::Malformed(format!(
                    "index {}: physical column index {} out of range",
                    self.name, pi
                )));
            }
            indexed[pi] = true;
        }
        Ok(())
    }

    fn add_col(&mut self, cols: &mut [ColumnModel], ci: usize, prefix_len: u32) {
        let slot_pos = self.fields.len();
        let col = &cols[ci];

        let spatial_first = self.type_flags & DICT_SPATIAL != 0
            && matches!(col.mtype, PhysicalType::Point | PhysicalType::VarPoint)
            && self.n_def == 0;
        let fixed = fixed_len_override(col, prefix_len, spatial_first);

        let counts_nullable = col.nullable && !col.is_instant_dropped();
        self.fields.push(FieldSlot {
            col: ci,
            prefix_len,
            fixed_len: fixed,
        });
        self.n_def += 1;
        if counts_nullable {
            self.n_nullable += 1;
        }
        if self.is_clustered() {
            let col = &mut cols[ci];
            if col.clustered_slot.is_none() {
                col.clustered_slot = Some(slot_pos);
            }
        }
    }

    /// Whether this is the table's clustered index.
    pub fn is_clustered(&self) -> bool {
        self.type_flags & DICT_CLUSTERED != 0
    }

    /// Whether the index enforces uniqueness.
    pub fn is_unique(&self) -> bool {
        self.type_flags & DICT_UNIQUE != 0
    }

    /// Whether the index can be used for record decoding.
    pub fn is_supported(&self) -> bool {
        self.unsupported & UNSUPP_INDEX_MASK == 0
    }

    /// Human-readable unsupported reasons.
    pub fn unsupported_reason(&self) -> String {
        let mut reason = String::new();
        if self.unsupported & UNSUPP_INDEX_VIRTUAL != 0 {
            reason.push_str("[Index using virtual columns as keys]");
        }
        if self.unsupported & UNSUPP_INDEX_FTS != 0 {
            reason.push_str("[Fulltext index]");
        }
        if self.unsupported & UNSUPP_INDEX_SPATIAL != 0 {
            reason.push_str("[Spatial index]");
        }
        reason
    }

    /// Number of fields a leaf record of this index decodes.
    pub fn n_decode_fields(&self) -> u32 {
        if self.row_versions {
            self.n_total_fields
        } else {
            self.n_fields
        }
    }

    /// Fields participating in uniqueness within the B-tree.
    pub fn n_unique_in_tree(&self) -> u32 {
        if self.is_clustered() {
            self.n_uniq
        } else {
            self.n_decode_fields()
        }
    }

    /// Key fields carried by non-leaf (node pointer) records.
    pub fn n_unique_in_tree_nonleaf(&self) -> u32 {
        self.n_unique_in_tree()
    }

    /// Physical field lookup: position within a stored record to slot.
    pub fn physical_field(&self, pos: usize) -> Result<&FieldSlot, IbdError> {
        let slot = if self.row_versions {
            let i = *self.fields_array.get(pos).ok_or_else(|| {
                IbdError::Corrupt(format!("field position {} outside index {}", pos, self.name))
            })? as usize;
            self.fields.get(i)
        } else {
            self.fields.get(pos)
        };
        slot.ok_or_else(|| {
            IbdError::Corrupt(format!("field position {} outside index {}", pos, self.name))
        })
    }

    /// Nullable live fields visible to a record of the given row version.
    pub fn nullable_in_version(&self, version: u8) -> u32 {
        self.nullables[version as usize]
    }

    /// Nullable count before any instant ADD/DROP happened on the table.
    pub fn nullable_before_instant_add_drop(&self) -> u32 {
        if self.instant_cols {
            self.n_instant_nullable
        } else if self.row_versions {
            self.nullables[0]
        } else {
            self.n_nullable
        }
    }

    /// Whether leaf records of this index may carry instant/version header
    /// state (clustered index only).
    pub fn has_instant_cols_or_row_versions(&self) -> bool {
        self.is_clustered() && (self.row_versions || self.instant_cols)
    }

    /// Field count records carried before the first first-generation
    /// instant ADD.
    pub fn n_original_fields(&self, n_drop: u32, n_add: u32, n_added_v1: u32) -> u32 {
        (self.n_fields + n_drop)
            .saturating_sub(n_add)
            .saturating_sub(n_added_v1)
    }

    /// Nullable fields among the first `nth` physical fields.
    pub(crate) fn n_nullable_before(&self, cols: &[ColumnModel], nth: u32) -> u32 {
        self.fields
            .iter()
            .take(nth as usize)
            .filter(|slot| cols[slot.col].nullable)
            .count() as u32
    }

    /// Nullable count visible to a first-generation instant record that
    /// stored `n_fields` fields.
    pub(crate) fn calc_n_instant_nullable(
        &self,
        cols: &[ColumnModel],
        table_row_versions: bool,
        n_fields: u32,
    ) -> u32 {
        if !table_row_versions {
            return self.n_nullable_before(cols, n_fields);
        }
        let mut dropped_nullable = 0;
        let mut live_nullable = 0;
        for slot in &self.fields {
            let col = &cols[slot.col];
            if col.is_instant_added() {
                continue;
            }
            let in_range = matches!(col.phy_pos, Some(p) if p < n_fields);
            if col.is_instant_dropped() {
                if in_range && col.nullable {
                    dropped_nullable += 1;
                }
                continue;
            }
            if in_range && col.nullable {
                live_nullable += 1;
            }
        }
        live_nullable + dropped_nullable
    }
}

fn assign_phy_pos(
    col: &mut ColumnModel,
    has_row_versions: bool,
    pos: u32,
) -> Result<(), IbdError> {
    if !has_row_versions {
        col.phy_pos = Some(pos);
    } else if col.phy_pos.is_none() {
        // versioned tables must arrive with positions pre-assigned by the
        // server; trusting an implied one would mis-decode every row
        return Err(IbdError::Malformed(format!(
            "column {} has no physical position in a row-versioned table",
            col.name
        )));
    }
    Ok(())
}

fn phys_index_of(col: &ColumnModel) -> Result<u32, IbdError> {
    col.phys_index.ok_or_else(|| {
        IbdError::Malformed(format!("column {} missing from the physical vector", col.name))
    })
}

/// The fixed-length override chain: spatial MBR, column fixed size,
/// prefix truncation, then the cap above which the field goes variable.
fn fixed_len_override(col: &ColumnModel, prefix_len: u32, spatial_first: bool) -> u32 {
    let mut fixed = if spatial_first {
        DATA_MBR_LEN
    } else {
        col.fixed_size()
    };
    if prefix_len > 0 && fixed > prefix_len {
        fixed = prefix_len;
    }
    if fixed > DICT_MAX_FIXED_COL_LEN {
        fixed = 0;
    }
    fixed
}

fn prefix_len_of(col: &ColumnModel, declared_length: u64) -> u32 {
    if declared_length == INDEX_ELEMENT_FULL_LENGTH {
        return 0;
    }
    let len = declared_length.min(u64::from(u32::MAX)) as u32;
    if col.col_len > 0 && len < col.col_len {
        len
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innodb::column::ColumnModel;

    fn varchar_col(char_length: u32) -> ColumnModel {
        let dd = serde_json::from_value(serde_json::json!({
            "name": "v",
            "type": 16,
            "is_nullable": true,
            "hidden": 1,
            "ordinal_position": 1,
            "char_length": char_length,
            "collation_id": 8
        }))
        .unwrap();
        let mut col = ColumnModel::from_dd(&dd).unwrap();
        col.col_len = col.pack_length() - col.varchar_len_bytes();
        col
    }

    #[test]
    fn test_prefix_len_of() {
        let col = varchar_col(100);
        assert_eq!(col.col_len, 100);
        // full column, sentinel length
        assert_eq!(prefix_len_of(&col, INDEX_ELEMENT_FULL_LENGTH), 0);
        // full column, explicit length
        assert_eq!(prefix_len_of(&col, 100), 0);
        // true prefix
        assert_eq!(prefix_len_of(&col, 10), 10);
    }

    #[test]
    fn test_unsupported_reason_text() {
        let layout = IndexLayout {
            unsupported: UNSUPP_INDEX_VIRTUAL | UNSUPP_INDEX_SPATIAL,
            ..IndexLayout {
                name: "ix".to_string(),
                dd_type: IndexType::Multiple,
                hidden: false,
                id: 0,
                root_page: 0,
                type_flags: 0,
                unsupported: 0,
                user_defined_key_parts: 0,
                key_length: 0,
                n_fields: 0,
                n_uniq: 0,
                n_def: 0,
                n_nullable: 0,
                n_total_fields: 0,
                fields: Vec::new(),
                fields_array: Vec::new(),
                nullables: [0; MAX_ROW_VERSION as usize + 1],
                row_versions: false,
                instant_cols: false,
                n_instant_nullable: 0,
            }
        };
        assert!(!layout.is_supported());
        let reason = layout.unsupported_reason();
        assert!(reason.contains("virtual columns"));
        assert!(reason.contains("Spatial"));
    }
}
