//! Fused logical + physical column descriptions.
//!
//! A [`ColumnModel`] starts from the dictionary's declarative description
//! (type code, nullability, lengths, collation) and is completed during
//! schema fusion with the engine-side attributes that record decoding
//! needs: physical storage type, physical byte length, physical position,
//! instant ADD/DROP version stamps, and the instant-default marker.
//!
//! The derivations in this module are byte-exact reimplementations of the
//! engine's own rules; `pack_length` in particular feeds every fixed-width
//! decision downstream, so its values (including the packed-decimal
//! formula) must match the server exactly.

use crate::innodb::constants::{COLLATION_BINARY, COLLATION_LATIN1};
use crate::innodb::properties::Properties;
use crate::innodb::sdi::DdColumn;
use crate::IbdError;

/// Declared logical column type, as encoded in the dictionary's `type`
/// field (codes 1..=31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Decimal = 1,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    TypeNull,
    Timestamp,
    Longlong,
    Int24,
    Date,
    Time,
    Datetime,
    Year,
    Newdate,
    Varchar,
    Bit,
    Timestamp2,
    Datetime2,
    Time2,
    Newdecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    Json,
}

impl LogicalType {
    /// Map a dictionary type code to a logical type.
    ///
    /// An unrecognized code is a fatal configuration error: the document is
    /// corrupt or written by an unsupported server.
    ///
    /// # Examples
    ///
    /// ```
    /// use ibd::innodb::column::LogicalType;
    ///
    /// assert_eq!(LogicalType::from_dd(4).unwrap(), LogicalType::Long);
    /// assert_eq!(LogicalType::from_dd(16).unwrap(), LogicalType::Varchar);
    /// assert_eq!(LogicalType::from_dd(31).unwrap(), LogicalType::Json);
    /// assert!(LogicalType::from_dd(32).is_err());
    /// ```
    pub fn from_dd(code: u64) -> Result<Self, IbdError> {
        use LogicalType::*;
        Ok(match code {
            1 => Decimal,
            2 => Tiny,
            3 => Short,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => TypeNull,
            8 => Timestamp,
            9 => Longlong,
            10 => Int24,
            11 => Date,
            12 => Time,
            13 => Datetime,
            14 => Year,
            15 => Newdate,
            16 => Varchar,
            17 => Bit,
            18 => Timestamp2,
            19 => Datetime2,
            20 => Time2,
            21 => Newdecimal,
            22 => Enum,
            23 => Set,
            24 => TinyBlob,
            25 => MediumBlob,
            26 => LongBlob,
            27 => Blob,
            28 => VarString,
            29 => String,
            30 => Geometry,
            31 => Json,
            other => {
                return Err(IbdError::Malformed(format!(
                    "unrecognized column type code {}",
                    other
                )))
            }
        })
    }

    /// Collapsed field class: several logical types share one runtime field
    /// implementation (all blob widths, enum/set as strings, the v1/v2
    /// temporal pairs).
    pub fn field_kind(self) -> FieldKind {
        use LogicalType::*;
        match self {
            VarString | String | Enum | Set => FieldKind::String,
            Varchar => FieldKind::Varchar,
            Blob | MediumBlob | TinyBlob | LongBlob => FieldKind::Blob,
            Geometry => FieldKind::Geometry,
            Json => FieldKind::Json,
            Decimal => FieldKind::Decimal,
            Newdecimal => FieldKind::NewDecimal,
            Float => FieldKind::Float,
            Double => FieldKind::Double,
            Tiny => FieldKind::Tiny,
            Short => FieldKind::Short,
            Int24 => FieldKind::Int24,
            Long => FieldKind::Long,
            Longlong => FieldKind::LongLong,
            Timestamp | Timestamp2 => FieldKind::Timestamp,
            Year => FieldKind::Year,
            Date | Newdate => FieldKind::Date,
            Time | Time2 => FieldKind::Time,
            Datetime | Datetime2 => FieldKind::Datetime,
            TypeNull => FieldKind::Null,
            Bit => FieldKind::Bit,
        }
    }
}

/// Collapsed runtime field class (see [`LogicalType::field_kind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Varchar,
    Blob,
    Geometry,
    Json,
    Decimal,
    NewDecimal,
    Float,
    Double,
    Tiny,
    Short,
    Int24,
    Long,
    LongLong,
    Timestamp,
    Year,
    Date,
    Time,
    Datetime,
    Null,
    Bit,
}

/// Engine-side physical storage classification (main type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    /// latin1 VARCHAR.
    Varchar,
    /// latin1 CHAR.
    Char,
    /// Fixed-length binary (v2 temporals, packed decimal, BIT, binary CHAR).
    Fixbinary,
    /// Variable-length binary (binary VARCHAR).
    Binary,
    /// BLOB/TEXT/JSON payloads.
    Blob,
    /// Integer-encoded (ints, enum/set, year, dates, v1 temporals).
    Int,
    /// Implicit system columns.
    Sys,
    Float,
    Double,
    /// Legacy pre-5.0 decimal.
    Decimal,
    /// Non-latin1 VARCHAR.
    Varmysql,
    /// Non-latin1 CHAR.
    Mysql,
    Geometry,
    /// Fixed-length POINT.
    Point,
    /// Variable-length POINT.
    VarPoint,
}

impl PhysicalType {
    /// Engine source-style name (e.g. `"DATA_VARCHAR"`).
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalType::Varchar => "DATA_VARCHAR",
            PhysicalType::Char => "DATA_CHAR",
            PhysicalType::Fixbinary => "DATA_FIXBINARY",
            PhysicalType::Binary => "DATA_BINARY",
            PhysicalType::Blob => "DATA_BLOB",
            PhysicalType::Int => "DATA_INT",
            PhysicalType::Sys => "DATA_SYS",
            PhysicalType::Float => "DATA_FLOAT",
            PhysicalType::Double => "DATA_DOUBLE",
            PhysicalType::Decimal => "DATA_DECIMAL",
            PhysicalType::Varmysql => "DATA_VARMYSQL",
            PhysicalType::Mysql => "DATA_MYSQL",
            PhysicalType::Geometry => "DATA_GEOMETRY",
            PhysicalType::Point => "DATA_POINT",
            PhysicalType::VarPoint => "DATA_VAR_POINT",
        }
    }
}

/// Column hidden kind, from the dictionary's `hidden` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenKind {
    /// Ordinary visible column.
    Visible = 1,
    /// Storage-engine hidden (DB_TRX_ID, DB_ROLL_PTR, DB_ROW_ID, dropped
    /// columns, implicit FTS_DOC_ID).
    Se,
    /// SQL-layer hidden.
    Sql,
    /// User-hidden (INVISIBLE columns).
    User,
}

impl HiddenKind {
    fn from_dd(code: u64) -> Result<Self, IbdError> {
        Ok(match code {
            1 => HiddenKind::Visible,
            2 => HiddenKind::Se,
            3 => HiddenKind::Sql,
            4 => HiddenKind::User,
            other => {
                return Err(IbdError::Malformed(format!(
                    "unrecognized column hidden kind {}",
                    other
                )))
            }
        })
    }
}

/// Base-10^9 digit-group remainder cost for packed decimals.
const DIG2BYTES: [u32; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];
const DIG_PER_DEC1: u32 = 9;

/// Packed byte length of a DECIMAL(precision, scale) value.
///
/// Whole and fractional digits are packed independently: each full group
/// of 9 digits costs 4 bytes, and the leftover digits cost a table lookup
/// of 0-4 bytes.
///
/// # Examples
///
/// ```
/// use ibd::innodb::column::decimal_pack_length;
///
/// assert_eq!(decimal_pack_length(10, 2), 5);
/// assert_eq!(decimal_pack_length(65, 30), 30);
/// assert_eq!(decimal_pack_length(9, 0), 4);
/// ```
pub fn decimal_pack_length(precision: u32, scale: u32) -> u32 {
    debug_assert!(scale <= precision && precision > 0);
    let intg = precision - scale;
    let intg0 = intg / DIG_PER_DEC1;
    let frac0 = scale / DIG_PER_DEC1;
    let intg0x = intg % DIG_PER_DEC1;
    let frac0x = scale % DIG_PER_DEC1;
    intg0 * 4 + DIG2BYTES[intg0x as usize] + frac0 * 4 + DIG2BYTES[frac0x as usize]
}

/// Length-prefix width of a VARCHAR with the given declared byte length.
pub fn varchar_len_bytes(char_length: u32) -> u32 {
    if char_length < 256 {
        1
    } else {
        2
    }
}

/// Minimum and maximum bytes per character for a collation id.
///
/// Covers the collation families a reader encounters in practice; unknown
/// ids fall back to (1, 4), which forces the variable-length path for
/// multi-byte CHAR and is always safe for decoding.
pub(crate) fn collation_char_widths(collation_id: u64) -> (u32, u32) {
    match collation_id {
        // latin1 family
        5 | 8 | 15 | 31 | 47 | 48 | 49 | 94 => (1, 1),
        // ascii
        11 | 65 => (1, 1),
        // binary
        63 => (1, 1),
        // ucs2
        35 | 90 | 128..=151 => (2, 2),
        // utf16
        54 | 56 | 101..=124 => (2, 4),
        // utf32
        60 | 61 | 160..=183 => (4, 4),
        // utf8mb3
        33 | 83 | 192..=215 => (1, 3),
        // utf8mb4
        45 | 46 | 224..=247 | 255..=323 => (1, 4),
        _ => (1, 4),
    }
}

/// One column's fused logical + physical description.
///
/// Constructed from the dictionary document when the owning table parses
/// its column list; the engine-side fields are filled during the single
/// schema-fusion pass and never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    /// Column name.
    pub name: std::string::String,
    /// Declared logical type.
    pub logical: LogicalType,
    /// Whether the column allows NULL.
    pub nullable: bool,
    /// Whether the column is virtual (generated, never stored).
    pub is_virtual: bool,
    /// Visibility kind.
    pub hidden: HiddenKind,
    /// 1-based position in the declared column list.
    pub ordinal_position: u32,
    /// Declared length in bytes.
    pub char_length: u32,
    /// Numeric precision (DECIMAL).
    pub numeric_precision: u32,
    /// Numeric scale (DECIMAL).
    pub numeric_scale: u32,
    /// Fractional seconds precision (v2 temporals).
    pub datetime_precision: u32,
    /// ENUM/SET member count.
    pub n_elements: u32,
    /// Collation id.
    pub collation_id: u64,

    // Dictionary-side instant metadata, read from se_private_data.
    /// `version_added` stamp from the document, if any.
    pub dd_version_added: Option<u8>,
    /// `version_dropped` stamp from the document, if any.
    pub dd_version_dropped: Option<u8>,
    /// Pre-assigned physical position from the document, if any.
    pub dd_physical_pos: Option<u32>,
    /// Whether the document carries an explicit instant default value.
    pub dd_default: bool,
    /// Whether the document records a NULL instant default.
    pub dd_default_null: bool,

    // Engine-side attributes, populated during schema fusion.
    /// Index within the physical column vector.
    pub phys_index: Option<u32>,
    /// Physical storage classification.
    pub mtype: PhysicalType,
    /// Whether the column is visible at the engine level.
    pub visible: bool,
    /// Instant-add version stamp (None = never instantly added).
    pub version_added: Option<u8>,
    /// Instant-drop version stamp (None = never instantly dropped).
    pub version_dropped: Option<u8>,
    /// Physical position within a stored record (None until assigned).
    pub phy_pos: Option<u32>,
    /// Physical byte length (0 = variable; VARCHAR excludes its prefix).
    pub col_len: u32,
    /// Whether an explicit default value was supplied when the column was
    /// instantly added (selects default vs. null substitution).
    pub instant_default: bool,
    /// Whether this model was synthesized by the engine rather than
    /// declared in the document (implicit DB_ROW_ID, implicit FTS_DOC_ID).
    pub synthesized: bool,
    /// Slot representing this column in the clustered index, set once
    /// during clustered index construction.
    pub clustered_slot: Option<usize>,
}

impl ColumnModel {
    /// Build a model from a dictionary column, validating the pieces the
    /// fusion pass depends on.
    pub fn from_dd(col: &DdColumn) -> Result<ColumnModel, IbdError> {
        let logical = LogicalType::from_dd(col.dd_type)?;
        let hidden = HiddenKind::from_dd(col.hidden)?;

        if logical == LogicalType::Newdecimal
            && (col.numeric_precision == 0 || col.numeric_scale > col.numeric_precision)
        {
            return Err(IbdError::Malformed(format!(
                "column {}: invalid decimal precision/scale {}/{}",
                col.name, col.numeric_precision, col.numeric_scale
            )));
        }

        let se_private = Properties::parse(&col.se_private_data)?;
        let dd_version_added = read_version_stamp(&se_private, "version_added", &col.name)?;
        let dd_version_dropped = read_version_stamp(&se_private, "version_dropped", &col.name)?;
        let dd_physical_pos = se_private.get_u32("physical_pos");

        let mut model = ColumnModel {
            name: col.name.clone(),
            logical,
            nullable: col.is_nullable,
            is_virtual: col.is_virtual,
            hidden,
            ordinal_position: col.ordinal_position,
            char_length: col.char_length,
            numeric_precision: col.numeric_precision,
            numeric_scale: col.numeric_scale,
            datetime_precision: col.datetime_precision,
            n_elements: col.elements.len() as u32,
            collation_id: col.collation_id,
            dd_version_added,
            dd_version_dropped,
            dd_physical_pos,
            dd_default: se_private.contains("default"),
            dd_default_null: se_private.contains("default_null"),
            phys_index: None,
            mtype: PhysicalType::Binary,
            visible: !matches!(hidden, HiddenKind::Se | HiddenKind::Sql),
            version_added: None,
            version_dropped: None,
            phy_pos: None,
            col_len: 0,
            instant_default: false,
            synthesized: false,
            clustered_slot: None,
        };
        model.mtype = model.physical_type();
        Ok(model)
    }

    /// Synthesize an implicit system column (used for DB_ROW_ID when the
    /// document does not declare one).
    pub(crate) fn new_sys(name: &str, phys_index: u32, col_len: u32) -> ColumnModel {
        ColumnModel {
            name: name.to_string(),
            logical: LogicalType::Int24,
            nullable: false,
            is_virtual: false,
            hidden: HiddenKind::Se,
            ordinal_position: 0,
            char_length: 0,
            numeric_precision: 0,
            numeric_scale: 0,
            datetime_precision: 0,
            n_elements: 0,
            collation_id: COLLATION_BINARY,
            dd_version_added: None,
            dd_version_dropped: None,
            dd_physical_pos: None,
            dd_default: false,
            dd_default_null: false,
            phys_index: Some(phys_index),
            mtype: PhysicalType::Sys,
            visible: false,
            version_added: None,
            version_dropped: None,
            phy_pos: None,
            col_len,
            instant_default: false,
            synthesized: true,
            clustered_slot: None,
        }
    }

    /// Synthesize the implicit full-text document-id column.
    pub(crate) fn new_fts_doc_id(phys_index: u32) -> ColumnModel {
        ColumnModel {
            logical: LogicalType::Longlong,
            mtype: PhysicalType::Int,
            col_len: 8,
            ..ColumnModel::new_sys(super::table::FTS_DOC_ID_COL_NAME, phys_index, 8)
        }
    }

    /// Collapsed field class of the declared type.
    pub fn field_kind(&self) -> FieldKind {
        self.logical.field_kind()
    }

    /// Whether this is one of the three implicit system columns.
    pub fn is_system_column(&self) -> bool {
        self.name == "DB_ROW_ID" || self.name == "DB_TRX_ID" || self.name == "DB_ROLL_PTR"
    }

    /// Whether the column is hidden at the storage-engine level.
    pub fn is_se_hidden(&self) -> bool {
        self.hidden == HiddenKind::Se
    }

    /// Whether the stored representation is raw binary rather than
    /// collation-aware text. Only the binary collation makes a
    /// string-class column binary; every other type is unconditionally
    /// binary at the physical level.
    pub fn is_binary(&self) -> bool {
        match self.field_kind() {
            FieldKind::String
            | FieldKind::Varchar
            | FieldKind::Blob
            | FieldKind::Geometry
            | FieldKind::Json
            | FieldKind::Null => self.collation_id == COLLATION_BINARY,
            _ => true,
        }
    }

    /// Derive the engine storage classification from the declared type.
    pub fn physical_type(&self) -> PhysicalType {
        // enum/set are integer-encoded regardless of their string class
        if matches!(self.logical, LogicalType::Enum | LogicalType::Set) {
            return PhysicalType::Int;
        }

        match self.field_kind() {
            FieldKind::Varchar => {
                if self.is_binary() {
                    PhysicalType::Binary
                } else if self.collation_id == COLLATION_LATIN1 {
                    PhysicalType::Varchar
                } else {
                    PhysicalType::Varmysql
                }
            }
            FieldKind::Bit | FieldKind::String => {
                if self.is_binary() {
                    PhysicalType::Fixbinary
                } else if self.collation_id == COLLATION_LATIN1 {
                    PhysicalType::Char
                } else {
                    PhysicalType::Mysql
                }
            }
            FieldKind::NewDecimal => PhysicalType::Fixbinary,
            FieldKind::Tiny
            | FieldKind::Short
            | FieldKind::Int24
            | FieldKind::Long
            | FieldKind::LongLong
            | FieldKind::Year
            | FieldKind::Date => PhysicalType::Int,
            FieldKind::Time | FieldKind::Datetime | FieldKind::Timestamp => match self.logical {
                // first-generation temporals are integer-packed
                LogicalType::Time | LogicalType::Datetime | LogicalType::Timestamp => {
                    PhysicalType::Int
                }
                _ => PhysicalType::Fixbinary,
            },
            FieldKind::Float => PhysicalType::Float,
            FieldKind::Double => PhysicalType::Double,
            FieldKind::Decimal => PhysicalType::Decimal,
            FieldKind::Geometry => PhysicalType::Geometry,
            FieldKind::Blob | FieldKind::Json => PhysicalType::Blob,
            FieldKind::Null => PhysicalType::Binary,
        }
    }

    /// Length-prefix width this column's VARCHAR encoding uses.
    pub fn varchar_len_bytes(&self) -> u32 {
        varchar_len_bytes(self.char_length)
    }

    /// Maximum logical byte footprint of the declared type.
    pub fn pack_length(&self) -> u32 {
        use LogicalType::*;
        match self.logical {
            VarString | String => self.char_length,
            Varchar => self.varchar_len_bytes() + self.char_length,
            TinyBlob => 1 + 8,
            Blob => 2 + 8,
            MediumBlob => 3 + 8,
            LongBlob | Geometry | Json => 4 + 8,
            Enum => {
                if self.n_elements < 256 {
                    1
                } else {
                    2
                }
            }
            Set => {
                let len = (self.n_elements + 7) / 8;
                if len > 4 {
                    8
                } else {
                    len
                }
            }
            Decimal => self.char_length,
            Newdecimal => decimal_pack_length(self.numeric_precision, self.numeric_scale),
            Float => 4,
            Double => 8,
            Tiny => 1,
            Short => 2,
            Int24 => 3,
            Long => 4,
            Longlong => 8,
            Timestamp => self.char_length,
            Timestamp2 => 4 + (self.datetime_precision + 1) / 2,
            Year => 1,
            Date => 4,
            Newdate => 3,
            Time => 3,
            Time2 => 3 + (self.datetime_precision + 1) / 2,
            Datetime => 8,
            Datetime2 => 5 + (self.datetime_precision + 1) / 2,
            TypeNull => 0,
            Bit => (self.char_length + 7) / 8,
        }
    }

    /// Fixed physical byte length within an index, 0 for variable-length.
    pub fn fixed_size(&self) -> u32 {
        match self.mtype {
            PhysicalType::Sys
            | PhysicalType::Char
            | PhysicalType::Fixbinary
            | PhysicalType::Int
            | PhysicalType::Float
            | PhysicalType::Double
            | PhysicalType::Point => self.col_len,
            PhysicalType::Mysql => {
                if self.is_binary() {
                    self.col_len
                } else {
                    let (min, max) = collation_char_widths(self.collation_id);
                    if min == max {
                        self.col_len
                    } else {
                        0
                    }
                }
            }
            PhysicalType::Varchar
            | PhysicalType::Binary
            | PhysicalType::Decimal
            | PhysicalType::Varmysql
            | PhysicalType::VarPoint
            | PhysicalType::Geometry
            | PhysicalType::Blob => 0,
        }
    }

    /// Whether the column qualifies for off-page (external) storage: its
    /// physical length exceeds 255 bytes, or its kind is inherently large.
    pub fn is_big_col(&self) -> bool {
        self.col_len > 255
            || matches!(
                self.mtype,
                PhysicalType::Blob | PhysicalType::VarPoint | PhysicalType::Geometry
            )
    }

    /// Whether the column was instantly added (second generation stamps a
    /// real version; system columns and original columns have none).
    pub fn is_instant_added(&self) -> bool {
        matches!(self.version_added, Some(v) if v > 0)
    }

    /// Whether the column was instantly dropped.
    pub fn is_instant_dropped(&self) -> bool {
        matches!(self.version_dropped, Some(v) if v > 0)
    }

    /// Dropped-at-or-before predicate against a record's row version.
    pub fn is_dropped_in_or_before(&self, version: u8) -> bool {
        match self.version_dropped {
            Some(v) if v > 0 => v <= version,
            _ => false,
        }
    }

    /// Added-after predicate against a record's row version.
    pub fn is_added_after(&self, version: u8) -> bool {
        match self.version_added {
            Some(v) if v > 0 => v > version,
            _ => false,
        }
    }
}

fn read_version_stamp(
    props: &Properties,
    key: &str,
    col_name: &str,
) -> Result<Option<u8>, IbdError> {
    match props.get(key) {
        None => Ok(None),
        Some(raw) => {
            let v: u32 = raw.parse().map_err(|_| {
                IbdError::Malformed(format!("column {}: bad {} value {:?}", col_name, key, raw))
            })?;
            if v == 0 || v > u32::from(crate::innodb::constants::MAX_ROW_VERSION) {
                return Err(IbdError::Malformed(format!(
                    "column {}: {} {} outside 1..=64",
                    col_name, key, v
                )));
            }
            Ok(Some(v as u8))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innodb::sdi::DdColumn;

    fn dd_col(name: &str, dd_type: u64) -> DdColumn {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "type": dd_type,
            "is_nullable": false,
            "hidden": 1,
            "ordinal_position": 1
        }))
        .unwrap()
    }

    fn col(dd_type: u64) -> ColumnModel {
        ColumnModel::from_dd(&dd_col("c", dd_type)).unwrap()
    }

    #[test]
    fn test_integer_pack_lengths() {
        assert_eq!(col(2).pack_length(), 1); // tinyint
        assert_eq!(col(3).pack_length(), 2); // smallint
        assert_eq!(col(10).pack_length(), 3); // mediumint
        assert_eq!(col(4).pack_length(), 4); // int
        assert_eq!(col(9).pack_length(), 8); // bigint
        assert_eq!(col(5).pack_length(), 4); // float
        assert_eq!(col(6).pack_length(), 8); // double
        assert_eq!(col(14).pack_length(), 1); // year
        assert_eq!(col(15).pack_length(), 3); // newdate
    }

    #[test]
    fn test_temporal_v2_pack_lengths() {
        let mut c = col(19); // datetime2
        assert_eq!(c.pack_length(), 5);
        c.datetime_precision = 3;
        assert_eq!(c.pack_length(), 7);
        c.datetime_precision = 6;
        assert_eq!(c.pack_length(), 8);

        let mut t = col(18); // timestamp2
        assert_eq!(t.pack_length(), 4);
        t.datetime_precision = 6;
        assert_eq!(t.pack_length(), 7);

        let mut tm = col(20); // time2
        assert_eq!(tm.pack_length(), 3);
        tm.datetime_precision = 4;
        assert_eq!(tm.pack_length(), 5);
    }

    #[test]
    fn test_varchar_pack_length_threshold() {
        let mut c = col(16);
        c.char_length = 255;
        assert_eq!(c.varchar_len_bytes(), 1);
        assert_eq!(c.pack_length(), 256);
        c.char_length = 256;
        assert_eq!(c.varchar_len_bytes(), 2);
        assert_eq!(c.pack_length(), 258);
    }

    #[test]
    fn test_decimal_pack_length_boundaries() {
        // full-scale decimal
        assert_eq!(decimal_pack_length(65, 30), 30);
        // scale == precision
        assert_eq!(decimal_pack_length(30, 30), 14);
        // scale == 0
        assert_eq!(decimal_pack_length(30, 0), 14);
        assert_eq!(decimal_pack_length(65, 0), 29);
        // small values
        assert_eq!(decimal_pack_length(1, 0), 1);
        assert_eq!(decimal_pack_length(9, 9), 4);
        assert_eq!(decimal_pack_length(18, 9), 8);
        // determinism
        assert_eq!(decimal_pack_length(21, 7), decimal_pack_length(21, 7));
    }

    #[test]
    fn test_enum_set_pack_lengths() {
        let mut e = col(22);
        e.n_elements = 255;
        assert_eq!(e.pack_length(), 1);
        e.n_elements = 256;
        assert_eq!(e.pack_length(), 2);

        let mut s = col(23);
        s.n_elements = 8;
        assert_eq!(s.pack_length(), 1);
        s.n_elements = 33;
        assert_eq!(s.pack_length(), 8);
    }

    #[test]
    fn test_blob_pack_lengths() {
        assert_eq!(col(24).pack_length(), 9); // tinyblob
        assert_eq!(col(27).pack_length(), 10); // blob
        assert_eq!(col(25).pack_length(), 11); // mediumblob
        assert_eq!(col(26).pack_length(), 12); // longblob
        assert_eq!(col(31).pack_length(), 12); // json
    }

    #[test]
    fn test_is_binary_collation_driven() {
        let mut c = col(16); // varchar
        c.collation_id = 255;
        assert!(!c.is_binary());
        c.collation_id = COLLATION_BINARY;
        assert!(c.is_binary());

        // integers are binary no matter the collation
        let mut i = col(4);
        i.collation_id = 255;
        assert!(i.is_binary());
    }

    #[test]
    fn test_physical_type_varchar_split() {
        let mut c = col(16);
        c.collation_id = COLLATION_LATIN1;
        assert_eq!(c.physical_type(), PhysicalType::Varchar);
        c.collation_id = 255;
        assert_eq!(c.physical_type(), PhysicalType::Varmysql);
        c.collation_id = COLLATION_BINARY;
        assert_eq!(c.physical_type(), PhysicalType::Binary);
    }

    #[test]
    fn test_physical_type_char_split() {
        let mut c = col(29);
        c.collation_id = COLLATION_LATIN1;
        assert_eq!(c.physical_type(), PhysicalType::Char);
        c.collation_id = 255;
        assert_eq!(c.physical_type(), PhysicalType::Mysql);
        c.collation_id = COLLATION_BINARY;
        assert_eq!(c.physical_type(), PhysicalType::Fixbinary);
    }

    #[test]
    fn test_physical_type_collapses() {
        assert_eq!(col(22).physical_type(), PhysicalType::Int); // enum
        assert_eq!(col(23).physical_type(), PhysicalType::Int); // set
        assert_eq!(col(21).physical_type(), PhysicalType::Fixbinary); // newdecimal
        assert_eq!(col(13).physical_type(), PhysicalType::Int); // datetime v1
        assert_eq!(col(19).physical_type(), PhysicalType::Fixbinary); // datetime2
        assert_eq!(col(26).physical_type(), PhysicalType::Blob); // longblob
        assert_eq!(col(31).physical_type(), PhysicalType::Blob); // json
        assert_eq!(col(30).physical_type(), PhysicalType::Geometry);
    }

    #[test]
    fn test_fixed_size_variable_kinds() {
        let mut c = col(16); // varchar latin1
        c.collation_id = COLLATION_LATIN1;
        c.mtype = c.physical_type();
        c.col_len = 100;
        assert_eq!(c.fixed_size(), 0);

        let mut i = col(4);
        i.mtype = i.physical_type();
        i.col_len = 4;
        assert_eq!(i.fixed_size(), 4);
    }

    #[test]
    fn test_fixed_size_multibyte_char() {
        // utf8mb4 CHAR: min 1 != max 4, stored variable
        let mut c = col(29);
        c.collation_id = 255;
        c.char_length = 40;
        c.mtype = c.physical_type();
        c.col_len = 40;
        assert_eq!(c.fixed_size(), 0);

        // ucs2 CHAR: min == max == 2, stays fixed
        c.collation_id = 35;
        c.mtype = c.physical_type();
        assert_eq!(c.fixed_size(), 40);
    }

    #[test]
    fn test_is_big_col() {
        let mut c = col(26); // longblob
        c.mtype = c.physical_type();
        c.col_len = 12;
        assert!(c.is_big_col());

        let mut v = col(16);
        v.collation_id = 255;
        v.mtype = v.physical_type();
        v.col_len = 400;
        assert!(v.is_big_col());
        v.col_len = 100;
        assert!(!v.is_big_col());
    }

    #[test]
    fn test_instant_predicates() {
        let mut c = col(4);
        assert!(!c.is_instant_added());
        assert!(!c.is_added_after(0));

        c.version_added = Some(2);
        assert!(c.is_instant_added());
        assert!(c.is_added_after(1));
        assert!(!c.is_added_after(2));

        c.version_dropped = Some(3);
        assert!(c.is_instant_dropped());
        assert!(!c.is_dropped_in_or_before(2));
        assert!(c.is_dropped_in_or_before(3));
        assert!(c.is_dropped_in_or_before(64));
    }

    #[test]
    fn test_version_stamp_validation() {
        let mut dd = dd_col("c", 4);
        dd.se_private_data = "version_added=65;".to_string();
        assert!(ColumnModel::from_dd(&dd).is_err());
        dd.se_private_data = "version_added=0;".to_string();
        assert!(ColumnModel::from_dd(&dd).is_err());
        dd.se_private_data = "version_added=64;physical_pos=7;".to_string();
        let c = ColumnModel::from_dd(&dd).unwrap();
        assert_eq!(c.dd_version_added, Some(64));
        assert_eq!(c.dd_physical_pos, Some(7));
    }

    #[test]
    fn test_bad_decimal_rejected() {
        let mut dd = dd_col("d", 21);
        dd.numeric_precision = 5;
        dd.numeric_scale = 6;
        assert!(ColumnModel::from_dd(&dd).is_err());
    }

    #[test]
    fn test_unknown_type_code_rejected() {
        assert!(ColumnModel::from_dd(&dd_col("v", 32)).is_err());
        assert!(ColumnModel::from_dd(&dd_col("v", 0)).is_err());
    }
}
