//! InnoDB record, page, and dictionary format constants.
//!
//! Values are derived from the MySQL/InnoDB source headers:
//! - rem0rec.h (compact record header geometry, info bits)
//! - dict0dict.h / dict0mem.h (system column lengths, index type flags)
//! - page0page.h / fil0fil.h (page header offsets, system records)
//! - lob0lob.h (external field reference layout)

// ---------------------------------------------------------------------------
// Compact (new-style) record header
// ---------------------------------------------------------------------------

/// Bytes of fixed extra header preceding every compact record origin.
pub const REC_N_NEW_EXTRA_BYTES: usize = 5;

/// Offset (backwards from the record origin) of the byte holding the
/// 3-bit record status.
pub const REC_NEW_STATUS: usize = 3;
/// Mask for the record status bits within that byte.
pub const REC_NEW_STATUS_MASK: u8 = 0x07;

/// Offset (backwards from the record origin) of the info-bits byte.
pub const REC_NEW_INFO_BITS: usize = 5;
/// Mask for the info bits within that byte (upper nibble).
pub const REC_INFO_BITS_MASK: u8 = 0xF0;
/// Leftmost record on a non-leaf level.
pub const REC_INFO_MIN_REC_FLAG: u8 = 0x10;
/// Delete mark.
pub const REC_INFO_DELETED_FLAG: u8 = 0x20;
/// Record carries a row-version byte (second-generation instant DDL).
pub const REC_INFO_VERSION_FLAG: u8 = 0x40;
/// Record carries a field-count prefix (first-generation instant ADD).
pub const REC_INFO_INSTANT_FLAG: u8 = 0x80;

/// Offset (backwards from the record origin) of the 2-byte next-record
/// pointer within the extra header.
pub const REC_OFF_NEXT: usize = 2;

/// High bit of the first field-count byte: a second byte follows.
pub const REC_N_FIELDS_TWO_BYTES_FLAG: u8 = 0x80;
/// Value mask of the first field-count byte when two bytes are used.
pub const REC_N_FIELDS_ONE_BYTE_MAX: u8 = 0x7F;
/// Upper bound on the declared field count of any record.
pub const REC_MAX_N_FIELDS: u16 = 1023;

/// Size of the child page number field in node-pointer records.
pub const REC_NODE_PTR_SIZE: u32 = 4;

// ---------------------------------------------------------------------------
// Data dictionary / system columns
// ---------------------------------------------------------------------------

/// Number of implicit system columns in every clustered record
/// (DB_ROW_ID is conditional, DB_TRX_ID and DB_ROLL_PTR are not, but the
/// engine reserves slots for all three in the physical column vector).
pub const DATA_N_SYS_COLS: u32 = 3;
/// Hidden row id length.
pub const DATA_ROW_ID_LEN: u32 = 6;
/// Transaction id length.
pub const DATA_TRX_ID_LEN: u32 = 6;
/// Rollback pointer length.
pub const DATA_ROLL_PTR_LEN: u32 = 7;

/// Maximum fixed column length the engine will keep fixed inside an index;
/// anything longer falls back to the variable-length path.
pub const DICT_MAX_FIXED_COL_LEN: u32 = 768;

/// Fixed minimum-bounding-rectangle length for the first field of a
/// spatial index (2 dimensions x 2 coordinates x 8 bytes).
pub const DATA_MBR_LEN: u32 = 32;

/// Highest row version a record may carry; the per-version nullable table
/// is sized `MAX_ROW_VERSION + 1`.
pub const MAX_ROW_VERSION: u8 = 64;

// Index type flags (dict_index_t::type).
pub const DICT_CLUSTERED: u32 = 1;
pub const DICT_UNIQUE: u32 = 2;
pub const DICT_FTS: u32 = 32;
pub const DICT_SPATIAL: u32 = 64;

// ---------------------------------------------------------------------------
// External (off-page) field reference
// ---------------------------------------------------------------------------

/// Offset of the space id within the 20-byte external field reference.
pub const BTR_EXTERN_SPACE_ID: usize = 0;
/// Offset of the first LOB page number.
pub const BTR_EXTERN_PAGE_NO: usize = 4;
/// Offset of the LOB version.
pub const BTR_EXTERN_VERSION: usize = 8;
/// Offset of the 8-byte length word.
pub const BTR_EXTERN_LEN: usize = 12;
/// Total size of the external field reference trailer.
pub const BTR_EXTERN_FIELD_REF_SIZE: usize = 20;
/// Mask isolating the stored length from the owner/inherited flag bits.
pub const BTR_EXTERN_LEN_MASK: u64 = 0x1F_FFFF_FFFF;

// ---------------------------------------------------------------------------
// Collations
// ---------------------------------------------------------------------------

/// The designated binary collation (`my_charset_bin`); sole determinant of
/// binary vs. text interpretation for string-class columns.
pub const COLLATION_BINARY: u64 = 63;
/// `my_charset_latin1`, special-cased by the physical type derivation.
pub const COLLATION_LATIN1: u64 = 8;

// ---------------------------------------------------------------------------
// Page layout (subset used by the record-walking boundary)
// ---------------------------------------------------------------------------

/// Default page size.
pub const SIZE_PAGE_DEFAULT: usize = 16384;

// FIL header field offsets.
pub const FIL_PAGE_OFFSET: usize = 4;
pub const FIL_PAGE_PREV: usize = 8;
pub const FIL_PAGE_NEXT: usize = 12;
pub const FIL_PAGE_TYPE: usize = 24;
pub const FIL_PAGE_SPACE_ID: usize = 34;
/// Start of page data (immediately after the 38-byte FIL header).
pub const FIL_PAGE_DATA: usize = 38;

// INDEX page header field offsets (relative to FIL_PAGE_DATA).
pub const PAGE_N_HEAP: usize = 4;
pub const PAGE_N_RECS: usize = 16;
pub const PAGE_LEVEL: usize = 26;
pub const PAGE_INDEX_ID: usize = 28;

/// Record origin of the infimum system record on a compact page.
pub const PAGE_NEW_INFIMUM: usize = 99;
/// Record origin of the supremum system record on a compact page.
pub const PAGE_NEW_SUPREMUM: usize = 112;

/// "Null" page number reference.
pub const FIL_NULL: u32 = 0xFFFF_FFFF;
