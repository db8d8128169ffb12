//! Per-record offset and status computation.
//!
//! A [`RecordView`] interprets one compact-format record against its
//! index layout. Construction classifies the record's insertion state
//! (which generation of instant DDL, if any, governs its header), walks
//! the variable-width header region that precedes the record origin
//! (info bits, optional row-version byte, optional field-count prefix,
//! null bitmap, variable-length table), and produces one
//! [`FieldExtent`] per physical field: an end offset plus a status that
//! says whether the field is present, NULL, substituted by an instant
//! default, an instantly-dropped ghost, or stored off-page.
//!
//! Every header and body byte access is checked against the supplied
//! buffer; an overrun is [`IbdError::Corrupt`] and the caller must stop
//! traversing the page. The view is cheap and private to one record —
//! build as many as needed over a shared, immutable layout.

use byteorder::{BigEndian, ByteOrder};

use crate::innodb::constants::{
    BTR_EXTERN_FIELD_REF_SIZE, BTR_EXTERN_LEN, BTR_EXTERN_LEN_MASK, BTR_EXTERN_PAGE_NO,
    BTR_EXTERN_SPACE_ID, BTR_EXTERN_VERSION, MAX_ROW_VERSION, REC_INFO_BITS_MASK,
    REC_INFO_DELETED_FLAG, REC_INFO_INSTANT_FLAG, REC_INFO_MIN_REC_FLAG, REC_INFO_VERSION_FLAG,
    REC_MAX_N_FIELDS, REC_NEW_INFO_BITS, REC_NEW_STATUS, REC_NEW_STATUS_MASK,
    REC_N_FIELDS_ONE_BYTE_MAX, REC_N_FIELDS_TWO_BYTES_FLAG, REC_N_NEW_EXTRA_BYTES,
    REC_NODE_PTR_SIZE,
};
use crate::innodb::index::IndexLayout;
use crate::innodb::table::TableSchema;
use crate::IbdError;

/// Record status from the 3-bit header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Ordinary user record (leaf page).
    Ordinary,
    /// Node pointer record (non-leaf page).
    NodePtr,
    /// Infimum system record.
    Infimum,
    /// Supremum system record.
    Supremum,
}

impl RecordStatus {
    /// Decode the status bits (values above 3 are reserved).
    pub fn from_bits(bits: u8) -> Result<Self, IbdError> {
        Ok(match bits & REC_NEW_STATUS_MASK {
            0 => RecordStatus::Ordinary,
            1 => RecordStatus::NodePtr,
            2 => RecordStatus::Infimum,
            3 => RecordStatus::Supremum,
            other => {
                return Err(IbdError::Corrupt(format!(
                    "reserved record status {}",
                    other
                )))
            }
        })
    }

    /// MySQL source-style name (e.g. `"REC_STATUS_ORDINARY"`).
    pub fn name(&self) -> &'static str {
        match self {
            RecordStatus::Ordinary => "REC_STATUS_ORDINARY",
            RecordStatus::NodePtr => "REC_STATUS_NODE_PTR",
            RecordStatus::Infimum => "REC_STATUS_INFIMUM",
            RecordStatus::Supremum => "REC_STATUS_SUPREMUM",
        }
    }
}

/// The six mutually exclusive insertion states a leaf record can be in,
/// from the header's version/instant bits combined with the table's
/// instant-DDL history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertState {
    /// Table never used instant DDL; plain header.
    NoInstantNoVersion,
    /// Table has first-generation instant ADDs; record predates them.
    BeforeInstantAddOld,
    /// Record written after a first-generation instant ADD; header
    /// carries a field-count prefix.
    AfterInstantAddOld,
    /// Row-versioned table upgraded from the first generation; record
    /// carries an explicit version 0.
    AfterUpgradeBeforeInstantAddNew,
    /// Row-versioned table; record predates all versioned DDL and
    /// carries no version byte (decoded as version 0).
    BeforeInstantAddNew,
    /// Row-versioned table; record carries its row version.
    AfterInstantAddNew,
}

/// Where a record's nullable-bit count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullableSource {
    /// The index's declared nullable count.
    Declared,
    /// The nullable count before any instant ADD/DROP.
    BeforeInstantAddDrop,
    /// The per-version nullable table, keyed by the record's row version.
    PerVersion,
    /// Recomputed from the record's declared field-count prefix.
    InstantPrefix,
}

/// Optional header bytes and nullable-count source for one insert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPlan {
    /// Whether a 1-byte row version follows the fixed header.
    pub version_byte: bool,
    /// Whether a 1-or-2-byte field-count prefix follows the fixed header.
    pub field_count_prefix: bool,
    /// How many nullable bits the bitmap holds.
    pub nullable_source: NullableSource,
}

impl InsertState {
    /// Classify a leaf record from its header bits and table history.
    pub fn classify(
        index: &IndexLayout,
        table_has_instant_cols: bool,
        versioned: bool,
        instant: bool,
        version_byte: Option<u8>,
    ) -> Result<InsertState, IbdError> {
        if !index.has_instant_cols_or_row_versions() {
            if versioned || instant {
                return Err(IbdError::Corrupt(
                    "version/instant header bits on an index without instant history".to_string(),
                ));
            }
            return Ok(InsertState::NoInstantNoVersion);
        }
        if versioned && instant {
            return Err(IbdError::Corrupt(
                "version and instant header bits are mutually exclusive".to_string(),
            ));
        }
        if versioned {
            let v = version_byte.ok_or_else(|| {
                IbdError::Corrupt("versioned record too short for a version byte".to_string())
            })?;
            return Ok(if v == 0 {
                InsertState::AfterUpgradeBeforeInstantAddNew
            } else if index.row_versions {
                InsertState::AfterInstantAddNew
            } else {
                return Err(IbdError::Corrupt(format!(
                    "row version {} on an index without row versioning",
                    v
                )));
            });
        }
        if instant {
            if !table_has_instant_cols {
                return Err(IbdError::Corrupt(
                    "instant header bit on a table without first-generation history".to_string(),
                ));
            }
            return Ok(InsertState::AfterInstantAddOld);
        }
        if table_has_instant_cols {
            Ok(InsertState::BeforeInstantAddOld)
        } else {
            Ok(InsertState::BeforeInstantAddNew)
        }
    }

    /// The header bytes this state implies and where its nullable count
    /// comes from.
    pub fn header_plan(self) -> HeaderPlan {
        match self {
            InsertState::NoInstantNoVersion => HeaderPlan {
                version_byte: false,
                field_count_prefix: false,
                nullable_source: NullableSource::Declared,
            },
            InsertState::BeforeInstantAddOld | InsertState::BeforeInstantAddNew => HeaderPlan {
                version_byte: false,
                field_count_prefix: false,
                nullable_source: NullableSource::BeforeInstantAddDrop,
            },
            InsertState::AfterInstantAddOld => HeaderPlan {
                version_byte: false,
                field_count_prefix: true,
                nullable_source: NullableSource::InstantPrefix,
            },
            InsertState::AfterUpgradeBeforeInstantAddNew | InsertState::AfterInstantAddNew => {
                HeaderPlan {
                    version_byte: true,
                    field_count_prefix: false,
                    nullable_source: NullableSource::PerVersion,
                }
            }
        }
    }
}

/// Decoded status of one physical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Stored in the record; its bytes are at `start..end`.
    Present,
    /// SQL NULL (a set bit in the null bitmap); consumes no bytes.
    Null,
    /// Substituted by the column's instant default; consumes no bytes.
    Default,
    /// Instantly-dropped ghost slot; consumes no bytes.
    Dropped,
    /// Present in-page prefix whose true payload continues off-page; the
    /// last 20 in-page bytes are the external reference.
    External,
}

/// One entry of the per-field offsets table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldExtent {
    /// End offset within the record body (non-decreasing across fields).
    pub end: u32,
    /// Field status.
    pub status: FieldStatus,
}

/// Parsed 20-byte external field reference.
///
/// This trailer layout is a bit-exact contract consumed by LOB followers:
/// big-endian space id, page number, version, then an 8-byte length word
/// whose high bits are owner/inherited flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternRef {
    /// Tablespace holding the first LOB page.
    pub space_id: u32,
    /// First LOB page number.
    pub page_no: u32,
    /// LOB version.
    pub version: u32,
    /// Off-page payload length (flag bits masked off).
    pub length: u64,
}

impl ExternRef {
    /// Parse the trailing external reference from a field's in-page bytes.
    pub fn parse(field_bytes: &[u8]) -> Result<ExternRef, IbdError> {
        if field_bytes.len() < BTR_EXTERN_FIELD_REF_SIZE {
            return Err(IbdError::Corrupt(format!(
                "external field holds {} in-page bytes, need {}",
                field_bytes.len(),
                BTR_EXTERN_FIELD_REF_SIZE
            )));
        }
        let r = &field_bytes[field_bytes.len() - BTR_EXTERN_FIELD_REF_SIZE..];
        Ok(ExternRef {
            space_id: BigEndian::read_u32(&r[BTR_EXTERN_SPACE_ID..]),
            page_no: BigEndian::read_u32(&r[BTR_EXTERN_PAGE_NO..]),
            version: BigEndian::read_u32(&r[BTR_EXTERN_VERSION..]),
            length: BigEndian::read_u64(&r[BTR_EXTERN_LEN..]) & BTR_EXTERN_LEN_MASK,
        })
    }
}

/// One field as exposed to callers: identity, byte range, status.
#[derive(Debug, Clone, Copy)]
pub struct DecodedField<'a> {
    /// Physical field position within the record.
    pub pos: usize,
    /// Column name; `None` for the node-pointer child field and system
    /// records.
    pub name: Option<&'a str>,
    /// Start offset within the record body.
    pub start: u32,
    /// End offset within the record body.
    pub end: u32,
    /// Field status.
    pub status: FieldStatus,
}

/// Ephemeral decoded view over one record.
#[derive(Debug)]
pub struct RecordView<'a> {
    table: &'a TableSchema,
    index: &'a IndexLayout,
    buf: &'a [u8],
    origin: usize,
    status: RecordStatus,
    info_bits: u8,
    insert_state: Option<InsertState>,
    row_version: Option<u8>,
    header_len: u32,
    extents: Vec<FieldExtent>,
}

impl<'a> RecordView<'a> {
    /// Decode the record whose origin is at `buf[origin]`.
    ///
    /// The caller must have checked the table's and index's capability
    /// masks; decoding against an excluded entity is
    /// [`IbdError::Unsupported`]. A record that would read outside `buf`
    /// is [`IbdError::Corrupt`] and the page should be abandoned.
    pub fn parse(
        table: &'a TableSchema,
        index: &'a IndexLayout,
        buf: &'a [u8],
        origin: usize,
    ) -> Result<RecordView<'a>, IbdError> {
        if !table.is_record_decoding_supported() {
            return Err(IbdError::Unsupported(format!(
                "table {} is excluded from record decoding: {}",
                table.name,
                if table.is_supported() {
                    format!("row format {}", table.row_format.name())
                } else {
                    table.unsupported_reason()
                }
            )));
        }
        if !index.is_supported() {
            return Err(IbdError::Unsupported(format!(
                "index {} is excluded from record decoding: {}",
                index.name,
                index.unsupported_reason()
            )));
        }
        if origin < REC_N_NEW_EXTRA_BYTES || origin > buf.len() {
            return Err(IbdError::Corrupt(format!(
                "record origin {} outside buffer of {} bytes",
                origin,
                buf.len()
            )));
        }

        let info_bits = buf[origin - REC_NEW_INFO_BITS] & REC_INFO_BITS_MASK;
        let status = RecordStatus::from_bits(buf[origin - REC_NEW_STATUS])?;

        let mut view = RecordView {
            table,
            index,
            buf,
            origin,
            status,
            info_bits,
            insert_state: None,
            row_version: None,
            header_len: REC_N_NEW_EXTRA_BYTES as u32,
            extents: Vec::new(),
        };
        match status {
            RecordStatus::Infimum | RecordStatus::Supremum => {
                // fixed 8-byte system record body
                if origin + 8 > buf.len() {
                    return Err(IbdError::Corrupt(
                        "system record body runs past buffer".to_string(),
                    ));
                }
                view.extents.push(FieldExtent {
                    end: 8,
                    status: FieldStatus::Present,
                });
            }
            RecordStatus::NodePtr => view.compute_node_ptr()?,
            RecordStatus::Ordinary => view.compute_leaf()?,
        }
        Ok(view)
    }

    fn compute_leaf(&mut self) -> Result<(), IbdError> {
        let versioned = self.info_bits & REC_INFO_VERSION_FLAG != 0;
        let instant = self.info_bits & REC_INFO_INSTANT_FLAG != 0;

        let first_opt_byte = self.origin as isize - REC_N_NEW_EXTRA_BYTES as isize - 1;
        let peeked_version = if versioned {
            let mut peek_pos = first_opt_byte;
            Some(take_down(self.buf, &mut peek_pos)?)
        } else {
            None
        };
        let state = InsertState::classify(
            self.index,
            self.table.has_instant_cols(),
            versioned,
            instant,
            peeked_version,
        )?;
        let plan = state.header_plan();

        let n_fields = self.index.n_decode_fields() as usize;
        let mut cur = first_opt_byte;
        let mut row_version: Option<u8> = None;
        let mut non_default_fields = n_fields as u32;

        if plan.version_byte {
            let v = take_down(self.buf, &mut cur)?;
            if v > MAX_ROW_VERSION {
                return Err(IbdError::Corrupt(format!(
                    "row version {} exceeds the maximum of {}",
                    v, MAX_ROW_VERSION
                )));
            }
            row_version = Some(v);
        }
        if plan.field_count_prefix {
            let b0 = take_down(self.buf, &mut cur)?;
            let count = if b0 & REC_N_FIELDS_TWO_BYTES_FLAG == 0 {
                u16::from(b0)
            } else {
                let b1 = take_down(self.buf, &mut cur)?;
                (u16::from(b0 & REC_N_FIELDS_ONE_BYTE_MAX) << 8) | u16::from(b1)
            };
            if count == 0 || count >= REC_MAX_N_FIELDS {
                return Err(IbdError::Corrupt(format!(
                    "declared field count {} out of range",
                    count
                )));
            }
            non_default_fields = u32::from(count);
        }
        match state {
            InsertState::BeforeInstantAddOld => {
                non_default_fields = self.index.n_original_fields(
                    self.table.n_instant_drop_cols(),
                    self.table.n_instant_add_cols(),
                    self.table.n_instant_added_v1(),
                );
            }
            InsertState::BeforeInstantAddNew => {
                row_version = Some(0);
            }
            _ => {}
        }

        let n_null = match plan.nullable_source {
            NullableSource::Declared => self.index.n_nullable,
            NullableSource::BeforeInstantAddDrop => self.index.nullable_before_instant_add_drop(),
            NullableSource::PerVersion => {
                self.index.nullable_in_version(row_version.unwrap_or(0))
            }
            NullableSource::InstantPrefix => self.index.calc_n_instant_nullable(
                &self.table.cols,
                self.table.has_row_versions(),
                non_default_fields,
            ),
        };

        let mut nulls = NullBits::new(cur, n_null);
        let mut lens = cur - ((n_null + 7) / 8) as isize;

        let mut offs: u32 = 0;
        self.extents.reserve(n_fields);
        for i in 0..n_fields {
            let slot = self.index.physical_field(i)?;
            let col = &self.table.cols[slot.col];

            // substitution phase: fields the record predates or outlives
            match state {
                InsertState::NoInstantNoVersion => {}
                InsertState::BeforeInstantAddNew
                | InsertState::AfterUpgradeBeforeInstantAddNew
                | InsertState::AfterInstantAddNew => {
                    let rv = row_version.unwrap_or(0);
                    if col.is_dropped_in_or_before(rv) {
                        self.extents.push(FieldExtent {
                            end: offs,
                            status: FieldStatus::Dropped,
                        });
                        continue;
                    }
                    if col.is_added_after(rv) {
                        self.extents.push(FieldExtent {
                            end: offs,
                            status: substitution_status(col.instant_default),
                        });
                        continue;
                    }
                }
                InsertState::BeforeInstantAddOld | InsertState::AfterInstantAddOld => {
                    if i as u32 >= non_default_fields {
                        self.extents.push(FieldExtent {
                            end: offs,
                            status: substitution_status(col.instant_default),
                        });
                        continue;
                    }
                }
            }

            if col.nullable {
                if nulls.next_bit(self.buf)? {
                    self.extents.push(FieldExtent {
                        end: offs,
                        status: FieldStatus::Null,
                    });
                    continue;
                }
            }

            if slot.fixed_len == 0 {
                let mut len = u32::from(take_down(self.buf, &mut lens)?);
                if col.is_big_col() && len & 0x80 != 0 {
                    len = (len << 8) | u32::from(take_down(self.buf, &mut lens)?);
                    offs += len & 0x3FFF;
                    if len & 0x4000 != 0 {
                        if !self.index.is_clustered() {
                            return Err(IbdError::Corrupt(
                                "externally stored field in a secondary index".to_string(),
                            ));
                        }
                        self.extents.push(FieldExtent {
                            end: offs,
                            status: FieldStatus::External,
                        });
                    } else {
                        self.extents.push(FieldExtent {
                            end: offs,
                            status: FieldStatus::Present,
                        });
                    }
                    continue;
                }
                offs += len;
            } else {
                offs += slot.fixed_len;
            }
            self.extents.push(FieldExtent {
                end: offs,
                status: FieldStatus::Present,
            });
        }

        self.finish(lens, offs)?;
        self.insert_state = Some(state);
        self.row_version = row_version;
        Ok(())
    }

    fn compute_node_ptr(&mut self) -> Result<(), IbdError> {
        if self.info_bits & (REC_INFO_VERSION_FLAG | REC_INFO_INSTANT_FLAG) != 0 {
            return Err(IbdError::Corrupt(
                "version/instant header bits on a node pointer record".to_string(),
            ));
        }
        let n_key = self.index.n_unique_in_tree_nonleaf() as usize;
        let n_fields = n_key + 1;
        let n_null = self.index.nullable_before_instant_add_drop();

        let base = self.origin as isize - REC_N_NEW_EXTRA_BYTES as isize - 1;
        let mut nulls = NullBits::new(base, n_null);
        let mut lens = base - ((n_null + 7) / 8) as isize;

        let mut offs: u32 = 0;
        for i in 0..n_fields {
            if i == n_key {
                offs += REC_NODE_PTR_SIZE;
                self.extents.push(FieldExtent {
                    end: offs,
                    status: FieldStatus::Present,
                });
                continue;
            }
            let slot = self.index.fields.get(i).ok_or_else(|| {
                IbdError::Corrupt(format!(
                    "node pointer field {} outside index {}",
                    i, self.index.name
                ))
            })?;
            let col = &self.table.cols[slot.col];

            if col.nullable {
                if nulls.next_bit(self.buf)? {
                    self.extents.push(FieldExtent {
                        end: offs,
                        status: FieldStatus::Null,
                    });
                    continue;
                }
            }
            if slot.fixed_len == 0 {
                let mut len = u32::from(take_down(self.buf, &mut lens)?);
                if col.is_big_col() && len & 0x80 != 0 {
                    len = (len << 8) | u32::from(take_down(self.buf, &mut lens)?);
                    if len & 0x4000 != 0 {
                        return Err(IbdError::Corrupt(
                            "externally stored field in a node pointer record".to_string(),
                        ));
                    }
                    offs += len & 0x3FFF;
                } else {
                    offs += len;
                }
            } else {
                offs += slot.fixed_len;
            }
            self.extents.push(FieldExtent {
                end: offs,
                status: FieldStatus::Present,
            });
        }

        self.finish(lens, offs)
    }

    fn finish(&mut self, lens_pos: isize, body_len: u32) -> Result<(), IbdError> {
        self.header_len = (self.origin as isize - (lens_pos + 1)) as u32;
        let body_end = self.origin + body_len as usize;
        if body_end > self.buf.len() {
            return Err(IbdError::Corrupt(format!(
                "record body ends at {} in a buffer of {} bytes",
                body_end,
                self.buf.len()
            )));
        }
        Ok(())
    }

    /// Record status.
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Raw info bits (upper nibble of the first header byte).
    pub fn info_bits(&self) -> u8 {
        self.info_bits
    }

    /// Delete mark.
    pub fn is_deleted(&self) -> bool {
        self.info_bits & REC_INFO_DELETED_FLAG != 0
    }

    /// Min-rec flag.
    pub fn is_min_rec(&self) -> bool {
        self.info_bits & REC_INFO_MIN_REC_FLAG != 0
    }

    /// Insertion state (leaf records only).
    pub fn insert_state(&self) -> Option<InsertState> {
        self.insert_state
    }

    /// Row version governing this record's decode (leaf records of
    /// row-versioned tables only).
    pub fn row_version(&self) -> Option<u8> {
        self.row_version
    }

    /// Total header bytes consumed before the record origin.
    pub fn header_len(&self) -> u32 {
        self.header_len
    }

    /// Number of decoded fields.
    pub fn n_fields(&self) -> usize {
        self.extents.len()
    }

    /// The per-field offsets table.
    pub fn extents(&self) -> &[FieldExtent] {
        &self.extents
    }

    /// Start offset of field `pos` within the record body.
    pub fn field_start(&self, pos: usize) -> u32 {
        if pos == 0 {
            0
        } else {
            self.extents[pos - 1].end
        }
    }

    /// Total record body length (end offset of the last field).
    pub fn body_len(&self) -> u32 {
        self.extents.last().map_or(0, |e| e.end)
    }

    fn column_index_of(&self, pos: usize) -> Option<usize> {
        match self.status {
            RecordStatus::Ordinary => self.index.physical_field(pos).ok().map(|s| s.col),
            RecordStatus::NodePtr => {
                if pos + 1 < self.extents.len() {
                    self.index.fields.get(pos).map(|s| s.col)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// One decoded field.
    pub fn field(&self, pos: usize) -> Option<DecodedField<'a>> {
        let extent = *self.extents.get(pos)?;
        let name = self
            .column_index_of(pos)
            .map(|ci| self.table.cols[ci].name.as_str());
        Some(DecodedField {
            pos,
            name,
            start: self.field_start(pos),
            end: extent.end,
            status: extent.status,
        })
    }

    /// All decoded fields in physical order.
    pub fn fields(&self) -> impl Iterator<Item = DecodedField<'a>> + '_ {
        (0..self.extents.len()).filter_map(move |i| self.field(i))
    }

    /// In-page bytes of a present or externally-stored field. `None` for
    /// NULL/default/dropped fields and out-of-range positions.
    pub fn field_bytes(&self, pos: usize) -> Option<&'a [u8]> {
        let extent = self.extents.get(pos)?;
        match extent.status {
            FieldStatus::Present | FieldStatus::External => {
                let start = self.origin + self.field_start(pos) as usize;
                let end = self.origin + extent.end as usize;
                Some(&self.buf[start..end])
            }
            _ => None,
        }
    }

    /// External reference of an externally-stored field; `Ok(None)` when
    /// the field is not external.
    pub fn extern_ref(&self, pos: usize) -> Result<Option<ExternRef>, IbdError> {
        match self.extents.get(pos) {
            Some(e) if e.status == FieldStatus::External => {
                let bytes = self.field_bytes(pos).ok_or_else(|| {
                    IbdError::Corrupt("external field without in-page bytes".to_string())
                })?;
                ExternRef::parse(bytes).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Child page number of a node pointer record.
    pub fn child_page_no(&self) -> Result<u32, IbdError> {
        if self.status != RecordStatus::NodePtr {
            return Err(IbdError::Unsupported(
                "child page number of a non node-pointer record".to_string(),
            ));
        }
        let last = self.extents.len() - 1;
        let start = self.field_start(last);
        let end = self.extents[last].end;
        if end - start != REC_NODE_PTR_SIZE {
            return Err(IbdError::Corrupt(format!(
                "node pointer field is {} bytes",
                end - start
            )));
        }
        Ok(BigEndian::read_u32(
            &self.buf[self.origin + start as usize..],
        ))
    }
}

fn substitution_status(has_instant_default: bool) -> FieldStatus {
    if has_instant_default {
        FieldStatus::Default
    } else {
        FieldStatus::Null
    }
}

/// Read one header byte, moving downwards in memory.
fn take_down(buf: &[u8], pos: &mut isize) -> Result<u8, IbdError> {
    if *pos < 0 {
        return Err(IbdError::Corrupt(
            "record header runs past the start of the buffer".to_string(),
        ));
    }
    let b = *buf.get(*pos as usize).ok_or_else(|| {
        IbdError::Corrupt("record header outside the buffer".to_string())
    })?;
    *pos -= 1;
    Ok(b)
}

/// Null bitmap cursor: bytes are consumed from high addresses to low,
/// bits from low to high within each byte.
struct NullBits {
    base: isize,
    taken: u32,
    limit: u32,
}

impl NullBits {
    fn new(base: isize, limit: u32) -> NullBits {
        NullBits {
            base,
            taken: 0,
            limit,
        }
    }

    fn next_bit(&mut self, buf: &[u8]) -> Result<bool, IbdError> {
        if self.taken >= self.limit {
            return Err(IbdError::Corrupt(format!(
                "record needs more than {} nullable bits",
                self.limit
            )));
        }
        let byte_pos = self.base - (self.taken / 8) as isize;
        if byte_pos < 0 {
            return Err(IbdError::Corrupt(
                "null bitmap runs past the start of the buffer".to_string(),
            ));
        }
        let byte = *buf.get(byte_pos as usize).ok_or_else(|| {
            IbdError::Corrupt("null bitmap outside the buffer".to_string())
        })?;
        let bit = self.taken % 8;
        self.taken += 1;
        Ok((byte >> bit) & 1 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_status_from_bits() {
        assert_eq!(
            RecordStatus::from_bits(0).unwrap(),
            RecordStatus::Ordinary
        );
        assert_eq!(RecordStatus::from_bits(1).unwrap(), RecordStatus::NodePtr);
        assert_eq!(RecordStatus::from_bits(2).unwrap(), RecordStatus::Infimum);
        assert_eq!(RecordStatus::from_bits(3).unwrap(), RecordStatus::Supremum);
        assert!(RecordStatus::from_bits(4).is_err());
        // only the low three bits participate
        assert_eq!(
            RecordStatus::from_bits(0x08).unwrap(),
            RecordStatus::Ordinary
        );
        assert_eq!(RecordStatus::from_bits(0).unwrap().name(), "REC_STATUS_ORDINARY");
    }

    #[test]
    fn test_header_plan_table() {
        use InsertState::*;
        let plan = NoInstantNoVersion.header_plan();
        assert!(!plan.version_byte && !plan.field_count_prefix);
        assert_eq!(plan.nullable_source, NullableSource::Declared);

        let plan = BeforeInstantAddOld.header_plan();
        assert!(!plan.version_byte && !plan.field_count_prefix);
        assert_eq!(plan.nullable_source, NullableSource::BeforeInstantAddDrop);

        let plan = AfterInstantAddOld.header_plan();
        assert!(!plan.version_byte && plan.field_count_prefix);
        assert_eq!(plan.nullable_source, NullableSource::InstantPrefix);

        for state in [AfterUpgradeBeforeInstantAddNew, AfterInstantAddNew] {
            let plan = state.header_plan();
            assert!(plan.version_byte && !plan.field_count_prefix);
            assert_eq!(plan.nullable_source, NullableSource::PerVersion);
        }

        let plan = BeforeInstantAddNew.header_plan();
        assert!(!plan.version_byte && !plan.field_count_prefix);
        assert_eq!(plan.nullable_source, NullableSource::BeforeInstantAddDrop);
    }

    #[test]
    fn test_extern_ref_parse() {
        let mut trailer = vec![0u8; 20];
        BigEndian::write_u32(&mut trailer[0..4], 7);
        BigEndian::write_u32(&mut trailer[4..8], 99);
        BigEndian::write_u32(&mut trailer[8..12], 3);
        // owner flag in the high bits must be masked off
        BigEndian::write_u64(&mut trailer[12..20], 0x8000_0000_0000_1000);
        let r = ExternRef::parse(&trailer).unwrap();
        assert_eq!(r.space_id, 7);
        assert_eq!(r.page_no, 99);
        assert_eq!(r.version, 3);
        assert_eq!(r.length, 0x1000);
    }

    #[test]
    fn test_extern_ref_too_short() {
        assert!(ExternRef::parse(&[0u8; 19]).is_err());
    }

    #[test]
    fn test_null_bits_order() {
        // two bitmap bytes at positions 8 and 9; base points at the
        // higher address, bits fill low-to-high within each byte
        let mut buf = vec![0u8; 10];
        buf[9] = 0b0000_0101; // bits 0 and 2
        buf[8] = 0b0000_0010; // bit 9 overall
        let mut nulls = NullBits::new(9, 12);
        let bits: Vec<bool> = (0..12).map(|_| nulls.next_bit(&buf).unwrap()).collect();
        assert!(bits[0] && !bits[1] && bits[2]);
        assert!(!bits[8] && bits[9]);
        // exhausting the declared limit is corruption
        assert!(nulls.next_bit(&buf).is_err());
    }

    #[test]
    fn test_take_down_bounds() {
        let buf = [1u8, 2, 3];
        let mut pos: isize = 1;
        assert_eq!(take_down(&buf, &mut pos).unwrap(), 2);
        assert_eq!(take_down(&buf, &mut pos).unwrap(), 1);
        assert!(take_down(&buf, &mut pos).is_err());
    }
}
