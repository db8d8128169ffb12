//! Page-I/O collaborator boundary.
//!
//! The decoding engine performs no I/O: raw fixed-size page buffers are
//! delivered by an implementation of [`PageSource`] (an explicit handle,
//! never process-wide state). This module also carries the minimal page
//! readers a caller needs before building
//! [`RecordView`](crate::innodb::record::RecordView)s: the FIL header
//! (page number and type tag), the B-tree page header (level, record
//! count, compact flag, index id), and the compact record chain walk
//! that yields in-page record origins.

use byteorder::{BigEndian, ByteOrder};

use crate::innodb::constants::{
    FIL_PAGE_DATA, FIL_PAGE_NEXT, FIL_PAGE_OFFSET, FIL_PAGE_PREV, FIL_PAGE_SPACE_ID,
    FIL_PAGE_TYPE, PAGE_INDEX_ID, PAGE_LEVEL, PAGE_NEW_INFIMUM, PAGE_N_HEAP, PAGE_N_RECS,
    REC_INFO_BITS_MASK, REC_NEW_STATUS_MASK, REC_N_NEW_EXTRA_BYTES,
};
use crate::innodb::record::RecordStatus;
use crate::IbdError;

/// Page type tag, as reported alongside each page buffer.
///
/// # Examples
///
/// ```
/// use ibd::innodb::page::PageType;
///
/// assert_eq!(PageType::from_code(17855), PageType::Index);
/// assert_eq!(PageType::from_code(17853), PageType::Sdi);
/// assert_eq!(PageType::from_code(60000), PageType::Other(60000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Freshly allocated, type not yet set.
    Allocated,
    UndoLog,
    Inode,
    FspHdr,
    Xdes,
    /// Old-style BLOB page.
    Blob,
    ZBlob,
    ZBlob2,
    /// Uncompressed SDI BLOB page.
    SdiBlob,
    /// Compressed SDI BLOB page.
    SdiZblob,
    LobIndex,
    LobData,
    LobFirst,
    ZlobFirst,
    /// SDI B-tree page (MySQL 8.0+).
    Sdi,
    /// R-tree page of a spatial index.
    Rtree,
    /// B+Tree INDEX page.
    Index,
    /// Any other type code.
    Other(u16),
}

impl PageType {
    /// Map a FIL header type code.
    pub fn from_code(code: u16) -> PageType {
        match code {
            0 => PageType::Allocated,
            2 => PageType::UndoLog,
            3 => PageType::Inode,
            8 => PageType::FspHdr,
            9 => PageType::Xdes,
            10 => PageType::Blob,
            11 => PageType::ZBlob,
            12 => PageType::ZBlob2,
            18 => PageType::SdiBlob,
            19 => PageType::SdiZblob,
            22 => PageType::LobIndex,
            23 => PageType::LobData,
            24 => PageType::LobFirst,
            25 => PageType::ZlobFirst,
            17853 => PageType::Sdi,
            17854 => PageType::Rtree,
            17855 => PageType::Index,
            other => PageType::Other(other),
        }
    }
}

/// One page as delivered by the I/O collaborator.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page number within the tablespace.
    pub page_no: u32,
    /// Page type tag.
    pub page_type: PageType,
    /// Raw page bytes (exactly one page-size long).
    pub data: Vec<u8>,
}

/// Page supplier boundary.
///
/// Implementations own their file handle and page-size state; the
/// decoding engine only ever asks for one page at a time and never
/// writes.
pub trait PageSource {
    /// The fixed page size of this tablespace.
    fn page_size(&self) -> usize;

    /// Read one page by number.
    fn read_page(&mut self, page_no: u32) -> Result<Page, IbdError>;
}

/// Parsed FIL header fields the decoding path cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilHeader {
    /// Page number.
    pub page_no: u32,
    /// Previous page in the chain (FIL_NULL if none).
    pub prev: u32,
    /// Next page in the chain (FIL_NULL if none).
    pub next: u32,
    /// Page type tag.
    pub page_type: PageType,
    /// Owning space id.
    pub space_id: u32,
}

impl FilHeader {
    /// Parse the 38-byte FIL header from a page buffer.
    pub fn parse(page: &[u8]) -> Option<FilHeader> {
        if page.len() < FIL_PAGE_DATA {
            return None;
        }
        Some(FilHeader {
            page_no: BigEndian::read_u32(&page[FIL_PAGE_OFFSET..]),
            prev: BigEndian::read_u32(&page[FIL_PAGE_PREV..]),
            next: BigEndian::read_u32(&page[FIL_PAGE_NEXT..]),
            page_type: PageType::from_code(BigEndian::read_u16(&page[FIL_PAGE_TYPE..])),
            space_id: BigEndian::read_u32(&page[FIL_PAGE_SPACE_ID..]),
        })
    }
}

/// Parsed B-tree (INDEX/SDI) page header subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BtreeHeader {
    /// User record count.
    pub n_recs: u16,
    /// Heap record count; bit 15 is the compact-format flag.
    pub n_heap_raw: u16,
    /// Level within the tree (0 = leaf).
    pub level: u16,
    /// Owning index id.
    pub index_id: u64,
}

impl BtreeHeader {
    /// Parse the INDEX page header (starts at FIL_PAGE_DATA).
    pub fn parse(page: &[u8]) -> Option<BtreeHeader> {
        if page.len() < FIL_PAGE_DATA + PAGE_INDEX_ID + 8 {
            return None;
        }
        Some(BtreeHeader {
            n_recs: BigEndian::read_u16(&page[FIL_PAGE_DATA + PAGE_N_RECS..]),
            n_heap_raw: BigEndian::read_u16(&page[FIL_PAGE_DATA + PAGE_N_HEAP..]),
            level: BigEndian::read_u16(&page[FIL_PAGE_DATA + PAGE_LEVEL..]),
            index_id: BigEndian::read_u64(&page[FIL_PAGE_DATA + PAGE_INDEX_ID..]),
        })
    }

    /// Whether this page holds leaf records.
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    /// Whether the page uses the compact record format.
    pub fn is_compact(&self) -> bool {
        self.n_heap_raw & 0x8000 != 0
    }
}

/// The fixed 5-byte extra header preceding a compact record origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactExtra {
    /// Records owned in the page directory.
    pub n_owned: u8,
    /// Info bits (upper nibble of byte 0).
    pub info_bits: u8,
    /// Heap position.
    pub heap_no: u16,
    /// Record status.
    pub status: RecordStatus,
    /// Signed relative offset to the next record origin.
    pub next_offset: i16,
}

impl CompactExtra {
    /// Parse the extra header of the record whose origin is
    /// `page[origin]`.
    pub fn parse(page: &[u8], origin: usize) -> Result<CompactExtra, IbdError> {
        if origin < REC_N_NEW_EXTRA_BYTES || origin > page.len() {
            return Err(IbdError::Corrupt(format!(
                "record origin {} outside page of {} bytes",
                origin,
                page.len()
            )));
        }
        let extra = &page[origin - REC_N_NEW_EXTRA_BYTES..origin];
        let two = BigEndian::read_u16(&extra[1..3]);
        Ok(CompactExtra {
            n_owned: extra[0] & 0x0F,
            info_bits: extra[0] & REC_INFO_BITS_MASK,
            heap_no: (two >> 3) & 0x1FFF,
            status: RecordStatus::from_bits((two & u16::from(REC_NEW_STATUS_MASK)) as u8)?,
            next_offset: BigEndian::read_i16(&extra[3..5]),
        })
    }
}

/// A user record located on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPos {
    /// Record origin within the page.
    pub origin: usize,
    /// Its parsed extra header.
    pub header: CompactExtra,
}

/// Walk the singly-linked record chain of a compact INDEX page, from
/// infimum to supremum, returning user record origins in chain order.
///
/// The walk is defensive: a next pointer that leaves the page, revisits
/// too many records, or lands on a malformed header ends the walk with
/// [`IbdError::Corrupt`], and the records collected so far are returned
/// alongside the error by the caller abandoning the page.
pub fn walk_records(page: &[u8]) -> Result<Vec<RecordPos>, IbdError> {
    let mut records = Vec::new();
    let infimum = CompactExtra::parse(page, PAGE_NEW_INFIMUM)?;
    if infimum.status != RecordStatus::Infimum {
        return Err(IbdError::Corrupt(
            "page carries no infimum record where expected".to_string(),
        ));
    }

    let mut origin = PAGE_NEW_INFIMUM;
    let mut next_rel = infimum.next_offset;
    // one record per page byte is already impossible; anything more is a cycle
    for _ in 0..page.len() {
        if next_rel == 0 {
            return Err(IbdError::Corrupt(
                "record chain ended before supremum".to_string(),
            ));
        }
        let next = origin as i64 + i64::from(next_rel);
        if next < REC_N_NEW_EXTRA_BYTES as i64 || next as usize > page.len() {
            return Err(IbdError::Corrupt(format!(
                "record chain leaves the page at offset {}",
                next
            )));
        }
        origin = next as usize;
        let header = CompactExtra::parse(page, origin)?;
        if header.status == RecordStatus::Supremum {
            return Ok(records);
        }
        next_rel = header.next_offset;
        records.push(RecordPos { origin, header });
    }
    Err(IbdError::Corrupt(
        "record chain does not terminate".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innodb::constants::PAGE_NEW_SUPREMUM;

    fn write_extra(page: &mut [u8], origin: usize, status: u8, next_rel: i16) {
        let extra = origin - REC_N_NEW_EXTRA_BYTES;
        page[extra] = 0x01; // n_owned 1
        BigEndian::write_u16(&mut page[extra + 1..], u16::from(status)); // heap 0
        BigEndian::write_i16(&mut page[extra + 3..], next_rel);
    }

    fn synthetic_page(user_origins: &[usize]) -> Vec<u8> {
        let mut page = vec![0u8; 512];
        BigEndian::write_u16(&mut page[FIL_PAGE_TYPE..], 17855);
        // compact flag + level 0
        BigEndian::write_u16(&mut page[FIL_PAGE_DATA + PAGE_N_HEAP..], 0x8000 | 3);
        BigEndian::write_u16(
            &mut page[FIL_PAGE_DATA + PAGE_N_RECS..],
            user_origins.len() as u16,
        );

        let mut chain: Vec<usize> = vec![PAGE_NEW_INFIMUM];
        chain.extend_from_slice(user_origins);
        chain.push(PAGE_NEW_SUPREMUM);
        for w in chain.windows(2) {
            let status = if w[0] == PAGE_NEW_INFIMUM { 2 } else { 0 };
            write_extra(&mut page, w[0], status, (w[1] as i64 - w[0] as i64) as i16);
        }
        write_extra(&mut page, PAGE_NEW_SUPREMUM, 3, 0);
        page
    }

    #[test]
    fn test_fil_and_btree_headers() {
        let page = synthetic_page(&[]);
        let fil = FilHeader::parse(&page).unwrap();
        assert_eq!(fil.page_type, PageType::Index);
        let bt = BtreeHeader::parse(&page).unwrap();
        assert!(bt.is_leaf());
        assert!(bt.is_compact());
        assert_eq!(bt.n_recs, 0);
    }

    #[test]
    fn test_walk_empty_page() {
        let page = synthetic_page(&[]);
        assert_eq!(walk_records(&page).unwrap(), Vec::new());
    }

    #[test]
    fn test_walk_two_records() {
        let page = synthetic_page(&[150, 300]);
        let recs = walk_records(&page).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].origin, 150);
        assert_eq!(recs[1].origin, 300);
        assert_eq!(recs[0].header.status, RecordStatus::Ordinary);
    }

    #[test]
    fn test_walk_rejects_escaping_chain() {
        let mut page = synthetic_page(&[150]);
        // point the user record's next pointer off the page
        write_extra(&mut page, 150, 0, 2000);
        assert!(walk_records(&page).is_err());
    }

    #[test]
    fn test_walk_rejects_cycle() {
        let mut page = synthetic_page(&[150, 300]);
        // make record 300 point back at record 150
        write_extra(&mut page, 300, 0, -150);
        assert!(walk_records(&page).is_err());
    }

    #[test]
    fn test_compact_extra_fields() {
        let mut page = vec![0u8; 128];
        let extra = 60 - REC_N_NEW_EXTRA_BYTES;
        page[extra] = 0x22; // delete mark + n_owned 2
        BigEndian::write_u16(&mut page[extra + 1..], (7 << 3) | 1); // heap 7, node ptr
        BigEndian::write_i16(&mut page[extra + 3..], -40);
        let h = CompactExtra::parse(&page, 60).unwrap();
        assert_eq!(h.n_owned, 2);
        assert_eq!(h.info_bits, 0x20);
        assert_eq!(h.heap_no, 7);
        assert_eq!(h.status, RecordStatus::NodePtr);
        assert_eq!(h.next_offset, -40);
    }
}
