//! Low-level TIFF/IFD parser and rebuilder backing the EXIF writer. Supports
//! both byte orders ("II" little-endian and "MM" big-endian). Parses IFD0,
//! the ExifIFD and GPSIFD sub-directories (reached via their pointer tags),
//! and IFD1 (the embedded thumbnail directory, reached via IFD0's next-IFD
//! link) — the four namespaces the category mapping in §4.5 touches.

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn read_u16(self, b: &[u8]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes([b[0], b[1]]),
            ByteOrder::Big => u16::from_be_bytes([b[0], b[1]]),
        }
    }
    fn read_u32(self, b: &[u8]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            ByteOrder::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
        }
    }
    fn write_u16(self, v: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }
    fn write_u32(self, v: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }
}

fn type_size(type_id: u16) -> u32 {
    match type_id {
        1 | 2 | 6 | 7 => 1,       // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,               // SHORT, SSHORT
        4 | 9 | 11 => 4,          // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,         // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

#[derive(Debug, Clone)]
pub enum EntryData {
    Inline([u8; 4]),
    External(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub tag: u16,
    pub type_id: u16,
    pub count: u32,
    pub data: EntryData,
}

impl Entry {
    pub fn data_len(&self) -> u32 {
        type_size(self.type_id) * self.count
    }

    /// For ASCII entries, the text bytes (trimmed at the first NUL).
    pub fn as_ascii(&self) -> Option<String> {
        if self.type_id != 2 {
            return None;
        }
        let bytes: &[u8] = match &self.data {
            EntryData::Inline(b) => &b[..(self.data_len() as usize).min(4)],
            EntryData::External(v) => v,
        };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..end]).ok().map(|s| s.to_string())
    }

    /// Overwrite ASCII content in place, keeping the same byte length.
    pub fn set_ascii_in_place(&mut self, text: &str, byte_order: ByteOrder) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let len = self.data_len() as usize;
        bytes.resize(len, 0);
        match &mut self.data {
            EntryData::Inline(b) => {
                let mut arr = [0u8; 4];
                arr[..bytes.len().min(4)].copy_from_slice(&bytes[..bytes.len().min(4)]);
                *b = arr;
            }
            EntryData::External(v) => {
                *v = bytes;
            }
        }
        let _ = byte_order; // byte order only matters for numeric types, not ASCII
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ifd {
    pub entries: Vec<Entry>,
}

impl Ifd {
    pub fn find(&self, tag: u16) -> Option<&Entry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
    pub fn find_mut(&mut self, tag: u16) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.tag == tag)
    }
    pub fn remove(&mut self, tags: &[u16]) {
        self.entries.retain(|e| !tags.contains(&e.tag));
    }
}

pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;

#[derive(Debug, Clone)]
pub struct TiffDocument {
    pub byte_order: ByteOrder,
    pub ifd0: Ifd,
    pub exif_ifd: Option<Ifd>,
    pub gps_ifd: Option<Ifd>,
    pub ifd1: Option<Ifd>,
}

impl TiffDocument {
    pub fn parse(tiff: &[u8]) -> Result<Self, CodecError> {
        if tiff.len() < 8 {
            return Err(CodecError::Truncated);
        }
        let byte_order = match &tiff[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return Err(CodecError::BadTiffHeader),
        };
        let magic = byte_order.read_u16(&tiff[2..4]);
        if magic != 42 {
            return Err(CodecError::BadTiffHeader);
        }
        let ifd0_offset = byte_order.read_u32(&tiff[4..8]) as usize;
        let (ifd0, next_ifd_offset) = parse_ifd(tiff, ifd0_offset, byte_order)?;

        let exif_ifd = match ifd0.find(TAG_EXIF_IFD_POINTER) {
            Some(e) => {
                let off = inline_u32(e, byte_order) as usize;
                Some(parse_ifd(tiff, off, byte_order)?.0)
            }
            None => None,
        };
        let gps_ifd = match ifd0.find(TAG_GPS_IFD_POINTER) {
            Some(e) => {
                let off = inline_u32(e, byte_order) as usize;
                Some(parse_ifd(tiff, off, byte_order)?.0)
            }
            None => None,
        };
        let ifd1 = if next_ifd_offset != 0 {
            Some(parse_ifd(tiff, next_ifd_offset as usize, byte_order)?.0)
        } else {
            None
        };

        Ok(TiffDocument {
            byte_order,
            ifd0,
            exif_ifd,
            gps_ifd,
            ifd1,
        })
    }

    /// Rebuild the TIFF byte stream, relaying out all sub-IFDs and values.
    pub fn serialize(&self) -> Vec<u8> {
        let bo = self.byte_order;
        let mut ifd0 = self.ifd0.clone();

        // Drop stale pointer tags whose sub-IFD no longer exists.
        if self.exif_ifd.is_none() {
            ifd0.remove(&[TAG_EXIF_IFD_POINTER]);
        }
        if self.gps_ifd.is_none() {
            ifd0.remove(&[TAG_GPS_IFD_POINTER]);
        }

        let ifd0_offset: u32 = 8;
        let ifd0_size = ifd_size(&ifd0);
        let mut cursor = ifd0_offset + ifd0_size;

        let exif_offset = self.exif_ifd.as_ref().map(|ifd| {
            let off = cursor;
            cursor += ifd_size(ifd);
            off
        });
        let gps_offset = self.gps_ifd.as_ref().map(|ifd| {
            let off = cursor;
            cursor += ifd_size(ifd);
            off
        });
        let ifd1_offset = self.ifd1.as_ref().map(|ifd| {
            let off = cursor;
            cursor += ifd_size(ifd);
            off
        });

        if let Some(off) = exif_offset {
            set_pointer(&mut ifd0, TAG_EXIF_IFD_POINTER, off, bo);
        }
        if let Some(off) = gps_offset {
            set_pointer(&mut ifd0, TAG_GPS_IFD_POINTER, off, bo);
        }

        let mut out = Vec::new();
        out.extend_from_slice(match bo {
            ByteOrder::Little => b"II",
            ByteOrder::Big => b"MM",
        });
        out.extend_from_slice(&bo.write_u16(42));
        out.extend_from_slice(&bo.write_u32(ifd0_offset));

        let mut value_cursor = cursor;
        write_ifd(&mut out, &ifd0, ifd1_offset.unwrap_or(0), bo, &mut value_cursor);
        if let Some(ifd) = &self.exif_ifd {
            write_ifd(&mut out, ifd, 0, bo, &mut value_cursor);
        }
        if let Some(ifd) = &self.gps_ifd {
            write_ifd(&mut out, ifd, 0, bo, &mut value_cursor);
        }
        if let Some(ifd) = &self.ifd1 {
            write_ifd(&mut out, ifd, 0, bo, &mut value_cursor);
        }

        out
    }
}

fn inline_u32(entry: &Entry, bo: ByteOrder) -> u32 {
    match &entry.data {
        EntryData::Inline(b) => bo.read_u32(b),
        EntryData::External(_) => 0,
    }
}

fn set_pointer(ifd: &mut Ifd, tag: u16, offset: u32, bo: ByteOrder) {
    if let Some(e) = ifd.find_mut(tag) {
        e.type_id = 4; // LONG
        e.count = 1;
        e.data = EntryData::Inline(bo.write_u32(offset));
    }
}

fn ifd_size(ifd: &Ifd) -> u32 {
    let mut size = 2 + 12 * ifd.entries.len() as u32 + 4;
    for e in &ifd.entries {
        if e.data_len() > 4 {
            size += e.data_len();
            if e.data_len() % 2 == 1 {
                size += 1; // word alignment
            }
        }
    }
    size
}

fn write_ifd(out: &mut Vec<u8>, ifd: &Ifd, next_ifd_offset: u32, bo: ByteOrder, value_cursor: &mut u32) {
    out.extend_from_slice(&bo.write_u16(ifd.entries.len() as u16));

    // First pass: compute each external entry's assigned offset.
    let mut assigned = Vec::with_capacity(ifd.entries.len());
    let mut running = *value_cursor;
    for e in &ifd.entries {
        if e.data_len() > 4 {
            assigned.push(running);
            running += e.data_len();
            if e.data_len() % 2 == 1 {
                running += 1;
            }
        } else {
            assigned.push(0);
        }
    }

    for (e, offset) in ifd.entries.iter().zip(assigned.iter()) {
        out.extend_from_slice(&bo.write_u16(e.tag));
        out.extend_from_slice(&bo.write_u16(e.type_id));
        out.extend_from_slice(&bo.write_u32(e.count));
        match &e.data {
            EntryData::Inline(b) => out.extend_from_slice(b),
            EntryData::External(_) => out.extend_from_slice(&bo.write_u32(*offset)),
        }
    }
    out.extend_from_slice(&bo.write_u32(next_ifd_offset));

    for e in &ifd.entries {
        if let EntryData::External(bytes) = &e.data {
            out.extend_from_slice(bytes);
            if bytes.len() % 2 == 1 {
                out.push(0);
            }
        }
    }
    *value_cursor = running;
}

fn parse_ifd(tiff: &[u8], offset: usize, bo: ByteOrder) -> Result<(Ifd, u32), CodecError> {
    if offset + 2 > tiff.len() {
        return Err(CodecError::Truncated);
    }
    let count = bo.read_u16(&tiff[offset..offset + 2]) as usize;
    let mut entries = Vec::with_capacity(count);
    let mut pos = offset + 2;
    for _ in 0..count {
        if pos + 12 > tiff.len() {
            return Err(CodecError::Truncated);
        }
        let tag = bo.read_u16(&tiff[pos..pos + 2]);
        let type_id = bo.read_u16(&tiff[pos + 2..pos + 4]);
        let entry_count = bo.read_u32(&tiff[pos + 4..pos + 8]);
        let value_field = &tiff[pos + 8..pos + 12];
        let len = type_size(type_id) * entry_count;
        let data = if len <= 4 {
            let mut arr = [0u8; 4];
            arr.copy_from_slice(value_field);
            EntryData::Inline(arr)
        } else {
            let value_offset = bo.read_u32(value_field) as usize;
            if value_offset + len as usize > tiff.len() {
                return Err(CodecError::Truncated);
            }
            EntryData::External(tiff[value_offset..value_offset + len as usize].to_vec())
        };
        entries.push(Entry {
            tag,
            type_id,
            count: entry_count,
            data,
        });
        pos += 12;
    }
    let next_ifd_offset = if pos + 4 <= tiff.len() {
        bo.read_u32(&tiff[pos..pos + 4])
    } else {
        0
    };
    Ok((Ifd { entries }, next_ifd_offset))
}
