//! JPEG marker-segment parser/emitter (§4.4). Grounded on the segment walk in
//! the reference JPEG metadata-strip module found alongside this codebase's
//! example pack: standalone markers carry no length, `SOS` is followed by
//! entropy-coded data copied byte-for-byte (respecting escaped `0xFF00` and
//! embedded restart markers) up to the next real marker or `EOI`.

use crate::error::CodecError;

pub mod markers {
    pub const SOI: u8 = 0xD8;
    pub const EOI: u8 = 0xD9;
    pub const SOF0: u8 = 0xC0;
    pub const SOF15: u8 = 0xCF;
    pub const DHT: u8 = 0xC4;
    pub const DAC: u8 = 0xCC;
    pub const RST0: u8 = 0xD0;
    pub const RST7: u8 = 0xD7;
    pub const DQT: u8 = 0xDB;
    pub const DRI: u8 = 0xDD;
    pub const SOS: u8 = 0xDA;
    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;
    pub const APP13: u8 = 0xED;
    pub const APP14: u8 = 0xEE;
    pub const APP15: u8 = 0xEF;
    pub const COM: u8 = 0xFE;

    pub fn is_standalone(marker: u8) -> bool {
        marker == SOI
            || marker == EOI
            || (RST0..=RST7).contains(&marker)
            || marker == 0x01
    }

    pub fn is_app(marker: u8) -> bool {
        (APP0..=APP15).contains(&marker)
    }
}

/// One marker segment. For `SOS`, `payload` holds the scan header *and* the
/// entropy-coded data that follows it (everything up to but not including the
/// next real marker), since that data has no length prefix of its own.
#[derive(Debug, Clone)]
pub struct Segment {
    pub marker: u8,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct JpegStream {
    pub segments: Vec<Segment>,
}

impl JpegStream {
    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < 4 || data[0] != 0xFF || data[1] != markers::SOI {
            return Err(CodecError::NotJpeg);
        }

        let mut segments = vec![Segment {
            marker: markers::SOI,
            payload: Vec::new(),
        }];
        let mut pos = 2usize;

        while pos < data.len() {
            if data[pos] != 0xFF {
                return Err(CodecError::Truncated);
            }
            // Skip fill bytes (0xFF padding before a marker).
            let mut marker_pos = pos + 1;
            while marker_pos < data.len() && data[marker_pos] == 0xFF {
                marker_pos += 1;
            }
            if marker_pos >= data.len() {
                return Err(CodecError::Truncated);
            }
            let marker = data[marker_pos];
            pos = marker_pos + 1;

            if marker == markers::EOI {
                segments.push(Segment {
                    marker,
                    payload: Vec::new(),
                });
                break;
            }

            if markers::is_standalone(marker) {
                segments.push(Segment {
                    marker,
                    payload: Vec::new(),
                });
                continue;
            }

            if pos + 2 > data.len() {
                return Err(CodecError::Truncated);
            }
            let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            if len < 2 || pos + len > data.len() {
                return Err(CodecError::Truncated);
            }
            let segment_payload = data[pos + 2..pos + len].to_vec();
            pos += len;

            if marker == markers::SOS {
                let scan_start = pos;
                let end = find_entropy_end(data, scan_start)?;
                let mut payload = segment_payload;
                payload.extend_from_slice(&data[scan_start..end]);
                segments.push(Segment { marker, payload });
                pos = end;
                continue;
            }

            segments.push(Segment {
                marker,
                payload: segment_payload,
            });
        }

        Ok(JpegStream { segments })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            out.push(0xFF);
            out.push(segment.marker);
            if markers::is_standalone(segment.marker) {
                continue;
            }
            if segment.marker == markers::SOS {
                // payload = scan header + raw entropy data; scan header length
                // is recovered by re-finding the first marker boundary within it.
                let (header, entropy) = split_sos_payload(&segment.payload);
                let len = (header.len() + 2) as u16;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(header);
                out.extend_from_slice(entropy);
                continue;
            }
            let len = (segment.payload.len() + 2) as u16;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(&segment.payload);
        }
        out
    }

    pub fn find_first(&self, marker: u8) -> Option<&Segment> {
        self.segments.iter().find(|s| s.marker == marker)
    }

    pub fn find_first_mut(&mut self, marker: u8) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.marker == marker)
    }

    pub fn remove_all(&mut self, mut predicate: impl FnMut(&Segment) -> bool) {
        self.segments.retain(|s| !predicate(s));
    }
}

/// `SOS` segments are stored as header+entropy combined (§ above); this
/// splits them back apart using the scan header's own length rules: the
/// header is `2 + 1 + 2*Ns + 3` bytes where `Ns` is the component count at
/// payload[0]. This matches the standard JPEG SOS header layout.
fn split_sos_payload(payload: &[u8]) -> (&[u8], &[u8]) {
    if payload.is_empty() {
        return (payload, &[]);
    }
    let ns = payload[0] as usize;
    let header_len = 1 + ns * 2 + 3;
    if header_len > payload.len() {
        return (payload, &[]);
    }
    payload.split_at(header_len)
}

/// Scan forward from `start` for the entropy-coded data's end: the next byte
/// pair `0xFF xx` where `xx` is a real marker (not `0x00` escape, not a
/// restart marker `RST0..RST7`, not fill `0xFF`).
fn find_entropy_end(data: &[u8], start: usize) -> Result<usize, CodecError> {
    let mut i = start;
    while i + 1 < data.len() {
        if data[i] == 0xFF {
            let next = data[i + 1];
            if next == 0x00 {
                i += 2;
                continue;
            }
            if (markers::RST0..=markers::RST7).contains(&next) {
                i += 2;
                continue;
            }
            if next == 0xFF {
                i += 1;
                continue;
            }
            return Ok(i);
        }
        i += 1;
    }
    Err(CodecError::Truncated)
}
