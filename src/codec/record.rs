//! Move-record scanning
//!
//! # Replay Stream - Move Record Format
//!
//! The replay is not a length-prefixed packet stream. Move records are found
//! by scanning for a fixed marker; bytes between records are never framed or
//! interpreted.
//!
//! ## Header (14 bytes):
//!   Bytes 0-3:   0x00 0x00 0x3D 0x00 (marker)
//!   Byte 4:      Direction (low nibble dx+4, high nibble dy+4)
//!   Byte 5:      0x08 (discriminator)
//!   Bytes 6-13:  Tile mask (8 bytes, one per y-row, LSB-first x-columns)
//!
//! A mask of eight 0xFF bytes is a region transition and carries no payload.
//! Any other mask is followed by one tile payload per set bit, in row-major
//! mask order.
//!
//! Every byte offset is a scan candidate and the scan resumes one byte after
//! each match, so a marker appearing inside an unparsed stretch (or inside a
//! record payload) produces a match too. That is how the original format
//! consumer behaved and downstream data may depend on it; do not tighten the
//! scan without a compatibility check.

use super::types::direction_delta;

/// Fixed 4-byte move-record marker
pub const MOVE_MARKER: [u8; 4] = [0x00, 0x00, 0x3D, 0x00];

/// Fixed discriminator byte at header offset 5
pub const MOVE_DISCRIMINATOR: u8 = 0x08;

/// Full header length: marker + direction + discriminator + mask
pub const HEADER_LEN: usize = 14;

/// One raw move record as found by the scanner.
///
/// Carries no player position; position is cumulative decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// Offset of the marker within the replay buffer
    pub offset: usize,
    pub direction: u8,
    pub mask: [u8; 8],
}

impl MoveRecord {
    /// An all-FF mask signals a region boundary crossing, not tile data
    pub fn is_region_transition(&self) -> bool {
        self.mask == [0xFF; 8]
    }

    /// Position delta encoded in the direction byte
    pub fn delta(&self) -> (i32, i32) {
        direction_delta(self.direction)
    }

    /// Offset of the first payload byte (right after the header)
    pub fn payload_offset(&self) -> usize {
        self.offset + HEADER_LEN
    }
}

/// Lazy scanner over a replay buffer, yielding raw move records.
///
/// Restartable: the scanner only advances its own cursor; payload parsing
/// happens against the buffer separately via [`BinaryReader::at`].
///
/// [`BinaryReader::at`]: super::BinaryReader::at
pub struct MoveScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MoveScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Resume scanning from a given offset
    pub fn resume(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn matches_at(&self, i: usize) -> bool {
        self.data[i..i + 4] == MOVE_MARKER && self.data[i + 5] == MOVE_DISCRIMINATOR
    }
}

impl<'a> Iterator for MoveScanner<'a> {
    type Item = MoveRecord;

    fn next(&mut self) -> Option<MoveRecord> {
        // Upper bound is exclusive of len - HEADER_LEN, matching the
        // original scanner's range exactly.
        let end = self.data.len().saturating_sub(HEADER_LEN);
        while self.pos < end {
            let i = self.pos;
            self.pos += 1;
            if !self.matches_at(i) {
                continue;
            }
            let mut mask = [0u8; 8];
            mask.copy_from_slice(&self.data[i + 6..i + 14]);
            return Some(MoveRecord {
                offset: i,
                direction: self.data[i + 4],
                mask,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(direction: u8, mask: [u8; 8]) -> Vec<u8> {
        let mut v = MOVE_MARKER.to_vec();
        v.push(direction);
        v.push(MOVE_DISCRIMINATOR);
        v.extend_from_slice(&mask);
        v
    }

    #[test]
    fn test_scan_finds_record() {
        let mut data = vec![0xAB, 0xCD]; // leading junk
        data.extend(header(0x54, [0x01, 0, 0, 0, 0, 0, 0, 0]));
        data.push(0x00); // trailing byte so the last offset stays scannable

        let records: Vec<_> = MoveScanner::new(&data).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 2);
        assert_eq!(records[0].direction, 0x54);
        assert_eq!(records[0].delta(), (0, 1));
        assert_eq!(records[0].payload_offset(), 2 + HEADER_LEN);
    }

    #[test]
    fn test_scan_requires_discriminator() {
        let mut data = MOVE_MARKER.to_vec();
        data.push(0x44);
        data.push(0x09); // wrong discriminator
        data.extend_from_slice(&[0u8; 10]);
        assert_eq!(MoveScanner::new(&data).count(), 0);
    }

    #[test]
    fn test_transition_mask() {
        let mut data = header(0x44, [0xFF; 8]);
        data.push(0x00);
        let rec = MoveScanner::new(&data).next().unwrap();
        assert!(rec.is_region_transition());

        let mut data = header(0x44, [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
        data.push(0x00);
        let rec = MoveScanner::new(&data).next().unwrap();
        assert!(!rec.is_region_transition());
    }

    #[test]
    fn test_scan_resumes_after_match_position() {
        // Two back-to-back records; the scan must find both even though the
        // second marker sits inside what a framed parser would call the
        // first record's extent.
        let mut data = header(0x44, [0; 8]);
        data.extend(header(0x45, [0; 8]));
        data.push(0x00);
        let records: Vec<_> = MoveScanner::new(&data).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].offset, HEADER_LEN);
    }

    #[test]
    fn test_final_offset_not_scanned() {
        // A record starting exactly at len - HEADER_LEN is never tested;
        // the original scanner had the same exclusive bound.
        let data = header(0x44, [0; 8]);
        assert_eq!(data.len(), HEADER_LEN);
        assert_eq!(MoveScanner::new(&data).count(), 0);
    }

    #[test]
    fn test_resume_from_scan_position() {
        let mut data = header(0x44, [0; 8]);
        data.extend(header(0x45, [0; 8]));
        data.push(0x00);

        // A fresh scanner picking up at a previous scanner's position sees
        // exactly the records the first one had not yet yielded
        let mut scanner = MoveScanner::new(&data);
        assert_eq!(scanner.next().unwrap().direction, 0x44);

        let rec = MoveScanner::resume(&data, scanner.position())
            .next()
            .unwrap();
        assert_eq!(rec.direction, 0x45);
        assert_eq!(rec.offset, HEADER_LEN);
    }
}
