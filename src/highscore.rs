//! High score table and its compact binary format
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! i32 record count
//! per record:
//!     name   : 7-bit varint byte length, then UTF-8 bytes
//!     points : u32
//!     lines  : u32
//!     level  : u32
//! ```

use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

/// Default number of entries kept after a new score is recorded
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighScore {
    pub name: String,
    pub points: u32,
    pub lines: u32,
    pub level: u32,
    /// Marks the entry added by the game just played. Not persisted
    #[serde(skip)]
    pub is_current: bool,
}

impl HighScore {
    pub fn new(name: impl Into<String>, points: u32, lines: u32, level: u32) -> Self {
        Self {
            name: name.into(),
            points,
            lines,
            level,
            is_current: false,
        }
    }

    /// Ranking order: more points first, then more lines, then higher level
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then(other.lines.cmp(&self.lines))
            .then(other.level.cmp(&self.level))
    }
}

/// Why a high score blob could not be decoded
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HighScoreError {
    #[error("high score data ends early at byte {offset}")]
    Truncated { offset: usize },
    #[error("high score data declares a negative record count ({0})")]
    NegativeCount(i32),
    #[error("malformed name length at byte {offset}")]
    BadLength { offset: usize },
    #[error("name of record {index} is not valid UTF-8")]
    InvalidName { index: usize },
    #[error("{0} unexpected bytes after the last record")]
    TrailingBytes(usize),
}

/// Sorted list of high scores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighScores {
    entries: Vec<HighScore>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in any order
    pub fn from_records(records: Vec<HighScore>) -> Self {
        let mut table = Self { entries: records };
        table.sort();
        table
    }

    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&HighScore> {
        self.entries.first()
    }

    fn sort(&mut self) {
        self.entries.sort_by(HighScore::rank_cmp);
    }

    /// Add the record of the game just played, keeping at most `max_entries`.
    /// Returns its rank, or None if it did not make the cut
    pub fn insert(&mut self, mut record: HighScore, max_entries: usize) -> Option<usize> {
        for entry in &mut self.entries {
            entry.is_current = false;
        }
        record.is_current = true;
        self.entries.push(record);
        self.sort();
        self.entries.truncate(max_entries);
        self.entries.iter().position(|entry| entry.is_current)
    }

    /// Decode a saved table
    pub fn load(bytes: &[u8]) -> Result<Self, HighScoreError> {
        let mut reader = Reader { bytes, offset: 0 };
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(HighScoreError::NegativeCount(count));
        }

        // Every record takes at least 13 bytes; don't trust the count for capacity
        let mut records = Vec::with_capacity((count as usize).min(bytes.len() / 13));
        for index in 0..count as usize {
            let name = reader.read_string(index)?;
            let points = reader.read_u32()?;
            let lines = reader.read_u32()?;
            let level = reader.read_u32()?;
            records.push(HighScore::new(name, points, lines, level));
        }

        let rest = bytes.len() - reader.offset;
        if rest > 0 {
            return Err(HighScoreError::TrailingBytes(rest));
        }
        Ok(Self::from_records(records))
    }

    /// Encode the table in the persisted format
    pub fn save(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.entries.len() as i32).to_le_bytes());
        for entry in &self.entries {
            write_length(&mut out, entry.name.len());
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.points.to_le_bytes());
            out.extend_from_slice(&entry.lines.to_le_bytes());
            out.extend_from_slice(&entry.level.to_le_bytes());
        }
        out
    }
}

fn write_length(out: &mut Vec<u8>, mut len: usize) {
    while len >= 0x80 {
        out.push((len as u8) | 0x80);
        len >>= 7;
    }
    out.push(len as u8);
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], HighScoreError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(HighScoreError::Truncated {
                offset: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_array(&mut self) -> Result<[u8; 4], HighScoreError> {
        let mut array = [0; 4];
        array.copy_from_slice(self.take(4)?);
        Ok(array)
    }

    fn read_i32(&mut self) -> Result<i32, HighScoreError> {
        self.read_array().map(i32::from_le_bytes)
    }

    fn read_u32(&mut self) -> Result<u32, HighScoreError> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_length(&mut self) -> Result<usize, HighScoreError> {
        let start = self.offset;
        let mut len: usize = 0;
        // At most five 7-bit groups fit in 32 bits
        for shift in (0..35).step_by(7) {
            let byte = self.take(1)?[0];
            len |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(len);
            }
        }
        Err(HighScoreError::BadLength { offset: start })
    }

    fn read_string(&mut self, index: usize) -> Result<String, HighScoreError> {
        let len = self.read_length()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| HighScoreError::InvalidName { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HighScores {
        HighScores::from_records(vec![
            HighScore::new("ann", 1200, 12, 2),
            HighScore::new("bob", 5000, 40, 5),
            HighScore::new("cy", 1200, 15, 2),
            HighScore::new("dee", 1200, 15, 3),
        ])
    }

    #[test]
    fn test_ranking_order() {
        let names: Vec<_> = sample().entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["bob", "dee", "cy", "ann"]);
    }

    #[test]
    fn test_round_trip() {
        let table = sample();
        let loaded = HighScores::load(&table.save()).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_round_trip_long_and_unicode_names() {
        let table = HighScores::from_records(vec![
            HighScore::new("x".repeat(300), 1, 1, 1),
            HighScore::new("Zoë", 2, 0, 1),
        ]);
        let bytes = table.save();
        assert_eq!(HighScores::load(&bytes).unwrap(), table);
    }

    #[test]
    fn test_layout() {
        let table = HighScores::from_records(vec![HighScore::new("ab", 300, 2, 1)]);
        assert_eq!(
            table.save(),
            [
                1, 0, 0, 0, // count
                2, b'a', b'b', // name
                44, 1, 0, 0, // points
                2, 0, 0, 0, // lines
                1, 0, 0, 0, // level
            ]
        );
    }

    #[test]
    fn test_empty_table() {
        let table = HighScores::new();
        assert_eq!(table.save(), [0, 0, 0, 0]);
        assert!(HighScores::load(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated() {
        let bytes = sample().save();
        for cut in [0, 3, 6, bytes.len() - 1] {
            assert!(
                matches!(
                    HighScores::load(&bytes[..cut]),
                    Err(HighScoreError::Truncated { .. })
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_corrupt() {
        assert_eq!(
            HighScores::load(&(-1i32).to_le_bytes()),
            Err(HighScoreError::NegativeCount(-1))
        );

        let mut bytes = vec![1, 0, 0, 0, 2, 0xff, 0xfe];
        bytes.extend_from_slice(&[0; 12]);
        assert_eq!(
            HighScores::load(&bytes),
            Err(HighScoreError::InvalidName { index: 0 })
        );

        let bytes = [1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert_eq!(
            HighScores::load(&bytes),
            Err(HighScoreError::BadLength { offset: 4 })
        );

        let mut bytes = sample().save();
        bytes.push(7);
        assert_eq!(
            HighScores::load(&bytes),
            Err(HighScoreError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_insert_marks_current_and_truncates() {
        let mut table = sample();
        assert_eq!(table.insert(HighScore::new("eve", 2000, 20, 3), 10), Some(1));
        assert!(table.entries()[1].is_current);
        assert_eq!(table.len(), 5);

        assert_eq!(table.insert(HighScore::new("fay", 10, 1, 1), 5), None);
        assert_eq!(table.len(), 5);
        assert!(table.entries().iter().all(|e| !e.is_current));
    }

    #[test]
    fn test_current_flag_not_persisted() {
        let mut table = HighScores::new();
        table.insert(HighScore::new("gil", 100, 1, 1), MAX_HIGH_SCORES);
        let loaded = HighScores::load(&table.save()).unwrap();
        assert!(!loaded.entries()[0].is_current);
    }
}
