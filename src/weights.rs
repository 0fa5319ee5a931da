//! Flat weight tables with binary persistence.
//!
//! A learning agent owns an ordered collection of independently-sized f32
//! tables. The on-disk layout is `[u32 LE table_count]` followed by each
//! table's cells as f32 LE in index order. Per-table lengths are *not*
//! stored: load pre-sizes the tables from the configured size list and
//! rejects files whose table count disagrees.

use std::fs;
use std::io;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum WeightsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("size list '{0}' contains no table sizes")]
    EmptySizeList(String),
    #[error("size list contains unusable table size '{0}'")]
    BadSize(String),
    #[error("weight file holds {found} tables, configuration expects {expected}")]
    TableCount { expected: usize, found: usize },
    #[error("weight file too short or malformed")]
    Malformed,
}

/// Stable reference to one weight cell: `(table, index)`.
///
/// Trajectory buffers store slots instead of raw pointers so that entries
/// stay valid no matter what happens to the table storage in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub table: usize,
    pub index: usize,
}

/// An ordered collection of zero-initialized f32 lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Weights {
    tables: Vec<Vec<f32>>,
}

impl Weights {
    /// Allocate zero-filled tables from a size list such as `"65536,65536"`.
    ///
    /// Any non-digit character separates sizes, so comma- and
    /// whitespace-separated lists both work.
    pub fn from_sizes(spec: &str) -> Result<Self, WeightsError> {
        let tables: Vec<Vec<f32>> = spec
            .split(|ch: char| !ch.is_ascii_digit())
            .filter(|token| !token.is_empty())
            .map(|token| {
                // tokens are all-digit, so parse only fails on overflow
                let size: usize = token
                    .parse()
                    .map_err(|_| WeightsError::BadSize(token.to_string()))?;
                Ok(vec![0.0f32; size])
            })
            .collect::<Result<_, WeightsError>>()?;
        if tables.is_empty() {
            return Err(WeightsError::EmptySizeList(spec.to_string()));
        }
        Ok(Weights { tables })
    }

    /// Number of tables.
    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Length of table `table`.
    #[inline]
    pub fn table_len(&self, table: usize) -> usize {
        self.tables[table].len()
    }

    /// Read one weight cell.
    #[inline]
    pub fn get(&self, slot: Slot) -> f32 {
        self.tables[slot.table][slot.index]
    }

    /// Overwrite one weight cell.
    #[inline]
    pub fn set(&mut self, slot: Slot, value: f32) {
        self.tables[slot.table][slot.index] = value;
    }

    /// Add `delta` to one weight cell in place.
    #[inline]
    pub fn add(&mut self, slot: Slot, delta: f32) {
        self.tables[slot.table][slot.index] += delta;
    }

    /// Serialize all tables to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightsError> {
        let cell_count: usize = self.tables.iter().map(Vec::len).sum();
        let mut buf = Vec::with_capacity(4 + cell_count * 4);
        buf.extend_from_slice(&(self.tables.len() as u32).to_le_bytes());
        for table in &self.tables {
            for &cell in table {
                buf.extend_from_slice(&cell.to_le_bytes());
            }
        }
        fs::write(path, buf)?;
        Ok(())
    }

    /// Load cell values from `path` into the already-sized tables.
    ///
    /// The tables must have been allocated with the same size list that
    /// produced the file; lengths are implied, not stored.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), WeightsError> {
        let bytes = fs::read(path)?;
        let header: [u8; 4] = bytes
            .get(..4)
            .ok_or(WeightsError::Malformed)?
            .try_into()
            .map_err(|_| WeightsError::Malformed)?;
        let count = u32::from_le_bytes(header) as usize;
        if count != self.tables.len() {
            return Err(WeightsError::TableCount {
                expected: self.tables.len(),
                found: count,
            });
        }
        let mut off = 4;
        for table in &mut self.tables {
            for cell in table.iter_mut() {
                let chunk: [u8; 4] = bytes
                    .get(off..off + 4)
                    .ok_or(WeightsError::Malformed)?
                    .try_into()
                    .map_err(|_| WeightsError::Malformed)?;
                *cell = f32::from_le_bytes(chunk);
                off += 4;
            }
        }
        if off != bytes.len() {
            return Err(WeightsError::Malformed);
        }
        Ok(())
    }
}
