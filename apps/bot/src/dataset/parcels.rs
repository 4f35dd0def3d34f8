use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::parcel::ParcelRecord;

/// Streams parcel rows with their zero-based data-row index, starting at
/// `start_at`. Rows before the start are read and discarded so indexes stay
/// stable against the checkpoint.
pub struct ParcelRows<R: std::io::Read> {
    records: csv::DeserializeRecordsIntoIter<R, ParcelRecord>,
    next_index: usize,
}

impl ParcelRows<File> {
    pub fn open(path: &Path, start_at: usize) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open parcels file {}", path.display()))?;
        Ok(Self::new(file, start_at))
    }
}

impl<R: std::io::Read> ParcelRows<R> {
    pub fn new(reader: R, start_at: usize) -> Self {
        let mut rows = Self {
            records: csv::Reader::from_reader(reader).into_deserialize(),
            next_index: 0,
        };
        while rows.next_index < start_at && rows.records.next().is_some() {
            rows.next_index += 1;
        }
        rows
    }
}

impl<R: std::io::Read> Iterator for ParcelRows<R> {
    type Item = (usize, Result<ParcelRecord>);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some((
            index,
            record.with_context(|| format!("Parcel row {index} is malformed")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "ST_NUM,ST_NAME,AV_TOTAL,neighborhood\n\
        1,A,100,Fenway\n\
        2,B,200,Fenway\n\
        3,C,oops,Fenway\n\
        4,D,400,Fenway\n";

    #[test]
    fn test_indexes_start_at_zero() {
        let rows: Vec<_> = ParcelRows::new(CSV.as_bytes(), 0).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].0, 0);
        assert_eq!(rows[0].1.as_ref().unwrap().street_name, "A");
    }

    #[test]
    fn test_resume_keeps_original_indexes() {
        let rows: Vec<_> = ParcelRows::new(CSV.as_bytes(), 3).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 3);
        assert_eq!(rows[0].1.as_ref().unwrap().assessed_value, 400);
    }

    #[test]
    fn test_malformed_row_is_reported_in_place() {
        let rows: Vec<_> = ParcelRows::new(CSV.as_bytes(), 1).collect();
        assert_eq!(rows[0].0, 1);
        assert!(rows[1].1.is_err());
        assert_eq!(rows[2].0, 3);
        assert!(rows[2].1.is_ok());
    }

    #[test]
    fn test_start_past_end_yields_nothing() {
        assert_eq!(ParcelRows::new(CSV.as_bytes(), 10).count(), 0);
    }
}
