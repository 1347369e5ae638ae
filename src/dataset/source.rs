//! Loading the nationwide postcode dataset
//!
//! The pipeline does not care where records come from, only about their
//! shape, so acquisition sits behind the narrow [`DataSource`] trait. The
//! shipped implementation reads the doogal.co.uk postcode export from a
//! local plain or gzip-compressed CSV file.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use thiserror::Error;

use super::PostcodeRecord;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing column {0:?}")]
    MissingColumn(&'static str),
    #[error("malformed record {row}: {reason}")]
    Malformed { row: usize, reason: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// A source of postcode records, returned in a stable order
pub trait DataSource {
    fn load(&self) -> Result<Vec<PostcodeRecord>, DataSourceError>;
}

/// Reads postcode records from a CSV file with at least the columns
/// `Postcode`, `Longitude`, `Latitude` and `Country`. Files ending in `.gz`
/// are decompressed on the fly.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }

    fn open(&self) -> Result<Box<dyn Read>, DataSourceError> {
        let file = File::open(&self.path).map_err(|source| DataSourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        if self.path.extension().map_or(false, |ext| ext == "gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }
}

fn column(headers: &csv::StringRecord, name: &'static str) -> Result<usize, DataSourceError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(DataSourceError::MissingColumn(name))
}

fn float_field(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    name: &str,
) -> Result<f64, DataSourceError> {
    record
        .get(idx)
        .unwrap_or("")
        .trim()
        .parse::<f64>()
        .map_err(|_| DataSourceError::Malformed {
            row,
            reason: format!("{} is not a number", name),
        })
}

impl DataSource for CsvSource {
    fn load(&self) -> Result<Vec<PostcodeRecord>, DataSourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .from_reader(self.open()?);

        let headers = reader.headers()?.clone();
        let postcode = column(&headers, "Postcode")?;
        let longitude = column(&headers, "Longitude")?;
        let latitude = column(&headers, "Latitude")?;
        let country = column(&headers, "Country")?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            records.push(PostcodeRecord::new(
                record.get(postcode).unwrap_or("").to_string(),
                float_field(&record, longitude, row, "Longitude")?,
                float_field(&record, latitude, row, "Latitude")?,
                record.get(country).unwrap_or("").to_string(),
            ));
        }

        Ok(records)
    }
}
