//! Tabular output of labeled records

use std::path::Path;

use crate::dataset::PostcodeRecord;
use crate::error::{Error, Result};

/// A sink for the labeled subset, one row per record
pub trait TableSink {
    fn write(&self, records: &[PostcodeRecord], path: &Path) -> Result<()>;
}

/// Writes the labeled records as CSV with the columns
/// `Postcode,Longitude,Latitude,Country,Cluster`.
pub struct CsvSink;

impl TableSink for CsvSink {
    fn write(&self, records: &[PostcodeRecord], path: &Path) -> Result<()> {
        let write_error = |reason: String| Error::OutputWrite {
            path: path.display().to_string(),
            reason,
        };

        let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(e.to_string()))?;
        writer
            .write_record(&["Postcode", "Longitude", "Latitude", "Country", "Cluster"])
            .map_err(|e| write_error(e.to_string()))?;

        for record in records {
            let longitude = record.longitude.to_string();
            let latitude = record.latitude.to_string();
            let cluster = record
                .cluster
                .map(|c| c.to_string())
                .unwrap_or_default();
            writer
                .write_record(&[
                    record.postcode.as_str(),
                    longitude.as_str(),
                    latitude.as_str(),
                    record.country.as_str(),
                    cluster.as_str(),
                ])
                .map_err(|e| write_error(e.to_string()))?;
        }

        writer.flush().map_err(|e| write_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvSink, TableSink};
    use crate::dataset::PostcodeRecord;
    use crate::error::Error;

    #[test]
    fn writes_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.csv");

        let mut record = PostcodeRecord::new("EH1 1AA", -3.19, 55.95, "Scotland");
        record.cluster = Some(2);

        CsvSink.write(&[record], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Postcode,Longitude,Latitude,Country,Cluster"
        );
        assert_eq!(lines.next().unwrap(), "EH1 1AA,-3.19,55.95,Scotland,2");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let record = PostcodeRecord::new("EH1 1AA", -3.19, 55.95, "Scotland");
        let res = CsvSink.write(
            &[record],
            std::path::Path::new("/definitely/not/here/analysis.csv"),
        );
        assert!(matches!(res, Err(Error::OutputWrite { .. })));
    }
}
