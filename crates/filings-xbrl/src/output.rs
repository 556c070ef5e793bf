//! Columnar file output.

use filings_core::{FilingError, Result, YearMonth};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::config::OutputFormat;

/// Period segment used in file names when a filing has no reporting period.
pub const UNKNOWN_PERIOD: &str = "000000";

/// Columns dropped from partitioned output; the partition path carries them.
pub const PARTITION_COLUMNS: [&str; 2] = ["reporting_year", "reporting_month"];

/// `FS_{entity_code}_{YYYYMM}.{ext}`
#[must_use]
pub fn output_file_name(
    entity_code: &str,
    period: Option<&YearMonth>,
    format: OutputFormat,
) -> String {
    let period = period.map_or(UNKNOWN_PERIOD, YearMonth::compact);
    format!("FS_{entity_code}_{period}.{}", format.extension())
}

/// `{root}/year={YYYY}/mm={MM}`
#[must_use]
pub fn partition_dir(root: &Path, period: &YearMonth) -> PathBuf {
    root.join(format!("year={}", period.year()))
        .join(format!("mm={}", period.month()))
}

/// Drop the columns a partition path already encodes.
///
/// # Errors
/// Returns [`FilingError::Output`] if a partition column is missing.
pub fn drop_partition_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut df = df.clone();
    for name in PARTITION_COLUMNS {
        df = df
            .drop(name)
            .map_err(|e| FilingError::Output(e.to_string()))?;
    }
    Ok(df)
}

/// Write a frame to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns an error if the file cannot be created or the writer fails.
#[instrument(skip(df), fields(rows = df.height()))]
pub fn write_frame(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;

    match format {
        OutputFormat::Parquet => {
            ParquetWriter::new(&mut file)
                .finish(df)
                .map_err(|e| FilingError::Output(e.to_string()))?;
        }
        OutputFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .map_err(|e| FilingError::Output(e.to_string()))?;
        }
    }

    debug!(path = %path.display(), "Wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("entity_code".into(), vec!["00171636", "00171636"]),
            Column::new("reporting_year".into(), vec!["2025", "2025"]),
            Column::new("reporting_month".into(), vec!["06", "06"]),
            Column::new("amount".into(), vec![100.0, -5.5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_output_file_name() {
        let period = YearMonth::parse("202506").unwrap();
        assert_eq!(
            output_file_name("00171636", Some(&period), OutputFormat::Parquet),
            "FS_00171636_202506.parquet"
        );
        assert_eq!(
            output_file_name("00171636", None, OutputFormat::Csv),
            "FS_00171636_000000.csv"
        );
    }

    #[test]
    fn test_partition_dir() {
        let period = YearMonth::parse("202506").unwrap();
        assert_eq!(
            partition_dir(Path::new("/data"), &period),
            PathBuf::from("/data/year=2025/mm=06")
        );
    }

    #[test]
    fn test_drop_partition_columns() {
        let df = drop_partition_columns(&frame()).unwrap();
        assert_eq!(df.width(), 2);
        assert!(df.column("reporting_year").is_err());
    }

    #[test]
    fn test_write_parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("FS_00171636_202506.parquet");

        let mut df = frame();
        write_frame(&mut df, &path, OutputFormat::Parquet).unwrap();

        let read = ParquetReader::new(File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert_eq!(read.height(), 2);
        assert_eq!(read.width(), 4);
    }

    #[test]
    fn test_write_csv_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FS_00171636_202506.csv");

        let mut df = frame();
        write_frame(&mut df, &path, OutputFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, "entity_code,reporting_year,reporting_month,amount");
        assert_eq!(content.lines().count(), 3);
    }
}
