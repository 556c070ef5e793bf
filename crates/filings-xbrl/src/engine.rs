//! The filing flattening pipeline.
//!
//! [`XbrlEngine::process`] runs one filing through metadata extraction, column
//! analysis, pivoting, period filtering and hierarchy repair, and returns a
//! [`FilingOutput`]. Mapping to the output contract and the crawl-time stamp happen
//! when the output is serialized.

use chrono::{Local, NaiveDateTime};
use filings_core::{
    Degradation, EntityDirectory, FilingError, FilingMetadata, FilingSource, FlatRecord,
    OutputRecord, ReceiptDates, ReportType, Result, YearMonth,
};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::filter::{filter_records, target_period};
use crate::hierarchy::normalize;
use crate::metadata::{FilingHints, extract_metadata};
use crate::output::{drop_partition_columns, output_file_name, partition_dir, write_frame};
use crate::pivot::pivot;
use crate::schema::{map_records, resolve_receipt_date, sort_records, to_dataframe};
use crate::structure::TableLayout;

/// Flattens DART XBRL statement matrices into flat records.
///
/// The engine holds no per-filing state; one instance can process many filings,
/// concurrently if the caller wishes.
#[derive(Clone)]
pub struct XbrlEngine {
    directory: Arc<dyn EntityDirectory>,
    config: EngineConfig,
}

impl std::fmt::Debug for XbrlEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XbrlEngine")
            .field("directory", &self.directory.name())
            .field("config", &self.config)
            .finish()
    }
}

impl XbrlEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
        Self {
            directory,
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one filing.
    ///
    /// Missing identity fields degrade to defaults and are listed in
    /// [`FilingOutput::degradations`].
    ///
    /// # Errors
    /// Returns [`FilingError::NoData`] if neither statement table has rows or no
    /// record survives filtering.
    #[instrument(skip_all, fields(filename))]
    pub fn process(
        &self,
        source: &dyn FilingSource,
        hints: &FilingHints,
        receipts: &ReceiptDates,
    ) -> Result<FilingOutput> {
        let filename = match source.filename() {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(error = %e, "Filing has no readable file name");
                None
            }
        };
        tracing::Span::current().record("filename", filename.as_deref().unwrap_or("<unknown>"));

        let period_information = source.period_information().unwrap_or_else(|e| {
            warn!(error = %e, "Period information unreadable");
            Vec::new()
        });

        let (metadata, mut degradations) = extract_metadata(
            filename.as_deref(),
            &period_information,
            self.directory.as_ref(),
            hints,
        );

        let mut records = Vec::new();
        let mut tables_read = 0;
        for report_type in ReportType::ALL {
            let table = match source.statement(report_type) {
                Ok(Some(table)) if !table.is_empty() => table,
                Ok(_) => {
                    debug!(report_type = %report_type, "Statement absent or empty");
                    continue;
                }
                Err(e) => {
                    degradations.push(Degradation::StatementUnreadable {
                        report_type,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            tables_read += 1;
            let layout = TableLayout::analyze(&table.columns);
            records.extend(pivot(&table, &layout, report_type, &metadata));
        }

        let no_data = || FilingError::NoData {
            filename: filename.clone().unwrap_or_else(|| metadata.entity_code.clone()),
        };
        if tables_read == 0 {
            log_degradations(&degradations);
            return Err(no_data());
        }

        let (target, degradation) = target_period(&metadata).into_parts();
        degradations.extend(degradation);
        match (&target, self.config.period_filtering) {
            (Some(target), true) => records = filter_records(records, target),
            (None, true) => debug!("No target period, skipping period filter"),
            (_, false) => debug!("Period filtering disabled"),
        }

        normalize(&mut records);
        if records.is_empty() {
            log_degradations(&degradations);
            return Err(no_data());
        }
        sort_records(&mut records);

        let (receipt_date, degradation) = resolve_receipt_date(
            hints.receipt_date.as_deref(),
            filename.as_deref(),
            receipts,
            Local::now().date_naive(),
        )
        .into_parts();
        degradations.extend(degradation);

        log_degradations(&degradations);
        info!(
            entity_code = %metadata.entity_code,
            records = records.len(),
            degradations = degradations.len(),
            "Processed filing"
        );

        Ok(FilingOutput {
            metadata,
            target_period: target,
            receipt_date,
            records,
            degradations,
            config: self.config.clone(),
        })
    }
}

fn log_degradations(degradations: &[Degradation]) {
    for degradation in degradations {
        warn!(%degradation, "Degraded filing field");
    }
}

/// Result of processing one filing.
#[derive(Clone, Debug)]
pub struct FilingOutput {
    /// Filing identity.
    pub metadata: FilingMetadata,
    /// Period the filing reports on, if known.
    pub target_period: Option<YearMonth>,
    /// Receipt date as `YYYY-MM-DD`.
    pub receipt_date: String,
    /// Normalized records in output order.
    pub records: Vec<FlatRecord>,
    /// Fields that fell back to defaults.
    pub degradations: Vec<Degradation>,
    config: EngineConfig,
}

impl FilingOutput {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `FS_{entity_code}_{YYYYMM}.{ext}`
    #[must_use]
    pub fn file_name(&self) -> String {
        output_file_name(
            &self.metadata.entity_code,
            self.target_period.as_ref(),
            self.config.output_format,
        )
    }

    /// Map records to the output contract, stamped with `crawl_time`.
    #[must_use]
    pub fn output_records_at(&self, crawl_time: NaiveDateTime) -> Vec<OutputRecord> {
        map_records(
            &self.records,
            &self.receipt_date,
            crawl_time,
            self.config.total_labels,
        )
    }

    /// Map records to the output contract, stamped with the current time.
    #[must_use]
    pub fn output_records(&self) -> Vec<OutputRecord> {
        self.output_records_at(crawl_time_now())
    }

    /// Build the output frame, stamped with the current time.
    ///
    /// # Errors
    /// Returns [`FilingError::Output`] if the frame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        to_dataframe(&self.output_records())
    }

    /// Write `FS_{entity_code}_{YYYYMM}.{ext}` into `dir`.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be built or written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let mut df = self.to_dataframe()?;
        write_frame(&mut df, &path, self.config.output_format)?;
        Ok(path)
    }

    /// Write into `root/year=YYYY/mm=MM/`, without the year and month columns.
    ///
    /// # Errors
    /// Returns [`FilingError::InvalidParameter`] if the filing has no reporting
    /// period, or an error if the frame cannot be built or written.
    pub fn write_partitioned(&self, root: &Path) -> Result<PathBuf> {
        let period = self.target_period.as_ref().ok_or_else(|| {
            FilingError::InvalidParameter(format!(
                "{} has no reporting period to partition by",
                self.metadata.entity_code
            ))
        })?;
        let path = partition_dir(root, period).join(self.file_name());
        let mut df = drop_partition_columns(&self.to_dataframe()?)?;
        write_frame(&mut df, &path, self.config.output_format)?;
        Ok(path)
    }
}

fn crawl_time_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::{CellValue, ColumnLabel, Scope, StatementMatrix, StatementTable};
    use filings_directory::{InMemoryDirectory, NoopDirectory};
    use polars::prelude::{ParquetReader, SerReader};

    const FILENAME: &str = "entity00171636_2025-06-30.xbrl";

    fn position_table() -> StatementTable {
        StatementTable::new(vec![
            ColumnLabel::plain("concept_id"),
            ColumnLabel::field("D210000", "label_ko"),
            ColumnLabel::field("D210000", "label_en"),
            ColumnLabel::plain("class0"),
            ColumnLabel::plain("class1"),
            ColumnLabel::plain("class2"),
            ColumnLabel::period("20250630", "연결재무제표"),
            ColumnLabel::period("20240630", "연결재무제표"),
        ])
        .with_row(vec![
            "ifrs-full_CurrentAssets".into(),
            "유동자산".into(),
            "Current assets".into(),
            "재무상태표".into(),
            "자산 [개요]".into(),
            "유동자산".into(),
            400.0.into(),
            350.0.into(),
        ])
        .with_row(vec![
            "ifrs-full_Assets".into(),
            "자산총계".into(),
            "Total assets".into(),
            "재무상태표".into(),
            "자산 [개요]".into(),
            "자산 [개요]".into(),
            1000.0.into(),
            900.0.into(),
        ])
        .with_row(vec![
            "ifrs-full_CurrentLiabilities".into(),
            "유동부채".into(),
            "Current liabilities".into(),
            "재무상태표".into(),
            "부채 [개요]".into(),
            "유동부채".into(),
            300.0.into(),
            0.0.into(),
        ])
        .with_row(vec![
            "ifrs-full_Liabilities".into(),
            "부채총계".into(),
            "Total liabilities".into(),
            "재무상태표".into(),
            "부채 [개요]".into(),
            "부채 [개요]".into(),
            600.0.into(),
            CellValue::Null,
        ])
        .with_row(vec![
            "ifrs-full_EquityAndLiabilities".into(),
            "자본과부채총계".into(),
            "Total equity and liabilities".into(),
            "재무상태표".into(),
            "".into(),
            "".into(),
            1000.0.into(),
            900.0.into(),
        ])
    }

    fn income_table() -> StatementTable {
        StatementTable::new(vec![
            ColumnLabel::plain("concept_id"),
            ColumnLabel::field("D431410", "label_ko"),
            ColumnLabel::period("20250101-20250630", "연결재무제표"),
            ColumnLabel::period("20250401-20250630", "연결재무제표"),
            ColumnLabel::period("20240101-20240630", "연결재무제표"),
        ])
        .with_row(vec![
            "ifrs-full_Revenue".into(),
            "영업수익".into(),
            12345.0.into(),
            6000.0.into(),
            11000.0.into(),
        ])
    }

    fn matrix() -> StatementMatrix {
        StatementMatrix {
            filename: Some(FILENAME.to_string()),
            period_information: vec![ColumnLabel::period("20250101-20250630", "연결재무제표")],
            ..Default::default()
        }
        .with_statement(ReportType::StatementOfPosition, position_table())
        .with_statement(ReportType::IncomeStatement, income_table())
    }

    fn engine() -> XbrlEngine {
        XbrlEngine::new(Arc::new(InMemoryDirectory::with_entries([(
            "00171636",
            "SK텔레콤",
        )])))
    }

    fn hints() -> FilingHints {
        FilingHints::default()
            .with_report_title("반기보고서 (2025.06)")
            .with_receipt_date("20250813")
    }

    #[derive(Debug)]
    struct BrokenIncomeStatement(StatementMatrix);

    impl FilingSource for BrokenIncomeStatement {
        fn filename(&self) -> Result<String> {
            self.0.filename()
        }

        fn period_information(&self) -> Result<Vec<ColumnLabel>> {
            self.0.period_information()
        }

        fn statement(&self, report_type: ReportType) -> Result<Option<StatementTable>> {
            match report_type {
                ReportType::IncomeStatement => {
                    Err(FilingError::Source("corrupt table".to_string()))
                }
                ReportType::StatementOfPosition => self.0.statement(report_type),
            }
        }
    }

    #[test]
    fn test_process_end_to_end() {
        let output = engine()
            .process(&matrix(), &hints(), &ReceiptDates::new())
            .unwrap();

        assert_eq!(output.metadata.entity_code, "00171636");
        assert_eq!(output.metadata.entity_name, "SK텔레콤");
        assert_eq!(output.target_period.as_ref().unwrap().compact(), "202506");
        assert_eq!(output.receipt_date, "2025-08-13");
        assert!(output.degradations.is_empty());
        assert_eq!(output.file_name(), "FS_00171636_202506.parquet");

        assert!(output.records.iter().all(|r| r.amount != 0.0));
        assert!(output.records.iter().all(|r| !r.period.starts_with("2024")));
        assert!(
            output
                .records
                .iter()
                .all(|r| r.label_local != "자본과부채총계")
        );
    }

    #[test]
    fn test_process_orders_position_totals_first() {
        let output = engine()
            .process(&matrix(), &hints(), &ReceiptDates::new())
            .unwrap();

        let first = &output.records[0];
        assert_eq!(first.report_type, ReportType::StatementOfPosition);
        assert_eq!(first.label_local, "자산총계");
        assert_eq!(first.class1, "자산총계");
        assert_eq!(first.class2, "");
        assert_eq!(first.ordinal, Some(0));

        let liabilities = output
            .records
            .iter()
            .find(|r| r.label_local == "부채총계")
            .unwrap();
        assert_eq!(liabilities.ordinal, Some(3));

        let last = output.records.last().unwrap();
        assert_eq!(last.report_type, ReportType::IncomeStatement);
    }

    #[test]
    fn test_process_income_range_record() {
        let output = engine()
            .process(&matrix(), &hints(), &ReceiptDates::new())
            .unwrap();

        let half_year = output
            .records
            .iter()
            .find(|r| r.period == "2025-01-01 ~ 2025-06-30")
            .unwrap();
        assert_eq!(half_year.scope, Scope::Consolidated);
        assert_eq!(half_year.amount, 12345.0);

        let mapped = output.output_records();
        let half_year = mapped
            .iter()
            .find(|r| r.report_type == ReportType::IncomeStatement && r.amount == 12345.0)
            .unwrap();
        assert_eq!(half_year.period, "누적");
        assert_eq!(half_year.scope, "연결");
        assert_eq!(half_year.receipt_date, "2025-08-13");

        let quarter = mapped
            .iter()
            .find(|r| r.report_type == ReportType::IncomeStatement && r.amount == 6000.0)
            .unwrap();
        assert_eq!(quarter.period, "3개월");
    }

    #[test]
    fn test_process_without_filtering_keeps_comparatives() {
        let engine = engine().with_config(EngineConfig::default().with_period_filtering(false));
        let output = engine
            .process(&matrix(), &hints(), &ReceiptDates::new())
            .unwrap();

        assert!(output.records.iter().any(|r| r.period == "2024-06-30"));
        assert!(
            output
                .records
                .iter()
                .any(|r| r.period == "2024-01-01 ~ 2024-06-30")
        );
    }

    #[test]
    fn test_process_without_target_period_keeps_all_periods() {
        let mut matrix = matrix();
        matrix.period_information.clear();
        let hints = FilingHints::default().with_receipt_date("20250813");

        let output = engine()
            .process(&matrix, &hints, &ReceiptDates::new())
            .unwrap();

        assert!(output.target_period.is_none());
        assert!(output.records.iter().any(|r| r.period == "2025-06-30"));
        assert!(output.records.iter().any(|r| r.period == "2024-06-30"));
        assert!(
            output
                .records
                .iter()
                .any(|r| r.period == "2024-01-01 ~ 2024-06-30")
        );
        assert!(
            output
                .degradations
                .contains(&Degradation::MissingReportingPeriod)
        );
        assert!(output.degradations.contains(&Degradation::MissingReportTitle));
        assert_eq!(output.file_name(), "FS_00171636_000000.parquet");
    }

    #[test]
    fn test_process_degrades_missing_fields() {
        let mut matrix = matrix();
        matrix.filename = Some("report.xbrl".to_string());
        let mut receipts = ReceiptDates::new();
        receipts.register("report.xbrl", "20250813");

        let output = XbrlEngine::new(Arc::new(NoopDirectory::new()))
            .process(&matrix, &FilingHints::default(), &receipts)
            .unwrap();

        assert_eq!(output.metadata.entity_code, "00000000");
        assert_eq!(output.metadata.entity_name, "Corp_00000000");
        assert_eq!(output.receipt_date, "2025-08-13");
        assert_eq!(output.target_period.as_ref().unwrap().compact(), "202506");
        assert!(output.degradations.contains(&Degradation::MissingEntityCode));
        assert!(output.degradations.contains(&Degradation::MissingReportTitle));
        assert!(!output.degradations.contains(&Degradation::ReceiptDateFallback));
    }

    #[test]
    fn test_process_unreadable_table_degrades() {
        let source = BrokenIncomeStatement(matrix());
        let output = engine()
            .process(&source, &hints(), &ReceiptDates::new())
            .unwrap();

        assert!(
            output
                .records
                .iter()
                .all(|r| r.report_type == ReportType::StatementOfPosition)
        );
        assert!(output.degradations.iter().any(|d| matches!(
            d,
            Degradation::StatementUnreadable {
                report_type: ReportType::IncomeStatement,
                ..
            }
        )));
    }

    #[test]
    fn test_process_empty_matrix_is_no_data() {
        let matrix = StatementMatrix {
            filename: Some(FILENAME.to_string()),
            ..Default::default()
        }
        .with_statement(ReportType::IncomeStatement, StatementTable::default());

        let err = engine()
            .process(&matrix, &hints(), &ReceiptDates::new())
            .unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_process_nothing_in_target_period_is_no_data() {
        let hints = FilingHints::default().with_report_title("사업보고서 (2023.12)");
        let err = engine()
            .process(&matrix(), &hints, &ReceiptDates::new())
            .unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_write_and_partitioned_write() {
        let dir = tempfile::tempdir().unwrap();
        let output = engine()
            .process(&matrix(), &hints(), &ReceiptDates::new())
            .unwrap();

        let path = output.write(dir.path()).unwrap();
        assert!(path.ends_with("FS_00171636_202506.parquet"));
        let df = ParquetReader::new(std::fs::File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert_eq!(df.height(), output.len());
        assert_eq!(df.width(), 22);

        let path = output.write_partitioned(dir.path()).unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("year=2025")
                .join("mm=06")
                .join("FS_00171636_202506.parquet")
        );
        let df = ParquetReader::new(std::fs::File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert_eq!(df.width(), 20);
        assert!(df.column("reporting_year").is_err());
    }
}
