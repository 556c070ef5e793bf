//! Output contract mapping.
//!
//! Turns flat records into [`OutputRecord`]s: field renames, report names, class ids,
//! period buckets, receipt date and crawl time. Also builds the output
//! [`DataFrame`] in contract column order.

use chrono::{NaiveDate, NaiveDateTime};
use filings_core::{
    DateToken, Degradation, Extracted, FilingError, FlatRecord, OutputRecord, PeriodBucket,
    ReceiptDates, ReportType, Result,
};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::config::TotalLabelStyle;
use crate::hierarchy::Section;

/// Output columns, in file order.
pub const OUTPUT_COLUMNS: [&str; 22] = [
    "ordinal",
    "entity_code",
    "reporting_year",
    "reporting_month",
    "account_id",
    "account_name",
    "account_name_en",
    "class0",
    "class1",
    "class2",
    "class1_id",
    "class2_id",
    "class3_id",
    "scope",
    "period",
    "amount",
    "report_type",
    "report_name",
    "receipt_date",
    "crawl_time",
    "entity_name",
    "class3",
];

/// Stable sort: statement of position first, then ordinal (nulls last), then period.
pub fn sort_records(records: &mut [FlatRecord]) {
    records.sort_by(|a, b| {
        a.report_type
            .cmp(&b.report_type)
            .then_with(|| cmp_ordinal(a.ordinal, b.ordinal))
            .then_with(|| a.period.cmp(&b.period))
    });
}

fn cmp_ordinal(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Coarse period label for a record.
///
/// Statement-of-position rows are always [`PeriodBucket::Current`]. Income-statement
/// ranges of at most three calendar months are quarterly, longer ones cumulative;
/// a single `YYYY-MM-DD` date is quarterly; anything unparseable is cumulative.
#[must_use]
pub fn period_bucket(report_type: ReportType, period: &str) -> PeriodBucket {
    if report_type == ReportType::StatementOfPosition {
        return PeriodBucket::Current;
    }

    if let Some((start, end)) = period.split_once('~') {
        return match month_span(start, end) {
            Some(months) if months <= 3 => PeriodBucket::Quarterly,
            _ => PeriodBucket::Cumulative,
        };
    }

    if period.chars().count() == 10 && period.contains('-') {
        PeriodBucket::Quarterly
    } else {
        PeriodBucket::Cumulative
    }
}

/// Inclusive number of calendar months between two `YYYY-MM..` dates.
///
/// `None` when either end is unparseable or the span does not fit in an `i64`.
fn month_span(start: &str, end: &str) -> Option<i64> {
    let (sy, sm) = year_month_of(start)?;
    let (ey, em) = year_month_of(end)?;
    ey.checked_sub(sy)?
        .checked_mul(12)?
        .checked_add(em.checked_sub(sm)?)?
        .checked_add(1)
}

fn year_month_of(date: &str) -> Option<(i64, i64)> {
    let mut parts = date.trim().split('-');
    let year = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    Some((year, month))
}

/// Resolve the receipt date written to the output as `YYYY-MM-DD`.
///
/// An explicit date wins; the side channel is consulted only when none is given.
/// A missing or malformed date falls back to `today`.
#[must_use]
pub fn resolve_receipt_date(
    explicit: Option<&str>,
    filename: Option<&str>,
    receipts: &ReceiptDates,
    today: NaiveDate,
) -> Extracted<String> {
    let explicit = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty() && !matches!(*s, "None" | "null"));
    let candidate = match explicit {
        Some(date) => Some(date),
        None => filename.and_then(|name| receipts.lookup(name)),
    };

    match candidate.and_then(parse_receipt_date) {
        Some(date) => Extracted::Found(date.formatted()),
        None => Extracted::Degraded(
            today.format("%Y-%m-%d").to_string(),
            Degradation::ReceiptDateFallback,
        ),
    }
}

fn parse_receipt_date(raw: &str) -> Option<DateToken> {
    let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
    DateToken::parse(&digits)
}

fn position_account_name(label: &str, style: TotalLabelStyle) -> String {
    let total = Section::from_overview(label).or_else(|| Section::from_total(label));
    match (total, style) {
        (Some(section), TotalLabelStyle::Total) => section.total().to_string(),
        (Some(section), TotalLabelStyle::Section) => section.name().to_string(),
        (None, _) => label.to_string(),
    }
}

fn position_class1(class1: &str, style: TotalLabelStyle) -> String {
    match (Section::from_total(class1), style) {
        (Some(section), TotalLabelStyle::Section) => section.name().to_string(),
        _ => class1.to_string(),
    }
}

/// Map normalized flat records onto the output contract, preserving order.
///
/// Class ids are looked up by label among the account names of the same record
/// set; a label that is not also an account name gets an empty id.
#[must_use]
pub fn map_records(
    records: &[FlatRecord],
    receipt_date: &str,
    crawl_time: NaiveDateTime,
    style: TotalLabelStyle,
) -> Vec<OutputRecord> {
    let mut output: Vec<OutputRecord> = records
        .iter()
        .map(|record| {
            let position = record.report_type == ReportType::StatementOfPosition;
            let (account_name, class1) = if position {
                (
                    position_account_name(&record.label_local, style),
                    position_class1(&record.class1, style),
                )
            } else {
                (record.label_local.clone(), record.class1.clone())
            };

            OutputRecord {
                ordinal: record.ordinal,
                entity_code: record.entity_code.clone(),
                reporting_year: record.reporting_year.clone(),
                reporting_month: record.reporting_month.clone(),
                account_id: record.concept_id.clone(),
                account_name,
                account_name_en: record.label_en.clone(),
                class0: record.class0.clone(),
                class1,
                class2: record.class2.clone(),
                class1_id: String::new(),
                class2_id: String::new(),
                class3_id: String::new(),
                scope: record.scope.label().to_string(),
                period: period_bucket(record.report_type, &record.period)
                    .label()
                    .to_string(),
                amount: record.amount,
                report_type: record.report_type,
                report_name: record.report_type.report_name().to_string(),
                receipt_date: receipt_date.to_string(),
                crawl_time,
                entity_name: record.entity_name.clone(),
                class3: record.class3.clone(),
            }
        })
        .collect();

    let mut ids: HashMap<String, String> = HashMap::new();
    for record in output.iter().filter(|r| !r.account_name.is_empty()) {
        ids.insert(record.account_name.clone(), record.account_id.clone());
    }
    let id_of = |label: &str| {
        if label.is_empty() {
            String::new()
        } else {
            ids.get(label).cloned().unwrap_or_default()
        }
    };
    for record in &mut output {
        record.class1_id = id_of(&record.class1);
        record.class2_id = id_of(&record.class2);
        record.class3_id = id_of(&record.class3);
    }

    debug!(records = output.len(), "Mapped records to output schema");
    output
}

/// Build the output frame in [`OUTPUT_COLUMNS`] order.
///
/// # Errors
/// Returns [`FilingError::Output`] if the frame cannot be assembled.
pub fn to_dataframe(records: &[OutputRecord]) -> Result<DataFrame> {
    fn strings(records: &[OutputRecord], f: impl Fn(&OutputRecord) -> &str) -> Vec<&str> {
        records.iter().map(f).collect()
    }

    let ordinals: Vec<Option<i64>> = records.iter().map(|r| r.ordinal).collect();
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    let crawl_times: Vec<i64> = records
        .iter()
        .map(|r| r.crawl_time.and_utc().timestamp_millis())
        .collect();

    let crawl_time = Column::new("crawl_time".into(), crawl_times)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(|e| FilingError::Output(e.to_string()))?;

    let df = DataFrame::new(vec![
        Column::new("ordinal".into(), ordinals),
        Column::new("entity_code".into(), strings(records, |r| &r.entity_code)),
        Column::new("reporting_year".into(), strings(records, |r| &r.reporting_year)),
        Column::new("reporting_month".into(), strings(records, |r| &r.reporting_month)),
        Column::new("account_id".into(), strings(records, |r| &r.account_id)),
        Column::new("account_name".into(), strings(records, |r| &r.account_name)),
        Column::new("account_name_en".into(), strings(records, |r| &r.account_name_en)),
        Column::new("class0".into(), strings(records, |r| &r.class0)),
        Column::new("class1".into(), strings(records, |r| &r.class1)),
        Column::new("class2".into(), strings(records, |r| &r.class2)),
        Column::new("class1_id".into(), strings(records, |r| &r.class1_id)),
        Column::new("class2_id".into(), strings(records, |r| &r.class2_id)),
        Column::new("class3_id".into(), strings(records, |r| &r.class3_id)),
        Column::new("scope".into(), strings(records, |r| &r.scope)),
        Column::new("period".into(), strings(records, |r| &r.period)),
        Column::new("amount".into(), amounts),
        Column::new("report_type".into(), strings(records, |r| r.report_type.code())),
        Column::new("report_name".into(), strings(records, |r| &r.report_name)),
        Column::new("receipt_date".into(), strings(records, |r| &r.receipt_date)),
        crawl_time,
        Column::new("entity_name".into(), strings(records, |r| &r.entity_name)),
        Column::new("class3".into(), strings(records, |r| &r.class3)),
    ])
    .map_err(|e| FilingError::Output(e.to_string()))?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::Scope;

    fn record(
        report_type: ReportType,
        ordinal: Option<i64>,
        concept_id: &str,
        label: &str,
        class1: &str,
        class2: &str,
        period: &str,
    ) -> FlatRecord {
        FlatRecord {
            ordinal,
            entity_code: "00171636".to_string(),
            entity_name: "SK텔레콤".to_string(),
            reporting_year: "2025".to_string(),
            reporting_month: "06".to_string(),
            report_type,
            concept_id: concept_id.to_string(),
            label_local: label.to_string(),
            label_en: String::new(),
            class0: String::new(),
            class1: class1.to_string(),
            class2: class2.to_string(),
            class3: String::new(),
            scope: Scope::Consolidated,
            period: period.to_string(),
            amount: 10.0,
        }
    }

    fn crawl_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_period_buckets() {
        let cis = ReportType::IncomeStatement;
        assert_eq!(
            period_bucket(cis, "2025-01-01 ~ 2025-06-30"),
            PeriodBucket::Cumulative
        );
        assert_eq!(
            period_bucket(cis, "2025-04-01 ~ 2025-06-30"),
            PeriodBucket::Quarterly
        );
        assert_eq!(
            period_bucket(cis, "2024-11-01 ~ 2025-01-31"),
            PeriodBucket::Quarterly
        );
        assert_eq!(period_bucket(cis, "2025-06-30"), PeriodBucket::Quarterly);
        assert_eq!(period_bucket(cis, "bad ~ 2025-06-30"), PeriodBucket::Cumulative);
        assert_eq!(period_bucket(cis, "기타"), PeriodBucket::Cumulative);
        assert_eq!(
            period_bucket(ReportType::StatementOfPosition, "2025-04-01 ~ 2025-06-30"),
            PeriodBucket::Current
        );
    }

    #[test]
    fn test_period_bucket_oversized_years() {
        let cis = ReportType::IncomeStatement;
        assert_eq!(
            period_bucket(cis, "0-1 ~ 999999999-1-2025-06"),
            PeriodBucket::Cumulative
        );
        assert_eq!(
            period_bucket(cis, "-9223372036854775807-1 ~ 9223372036854775807-1"),
            PeriodBucket::Cumulative
        );
        assert_eq!(
            period_bucket(cis, "1-1 ~ 99999999999999999999-1"),
            PeriodBucket::Cumulative
        );
    }

    #[test]
    fn test_receipt_date_resolution() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 14).unwrap();
        let mut receipts = ReceiptDates::new();
        receipts.register("entity00171636_2025-06-30.xbrl", "20250813");

        let explicit = resolve_receipt_date(Some("2025-08-12"), None, &receipts, today);
        assert_eq!(explicit, Extracted::Found("2025-08-12".to_string()));

        let mapped = resolve_receipt_date(
            None,
            Some("/tmp/entity00171636_2025-06-30.xbrl"),
            &receipts,
            today,
        );
        assert_eq!(mapped, Extracted::Found("2025-08-13".to_string()));

        let fallback = resolve_receipt_date(Some("2025"), None, &receipts, today);
        assert_eq!(fallback.value(), "2025-08-14");
        assert_eq!(fallback.degradation(), Some(&Degradation::ReceiptDateFallback));

        let fallback = resolve_receipt_date(None, Some("other.xbrl"), &receipts, today);
        assert_eq!(fallback.value(), "2025-08-14");
    }

    #[test]
    fn test_sort_nulls_last() {
        let cis = ReportType::IncomeStatement;
        let bs = ReportType::StatementOfPosition;
        let mut records = vec![
            record(cis, Some(1), "a", "", "", "", "2025-06-30"),
            record(bs, None, "b", "", "", "", "2025-06-30"),
            record(bs, Some(2), "c", "", "", "", "2025-06-30"),
            record(bs, Some(0), "d", "", "", "", "2025-06-30"),
        ];
        sort_records(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.concept_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_map_records_total_style() {
        let bs = ReportType::StatementOfPosition;
        let records = vec![
            record(bs, Some(0), "ifrs-full_Assets", "자산 [개요]", "자산총계", "", "2025-06-30"),
            record(bs, Some(1), "ifrs-full_CurrentAssets", "유동자산", "자산총계", "유동자산", "2025-06-30"),
        ];
        let output = map_records(&records, "2025-08-13", crawl_time(), TotalLabelStyle::Total);

        assert_eq!(output[0].account_name, "자산총계");
        assert_eq!(output[0].account_id, "ifrs-full_Assets");
        assert_eq!(output[0].period, "당기");
        assert_eq!(output[0].scope, "연결");
        assert_eq!(output[0].report_name, "재무상태표");
        assert_eq!(output[1].class1_id, "ifrs-full_Assets");
        assert_eq!(output[1].class2_id, "ifrs-full_CurrentAssets");
        assert_eq!(output[1].class3_id, "");
    }

    #[test]
    fn test_map_records_section_style() {
        let bs = ReportType::StatementOfPosition;
        let records = vec![
            record(bs, Some(0), "ifrs-full_Assets", "자산총계", "자산총계", "", "2025-06-30"),
            record(bs, Some(1), "ifrs-full_CurrentAssets", "유동자산", "자산총계", "유동자산", "2025-06-30"),
        ];
        let output = map_records(&records, "2025-08-13", crawl_time(), TotalLabelStyle::Section);

        assert_eq!(output[0].account_name, "자산");
        assert_eq!(output[0].class1, "자산");
        assert_eq!(output[1].class1, "자산");
        assert_eq!(output[1].class1_id, "ifrs-full_Assets");
    }

    #[test]
    fn test_unknown_class_label_has_empty_id() {
        let cis = ReportType::IncomeStatement;
        let records = vec![record(
            cis,
            Some(1),
            "ifrs-full_Revenue",
            "영업수익",
            "수익 [개요]",
            "",
            "2025-01-01 ~ 2025-06-30",
        )];
        let output = map_records(&records, "2025-08-13", crawl_time(), TotalLabelStyle::Total);

        assert_eq!(output[0].class1, "수익 [개요]");
        assert_eq!(output[0].class1_id, "");
        assert_eq!(output[0].period, "누적");
        assert_eq!(output[0].report_name, "포괄손익계산서");
    }

    #[test]
    fn test_dataframe_columns() {
        let records = vec![record(
            ReportType::IncomeStatement,
            None,
            "ifrs-full_Revenue",
            "영업수익",
            "",
            "",
            "2025-04-01 ~ 2025-06-30",
        )];
        let output = map_records(&records, "2025-08-13", crawl_time(), TotalLabelStyle::Total);
        let df = to_dataframe(&output).unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, OUTPUT_COLUMNS.to_vec());
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.column("crawl_time").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("ordinal").unwrap().null_count(), 1);
        assert_eq!(
            df.column("period")
                .unwrap()
                .as_materialized_series()
                .str()
                .unwrap()
                .get(0),
            Some("3개월")
        );
    }
}
