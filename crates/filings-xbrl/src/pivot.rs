//! Concept x period matrix to flat records.

use filings_core::{CellValue, FilingMetadata, FlatRecord, ReportType, Scope, StatementTable};
use tracing::{debug, trace};

use crate::structure::{ColumnKey, FieldName, TableLayout};

/// Explode a statement table into one record per non-zero numeric cell.
///
/// Null, non-numeric and zero cells are skipped, as are columns whose key is
/// [`ColumnKey::Unrecognized`]. Without an ordinal column the 1-based row index
/// stands in for it.
#[must_use]
pub fn pivot(
    table: &StatementTable,
    layout: &TableLayout,
    report_type: ReportType,
    metadata: &FilingMetadata,
) -> Vec<FlatRecord> {
    let mut records = Vec::new();

    for row in 0..table.rows.len() {
        let text = |field: FieldName| {
            layout
                .field(field)
                .map(|column| table.cell(row, column).text())
                .unwrap_or_default()
        };
        let ordinal = match layout.field(FieldName::Ordinal) {
            Some(column) => table.cell(row, column).ordinal(),
            None => i64::try_from(row + 1).ok(),
        };

        let template = FlatRecord {
            ordinal,
            entity_code: metadata.entity_code.clone(),
            entity_name: metadata.entity_name.clone(),
            reporting_year: metadata.reporting_year.clone(),
            reporting_month: metadata.reporting_month.clone(),
            report_type,
            concept_id: text(FieldName::ConceptId),
            label_local: text(FieldName::LabelLocal),
            label_en: text(FieldName::LabelEn),
            class0: text(FieldName::Class0),
            class1: text(FieldName::Class1),
            class2: text(FieldName::Class2),
            class3: text(FieldName::Class3),
            scope: Scope::default(),
            period: String::new(),
            amount: 0.0,
        };

        for column in layout.data_columns() {
            let cell = table.cell(row, column.index);
            let Some(amount) = nonzero_amount(cell) else {
                continue;
            };
            match &column.key {
                ColumnKey::Period(period, scope) => records.push(FlatRecord {
                    scope: *scope,
                    period: period.formatted(),
                    amount,
                    ..template.clone()
                }),
                ColumnKey::Unrecognized(label) => {
                    trace!(row, column = %label, "Skipping numeric cell in non-period column");
                }
                ColumnKey::Fixed(_) => {}
            }
        }
    }

    debug!(
        report_type = %report_type,
        rows = table.rows.len(),
        records = records.len(),
        "Pivoted statement table"
    );
    records
}

fn nonzero_amount(cell: &CellValue) -> Option<f64> {
    cell.numeric().filter(|amount| *amount != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::ColumnLabel;

    fn metadata() -> FilingMetadata {
        FilingMetadata {
            entity_code: "00171636".to_string(),
            entity_name: "SK텔레콤".to_string(),
            reporting_year: "2025".to_string(),
            reporting_month: "06".to_string(),
            ..Default::default()
        }
    }

    fn income_table() -> StatementTable {
        StatementTable::new(vec![
            ColumnLabel::plain("concept_id"),
            ColumnLabel::field("D431410", "label_ko"),
            ColumnLabel::plain("class0"),
            ColumnLabel::period("20250101-20250630", "연결재무제표"),
            ColumnLabel::period("20250401-20250630", "별도재무제표"),
            ColumnLabel::period("dimension", "연결재무제표"),
        ])
        .with_row(vec![
            "ifrs-full_Revenue".into(),
            "영업수익".into(),
            "수익".into(),
            12345.0.into(),
            "6000".into(),
            99.0.into(),
        ])
        .with_row(vec![
            "ifrs-full_CostOfSales".into(),
            "매출원가".into(),
            "비용".into(),
            0.0.into(),
            CellValue::Null,
            "n/a".into(),
        ])
        .with_row(vec![
            "ifrs-full_ProfitLoss".into(),
            "당기순이익".into(),
            "이익".into(),
            "-150.5".into(),
            "abc".into(),
            CellValue::Bool(true),
        ])
    }

    #[test]
    fn test_pivot_emits_nonzero_numeric_cells_only() {
        let table = income_table();
        let layout = TableLayout::analyze(&table.columns);
        let records = pivot(&table, &layout, ReportType::IncomeStatement, &metadata());

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.amount != 0.0 && r.amount.is_finite()));
    }

    #[test]
    fn test_pivot_range_column() {
        let table = income_table();
        let layout = TableLayout::analyze(&table.columns);
        let records = pivot(&table, &layout, ReportType::IncomeStatement, &metadata());

        let revenue = &records[0];
        assert_eq!(revenue.concept_id, "ifrs-full_Revenue");
        assert_eq!(revenue.label_local, "영업수익");
        assert_eq!(revenue.period, "2025-01-01 ~ 2025-06-30");
        assert_eq!(revenue.scope, Scope::Consolidated);
        assert_eq!(revenue.amount, 12345.0);
        assert_eq!(revenue.entity_code, "00171636");

        let quarter = &records[1];
        assert_eq!(quarter.period, "2025-04-01 ~ 2025-06-30");
        assert_eq!(quarter.scope, Scope::Separate);
        assert_eq!(quarter.amount, 6000.0);

        assert_eq!(records[2].amount, -150.5);
    }

    #[test]
    fn test_ordinal_defaults_to_row_index() {
        let table = income_table();
        let layout = TableLayout::analyze(&table.columns);
        let records = pivot(&table, &layout, ReportType::IncomeStatement, &metadata());

        assert_eq!(records[0].ordinal, Some(1));
        assert_eq!(records[2].ordinal, Some(3));
    }

    #[test]
    fn test_ordinal_column_used_when_present() {
        let table = StatementTable::new(vec![
            ColumnLabel::plain("order_no"),
            ColumnLabel::plain("concept_id"),
            ColumnLabel::period("20250630", "연결재무제표"),
        ])
        .with_row(vec![7.0.into(), "ifrs-full_Assets".into(), 100.0.into()])
        .with_row(vec!["x".into(), "ifrs-full_Liabilities".into(), 50.0.into()]);
        let layout = TableLayout::analyze(&table.columns);
        let records = pivot(&table, &layout, ReportType::StatementOfPosition, &metadata());

        assert_eq!(records[0].ordinal, Some(7));
        assert_eq!(records[0].period, "2025-06-30");
        assert_eq!(records[1].ordinal, None);
    }

    #[test]
    fn test_missing_concept_column_defaults_empty() {
        let table = StatementTable::new(vec![ColumnLabel::period("20250630", "연결재무제표")])
            .with_row(vec![1.0.into()]);
        let layout = TableLayout::analyze(&table.columns);
        let records = pivot(&table, &layout, ReportType::StatementOfPosition, &metadata());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].concept_id, "");
        assert_eq!(records[0].label_local, "");
    }
}
