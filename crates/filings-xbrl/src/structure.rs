//! Column classification for statement tables.
//!
//! Every column of a [`StatementTable`](filings_core::StatementTable) is decoded once
//! into a [`ColumnKey`]. Downstream stages match on the key and never inspect the raw
//! [`ColumnLabel`] again.

use filings_core::{ColumnLabel, LabelPart, PeriodToken, Scope};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Plain column names that carry filing-level metadata rather than data.
const RESERVED_COLUMNS: [&str; 5] = ["yyyy", "month", "corp_code", "corp_name", "report_type"];

/// Fixed per-concept fields a table may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Source row order (`order_no`).
    Ordinal,
    /// Taxonomy concept identifier.
    ConceptId,
    /// Korean label (`label_ko`).
    LabelLocal,
    /// English label.
    LabelEn,
    /// Coarsest hierarchy level.
    Class0,
    /// Hierarchy level 1.
    Class1,
    /// Hierarchy level 2.
    Class2,
    /// Finest hierarchy level.
    Class3,
}

impl FieldName {
    /// Match a column name against the fixed field set.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "order_no" | "ordinal" => Self::Ordinal,
            "concept_id" => Self::ConceptId,
            "label_ko" => Self::LabelLocal,
            "label_en" => Self::LabelEn,
            "class0" => Self::Class0,
            "class1" => Self::Class1,
            "class2" => Self::Class2,
            "class3" => Self::Class3,
            _ => return None,
        })
    }

    /// Canonical column name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinal => "order_no",
            Self::ConceptId => "concept_id",
            Self::LabelLocal => "label_ko",
            Self::LabelEn => "label_en",
            Self::Class0 => "class0",
            Self::Class1 => "class1",
            Self::Class2 => "class2",
            Self::Class3 => "class3",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The period half of a data column key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    /// A well-formed `YYYYMMDD` or `YYYYMMDD-YYYYMMDD` token.
    Token(PeriodToken),
    /// A free-form plain column name, kept verbatim as the period label.
    Label(String),
}

impl PeriodKey {
    /// Period string as written to flat records.
    #[must_use]
    pub fn formatted(&self) -> String {
        match self {
            Self::Token(token) => token.formatted(),
            Self::Label(label) => label.clone(),
        }
    }
}

/// Decoded column identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnKey {
    /// A fixed per-concept field.
    Fixed(FieldName),
    /// A data column keyed by period and consolidation scope.
    Period(PeriodKey, Scope),
    /// A column that is neither a field nor a usable period; never pivoted.
    Unrecognized(ColumnLabel),
}

impl ColumnKey {
    /// Decode a raw column label.
    #[must_use]
    pub fn classify(label: &ColumnLabel) -> Self {
        match label {
            ColumnLabel::Plain(name) => {
                if let Some(field) = FieldName::from_name(name) {
                    Self::Fixed(field)
                } else if RESERVED_COLUMNS.contains(&name.as_str()) {
                    Self::Unrecognized(label.clone())
                } else {
                    let (period, scope) = parse_plain_period(name);
                    Self::Period(period, scope)
                }
            }
            ColumnLabel::Compound(head, part) => {
                if let LabelPart::Name(name) = part {
                    if let Some(field) = FieldName::from_name(name) {
                        return Self::Fixed(field);
                    }
                }
                match PeriodToken::parse(head) {
                    Some(token) => {
                        let scope = match part {
                            LabelPart::Tokens(tokens) => tokens
                                .first()
                                .map_or(Scope::Consolidated, |t| Scope::from_token(t)),
                            LabelPart::Name(_) => Scope::Consolidated,
                        };
                        Self::Period(PeriodKey::Token(token), scope)
                    }
                    None => Self::Unrecognized(label.clone()),
                }
            }
        }
    }
}

/// Permissive reading of a plain string column name.
///
/// Date tokens default to the consolidated scope; anything else keeps the raw name
/// as its period and takes its scope from an embedded marker.
fn parse_plain_period(name: &str) -> (PeriodKey, Scope) {
    match PeriodToken::parse(name) {
        Some(token) => (PeriodKey::Token(token), Scope::Consolidated),
        None => (PeriodKey::Label(name.to_string()), Scope::from_hint(name)),
    }
}

/// A non-field column and its position in the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataColumn {
    /// Column index in the source table.
    pub index: usize,
    /// Decoded key; never [`ColumnKey::Fixed`].
    pub key: ColumnKey,
}

/// Result of analyzing a table's columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableLayout {
    fields: HashMap<FieldName, usize>,
    data_columns: Vec<DataColumn>,
    field_columns: usize,
}

impl TableLayout {
    /// Classify every column of a table.
    ///
    /// When a field appears more than once, the last column wins; earlier duplicates
    /// still count as field columns.
    #[must_use]
    pub fn analyze(columns: &[ColumnLabel]) -> Self {
        let mut layout = Self::default();
        for (index, label) in columns.iter().enumerate() {
            let key = ColumnKey::classify(label);
            trace!(index, column = %label, ?key, "Classified column");
            match key {
                ColumnKey::Fixed(field) => {
                    layout.fields.insert(field, index);
                    layout.field_columns += 1;
                }
                key => layout.data_columns.push(DataColumn { index, key }),
            }
        }
        debug!(
            fields = layout.fields.len(),
            data_columns = layout.data_columns.len(),
            "Analyzed table layout"
        );
        layout
    }

    /// Column index of a fixed field, if present.
    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// Data columns in source order.
    #[must_use]
    pub fn data_columns(&self) -> &[DataColumn] {
        &self.data_columns
    }

    /// Number of columns classified, fields and data together.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.field_columns + self.data_columns.len()
    }
}
