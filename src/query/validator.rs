//! Search validator - checks every row before a search is submitted

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::catalog::{FieldCatalog, FieldDescriptor, Lookup, LookupClass};
use crate::error::QueryError;

use super::{Row, SearchExpression};

lazy_static! {
    // Optionally signed integer or decimal: 12, -3, +4.5, .5, 6.
    static ref NUMBER_RE: Regex = Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap();
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref DATETIME_RE: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}( \d{2}:\d{2}(:\d{2})?)?$").unwrap();
}

/// Every problem found in a search, in row order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<QueryError>,
}

impl ValidationReport {
    fn push(&mut self, violation: QueryError) {
        if !self.violations.contains(&violation) {
            self.violations.push(violation);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Validate every row of the search.
///
/// Boolean literals are rewritten to `True`/`False` in place, so a search
/// that passes is ready to encode.
pub fn validate(expr: &mut SearchExpression, catalog: &FieldCatalog) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();

    for row in expr.rows_mut() {
        for violation in validate_row(row, catalog) {
            report.push(violation);
        }
    }

    debug!(violations = report.len(), "validated search");
    if report.is_empty() {
        Ok(())
    } else {
        Err(report)
    }
}

/// Validate one row. When its literal passes, the value is stored trimmed,
/// and boolean literals in their canonical `True`/`False` spelling.
pub fn validate_row(row: &mut Row, catalog: &FieldCatalog) -> Vec<QueryError> {
    let mut errors = Vec::new();

    if row.selected_fields.is_empty() {
        errors.push(QueryError::NoFieldSelected {
            card: row.card_index,
            row: row.row_index,
        });
        return errors;
    }

    let mut fields: Vec<&FieldDescriptor> = Vec::new();
    for id in &row.selected_fields {
        match catalog.get(id) {
            Some(field) => fields.push(field),
            None => errors.push(QueryError::UnknownField(id.clone())),
        }
    }
    if fields.is_empty() {
        return errors;
    }

    let label = fields
        .iter()
        .map(|f| f.label.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    let trimmed = row.value.trim().to_string();
    let value = trimmed.as_str();

    if value.is_empty() && row.lookup != Lookup::Exact {
        errors.push(QueryError::EmptyQuery { label: label.clone() });
    }

    for field in &fields {
        if !field.lookup_class.permits(&row.lookup) {
            errors.push(QueryError::IllegalLookup {
                label: field.label.clone(),
                lookup: row.lookup.to_string(),
            });
        }
    }

    // Nothing to check on an empty literal: either already reported, or an
    // exact match against an empty field.
    if value.is_empty() {
        return errors;
    }

    let has_class = |class: LookupClass| fields.iter().any(|f| f.lookup_class == class);
    let numeric = has_class(LookupClass::Numeric);
    let date = has_class(LookupClass::Date);
    let boolean = has_class(LookupClass::Boolean);

    if numeric && row.lookup != Lookup::IsNull && !is_number(value) {
        errors.push(QueryError::invalid_literal(&label, value, "number"));
    }

    if row.lookup == Lookup::Date {
        if !is_date(value) {
            errors.push(QueryError::invalid_literal(&label, value, "date (YYYY-MM-DD)"));
        }
    } else if date && row.lookup != Lookup::IsNull && !is_datetime(value) {
        errors.push(QueryError::invalid_literal(
            &label,
            value,
            "date (YYYY-MM-DD, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS)",
        ));
    }

    if row.lookup.is_comparative() && !numeric && !date && !is_number(value) {
        errors.push(QueryError::invalid_literal(&label, value, "number"));
    }

    let mut literal = value;
    if boolean || row.lookup == Lookup::IsNull {
        match normalize_bool(value) {
            Some(canonical) => literal = canonical,
            None => errors.push(QueryError::invalid_literal(&label, value, "boolean (True/False)")),
        }
    }

    if errors.is_empty() {
        row.value = literal.to_string();
    }
    errors
}

/// Map the usual spellings of true/false onto `True`/`False`
pub fn normalize_bool(value: &str) -> Option<&'static str> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "on" => Some("True"),
        "false" | "f" | "no" | "n" | "0" | "off" => Some("False"),
        _ => None,
    }
}

fn is_number(value: &str) -> bool {
    NUMBER_RE.is_match(value)
}

fn is_date(value: &str) -> bool {
    DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_datetime(value: &str) -> bool {
    if !DATETIME_RE.is_match(value) {
        return false;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
}
