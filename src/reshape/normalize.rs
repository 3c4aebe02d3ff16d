//! Wide → long reshaping of one sheet.
//!
//! A sheet has one identifying column (the week's date) and one column per
//! region. The output holds one `MetricRecord` per (date, region) cell of the
//! cleaned grid:
//!
//! - rows without an identifying value are header remnants and are dropped
//! - any other missing cell is reported as `0.0` ("no change", not "unknown")
//! - records are emitted region by region, each in row order

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::{MetricName, MetricRecord, MetricSeries};
use crate::error::SourceFormatError;
use crate::io::sheet::RawSheet;

/// Reshape a wide region×date sheet into long records for `metric`.
pub fn normalize(sheet: &RawSheet, id_column: &str, metric: MetricName) -> Result<MetricSeries, SourceFormatError> {
    let id_idx = sheet
        .column_index(id_column)
        .ok_or_else(|| SourceFormatError::MissingColumn {
            sheet: sheet.name().to_string(),
            column: id_column.to_string(),
        })?;

    let mut seen = HashSet::new();
    for column in sheet.columns() {
        if !seen.insert(column.as_str()) {
            return Err(SourceFormatError::DuplicateColumn {
                sheet: sheet.name().to_string(),
                column: column.clone(),
            });
        }
    }

    // Resolve dates first so a bad date fails the whole sheet up front.
    let mut dated_rows = Vec::with_capacity(sheet.rows().len());
    let mut dropped = 0usize;
    for row in sheet.rows() {
        let Some(raw_date) = row.cells[id_idx].as_deref() else {
            dropped += 1;
            continue;
        };
        let date = parse_date(raw_date).ok_or_else(|| SourceFormatError::InvalidDate {
            sheet: sheet.name().to_string(),
            row: row.line,
            value: raw_date.to_string(),
        })?;
        dated_rows.push((date, row));
    }

    let region_count = sheet.columns().len() - 1;
    let mut records = Vec::with_capacity(dated_rows.len() * region_count);
    let mut zero_filled = 0usize;

    for (col_idx, region) in sheet.columns().iter().enumerate() {
        if col_idx == id_idx {
            continue;
        }
        for (date, row) in &dated_rows {
            let value = match row.cells[col_idx].as_deref() {
                None => {
                    zero_filled += 1;
                    0.0
                }
                Some(raw) => parse_value(raw).ok_or_else(|| SourceFormatError::InvalidValue {
                    sheet: sheet.name().to_string(),
                    row: row.line,
                    column: region.clone(),
                    value: raw.to_string(),
                })?,
            };
            records.push(MetricRecord {
                date: *date,
                region: region.clone(),
                metric_name: metric,
                value,
            });
        }
    }

    debug!(
        sheet = sheet.name(),
        %metric,
        dates = dated_rows.len(),
        regions = region_count,
        dropped_rows = dropped,
        zero_filled,
        "normalized sheet"
    );

    Ok(MetricSeries {
        metric,
        source: sheet.name().to_string(),
        records,
    })
}

/// Parse the identifying column.
///
/// Weekly index exports write ISO dates, dotted dates, or full spreadsheet
/// datetimes depending on the tool that produced the CSV.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let s = s.trim().trim_end_matches('.');
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn parse_value(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    let v = cleaned.trim().parse::<f64>().ok()?;
    if v.is_nan() {
        Some(0.0)
    } else if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
