//! CSV sheet loading.
//!
//! Turns one exported worksheet into a `RawSheet`: a header plus a rectangular
//! body of optional string cells. No typing happens here; dates and numbers
//! are parsed by the normalizer so its errors can name the metric's sheet.
//!
//! Spreadsheet exports of weekly index series usually carry metadata rows
//! around the header (title above it, unit/description rows below it). They
//! are removed by physical row index via `SheetSource::skip_rows`.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::error::SourceFormatError;

/// Where a sheet lives and how to strip its metadata rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetSource {
    /// Human-readable label used in error messages (e.g. "sale index").
    pub label: String,
    pub path: PathBuf,
    /// 0-based physical row indices to drop before locating the header.
    pub skip_rows: Vec<usize>,
}

impl SheetSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, skip_rows: &[usize]) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            skip_rows: skip_rows.to_vec(),
        }
    }
}

/// One body row with its 1-based line in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<Option<String>>,
}

/// A rectangular grid: every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawSheet {
    /// Build a sheet, rejecting rows whose width differs from the header.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<RawRow>) -> Result<Self, SourceFormatError> {
        let name = name.into();
        if let Some(bad) = rows.iter().find(|r| r.cells.len() != columns.len()) {
            return Err(SourceFormatError::RaggedRow {
                sheet: name,
                row: bad.line,
                expected: columns.len(),
                found: bad.cells.len(),
            });
        }
        Ok(Self { name, columns, rows })
    }

    /// Convenience constructor for in-memory grids (row lines start at 2, after the header).
    pub fn from_cells<S: AsRef<str>>(
        name: impl Into<String>,
        columns: &[S],
        body: Vec<Vec<Option<&str>>>,
    ) -> Result<Self, SourceFormatError> {
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = body
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| RawRow {
                line: idx + 2,
                cells: cells.into_iter().map(|c| c.and_then(clean_cell)).collect(),
            })
            .collect();
        Self::new(name, columns, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Load a CSV sheet from disk.
pub fn load_sheet_csv(source: &SheetSource) -> Result<RawSheet, SourceFormatError> {
    let file = File::open(&source.path).map_err(|e| SourceFormatError::Unreadable {
        sheet: source.label.clone(),
        path: source.path.clone(),
        message: e.to_string(),
    })?;
    read_sheet(&source.label, file, &source.skip_rows).map_err(|e| match e {
        SourceFormatError::Unreadable { sheet, message, .. } => SourceFormatError::Unreadable {
            sheet,
            path: source.path.clone(),
            message,
        },
        other => other,
    })
}

/// Parse CSV content into a `RawSheet`.
pub fn read_sheet<R: Read>(label: &str, reader: R, skip_rows: &[usize]) -> Result<RawSheet, SourceFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| SourceFormatError::Unreadable {
            sheet: label.to_string(),
            path: PathBuf::new(),
            message: format!("CSV parse error: {e}"),
        })?;

        // The reader drops empty lines, so skips match the physical line, not the record count.
        let line = record.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
        if skip_rows.contains(&(line - 1)) {
            skipped += 1;
            continue;
        }

        match &header {
            None => {
                header = Some(
                    record
                        .iter()
                        .enumerate()
                        .map(|(col, name)| header_name(col, name))
                        .collect(),
                );
            }
            Some(columns) => {
                let mut cells: Vec<Option<String>> = record.iter().map(clean_cell).collect();
                // Spreadsheet exports often pad rows with trailing empty cells.
                while cells.len() > columns.len() && cells.last().is_some_and(Option::is_none) {
                    cells.pop();
                }
                if cells.iter().all(Option::is_none) {
                    continue;
                }
                rows.push(RawRow { line, cells });
            }
        }
    }

    let columns = header.ok_or_else(|| SourceFormatError::MissingHeader {
        sheet: label.to_string(),
        skipped,
    })?;

    debug!(
        sheet = label,
        columns = columns.len(),
        rows = rows.len(),
        skipped,
        "read sheet"
    );

    RawSheet::new(label, columns, rows)
}

fn header_name(col: usize, name: &str) -> String {
    // UTF-8 exports from Excel carry a BOM on the first header cell.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    if name.is_empty() {
        format!("unnamed_{col}")
    } else {
        name.to_string()
    }
}

/// Map blank and spreadsheet "not available" markers to `None`.
fn clean_cell(raw: &str) -> Option<String> {
    let s = raw.trim();
    match s {
        "" | "NaN" | "nan" | "NA" | "N/A" | "#N/A" | "null" => None,
        _ => Some(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_metadata_rows_around_header() {
        let csv = "\
Weekly sale index,,
구분,North,South
unit,idx,idx
note,,
2024-01-01,100,100
2024-01-08,101,
";
        let sheet = read_sheet("sale index", csv.as_bytes(), &[0, 2, 3]).unwrap();
        assert_eq!(sheet.columns(), ["구분", "North", "South"]);
        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.rows()[0].line, 5);
        assert_eq!(sheet.rows()[1].cells, vec![Some("2024-01-08".to_string()), Some("101".to_string()), None]);
    }

    #[test]
    fn skip_rows_count_blank_lines_as_physical_rows() {
        let csv = "Weekly sale index\n\n구분,North\nunit,idx\n2024-01-01,100\n";
        let sheet = read_sheet("sale index", csv.as_bytes(), &[0, 1, 3]).unwrap();
        assert_eq!(sheet.columns(), ["구분", "North"]);
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0].line, 5);
        assert_eq!(sheet.rows()[0].cells, vec![Some("2024-01-01".to_string()), Some("100".to_string())]);
    }

    #[test]
    fn strips_bom_and_names_blank_headers() {
        let csv = "\u{feff}date,,West\n2024-01-01,1,2\n";
        let sheet = read_sheet("rent index", csv.as_bytes(), &[]).unwrap();
        assert_eq!(sheet.columns(), ["date", "unnamed_1", "West"]);
        assert_eq!(sheet.column_index("West"), Some(2));
    }

    #[test]
    fn ragged_rows_are_rejected_with_line_number() {
        let csv = "date,North\n2024-01-01,1\n2024-01-08,1,2\n";
        let err = read_sheet("sale index", csv.as_bytes(), &[]).unwrap_err();
        match err {
            SourceFormatError::RaggedRow { sheet, row, expected, found } => {
                assert_eq!(sheet, "sale index");
                assert_eq!(row, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_empty_cells_and_blank_rows_are_tolerated() {
        let csv = "date,North\n2024-01-01,1,,\n,\n";
        let sheet = read_sheet("sale index", csv.as_bytes(), &[]).unwrap();
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0].cells.len(), 2);
    }

    #[test]
    fn everything_skipped_means_no_header() {
        let csv = "a,b\n";
        let err = read_sheet("sale index", csv.as_bytes(), &[0]).unwrap_err();
        assert!(matches!(err, SourceFormatError::MissingHeader { skipped: 1, .. }));
    }

    #[test]
    fn missing_file_names_sheet_and_path() {
        let source = SheetSource::new("rent index", "/definitely/not/here.csv", &[]);
        let err = load_sheet_csv(&source).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rent index"), "{msg}");
        assert!(msg.contains("/definitely/not/here.csv"), "{msg}");
    }
}
