use crate::error::Result;
use crate::readers::{detect_encoding, open_csv_reader};
use serde::Serialize;
use std::path::Path;

/// First rows of a CSV file, used to pick the coordinate columns
#[derive(Debug, Clone, Serialize)]
pub struct CsvPreview {
    pub encoding: String,
    pub rows: Vec<Vec<String>>,
    pub column_count: usize,
}

impl CsvPreview {
    /// Column labels: the first row when it is a header, otherwise "column N"
    pub fn column_labels(&self, include_header: bool) -> Vec<String> {
        let mut labels: Vec<String> = match (include_header, self.rows.first()) {
            (true, Some(header)) => header.clone(),
            _ => Vec::new(),
        };
        for index in labels.len()..self.column_count {
            labels.push(format!("column {}", index + 1));
        }
        labels
    }

    /// Rows below the header line (or all rows when there is no header)
    pub fn data_rows(&self, include_header: bool) -> &[Vec<String>] {
        if include_header && !self.rows.is_empty() {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    pub fn render_table(&self, include_header: bool) -> String {
        let labels = self.column_labels(include_header);
        let mut out = String::new();

        let header: Vec<String> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("[{}] {}", i, label))
            .collect();
        out.push_str(&header.join(" | "));
        out.push('\n');

        for row in self.data_rows(include_header) {
            let cells: Vec<&str> = (0..self.column_count)
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out
    }
}

/// Read the first `max_rows + 1` rows of a CSV file
pub fn preview_csv(path: &Path, max_rows: usize) -> Result<CsvPreview> {
    let encoding = detect_encoding(path)?;
    let reader = open_csv_reader(path, &encoding)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut column_count = 0;
    for record in reader.records().take(max_rows + 1) {
        let record = record?;
        column_count = column_count.max(record.len());
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvPreview {
        encoding: encoding.name().to_string(),
        rows,
        column_count,
    })
}
