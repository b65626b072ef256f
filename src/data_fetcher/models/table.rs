//! Tabular provider responses.
//!
//! The stats provider answers every endpoint with one or more named tables of
//! `headers` + `rowSet`. A [`StatTable`] keeps that shape; normalization steps never
//! mutate a table, they derive a new one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// A single row rendered as an ordered column -> value mapping.
pub type StatRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Borrowed view of one row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct StatRow<'a> {
    headers: &'a [String],
    values: &'a [Value],
}

impl StatTable {
    /// Builds a table, rejecting rows whose width differs from the header count.
    pub fn try_new(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, String> {
        let name = name.into();
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(format!(
                "row {index} of '{name}' has {} values for {} headers",
                row.len(),
                headers.len()
            ));
        }
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Like [`column_index`](Self::column_index) but reports the absence as an error.
    pub fn require_column(&self, column: &str) -> Result<usize, AppError> {
        self.column_index(column)
            .ok_or_else(|| AppError::missing_column(&self.name, column))
    }

    pub fn row(&self, index: usize) -> Option<StatRow<'_>> {
        self.rows.get(index).map(|values| StatRow {
            headers: &self.headers,
            values,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = StatRow<'_>> {
        self.rows.iter().map(|values| StatRow {
            headers: &self.headers,
            values,
        })
    }

    /// Derives a new table holding only the rows that satisfy `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> StatTable
    where
        F: FnMut(&StatRow<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| keep(row))
            .map(|row| row.values.to_vec())
            .collect();
        StatTable {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Derives a new table holding the first `n` rows (all rows when fewer exist).
    pub fn head(&self, n: usize) -> StatTable {
        StatTable {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn to_records(&self) -> Vec<StatRecord> {
        self.iter().map(|row| row.to_record()).collect()
    }

    /// Fixed-width text rendering used when handing tables to the analysis gateway.
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return format!("{} (no rows)", self.name);
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(value_to_cell).collect())
            .collect();
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                cells
                    .iter()
                    .map(|row| row.get(i).map_or(0, |cell| cell.chars().count()))
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(pad_line(self.headers.iter().map(String::as_str), &widths));
        for row in &cells {
            lines.push(pad_line(row.iter().map(String::as_str), &widths));
        }
        lines.join("\n")
    }
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<'a> StatRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_str(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Numeric cell as `f64`; integer cells are widened.
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        })
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn to_record(&self) -> StatRecord {
        self.headers
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StatTable {
        StatTable::try_new(
            "PlayerGameLog",
            vec!["GAME_DATE".into(), "MATCHUP".into(), "PTS".into()],
            vec![
                vec![json!("MAR 03, 2026"), json!("DEN vs. LAL"), json!(31)],
                vec![json!("MAR 01, 2026"), json!("DEN @ PHX"), json!(24.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_try_new_rejects_ragged_rows() {
        let result = StatTable::try_new(
            "Broken",
            vec!["A".into(), "B".into()],
            vec![vec![json!(1)]],
        );
        assert!(result.unwrap_err().contains("row 0"));
    }

    #[test]
    fn test_row_accessors() {
        let table = sample();
        let row = table.row(0).unwrap();
        assert_eq!(row.get_str("MATCHUP"), Some("DEN vs. LAL"));
        assert_eq!(row.get_i64("PTS"), Some(31));
        assert_eq!(table.row(1).unwrap().get_i64("PTS"), Some(24));
        assert_eq!(row.get_f64("PTS"), Some(31.0));
        assert!(row.get("REB").is_none());
    }

    #[test]
    fn test_filter_and_head_derive_new_tables() {
        let table = sample();
        let away = table.filter_rows(|row| row.get_str("MATCHUP").unwrap().contains('@'));
        assert_eq!(away.len(), 1);
        assert_eq!(table.len(), 2);

        assert_eq!(table.head(10).len(), 2);
        assert_eq!(table.head(1).rows[0][2], json!(31));
    }

    #[test]
    fn test_require_column_names_table() {
        let err = sample().require_column("FG_PCT").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing column 'FG_PCT' in table 'PlayerGameLog'"
        );
    }

    #[test]
    fn test_to_text_tolerates_ragged_deserialized_rows() {
        let table: StatTable = serde_json::from_value(json!({
            "name": "Cached",
            "headers": ["A", "B", "C"],
            "rows": [[1, 2], [3, 4, 5, 6]]
        }))
        .unwrap();

        let text = table.to_text();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with('1'));
    }

    #[test]
    fn test_to_text_aligns_columns() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("GAME_DATE     MATCHUP"));
        assert!(lines[2].ends_with("24.0"));
    }
}
