//! Historical plant data.
//!
//! A [`Table`] keeps the `DateTime` column as text and coerces every other
//! column to numbers; cells that do not parse become `None`.

use std::io;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::{BatchError, BatchResult};

pub const DATETIME: &str = "DateTime";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    timestamps: Vec<String>,
    /// Parallel to `headers`; the `DateTime` column holds `None`.
    columns: Vec<Vec<Option<f64>>>,
}

impl Table {
    pub fn read(path: &Path) -> BatchResult<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "read table");
        Ok(table)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> BatchResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let datetime = headers.iter().position(|h| h == DATETIME);

        let mut timestamps = Vec::new();
        let mut columns = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            timestamps.push(datetime.and_then(|i| record.get(i)).unwrap_or_default().to_string());
            for (i, column) in columns.iter_mut().enumerate() {
                let value = if Some(i) == datetime {
                    None
                } else {
                    record.get(i).and_then(|cell| cell.parse::<f64>().ok())
                };
                column.push(value);
            }
        }
        Ok(Self {
            headers,
            timestamps,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Header at CSV position `index`.
    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> BatchResult<&[Option<f64>]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| BatchError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Value of `name` in `row`, `None` when missing or unparseable.
    pub fn value(&self, row: usize, name: &str) -> BatchResult<Option<f64>> {
        Ok(self.column(name)?.get(row).copied().flatten())
    }

    /// Append or replace a derived column.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> BatchResult<()> {
        if values.len() != self.len() {
            return Err(BatchError::DataQuality {
                what: format!("column '{name}' has {} values for {} rows", values.len(), self.len()),
            });
        }
        match self.headers.iter().position(|h| h == name) {
            Some(i) => self.columns[i] = values,
            None => {
                self.headers.push(name.to_string());
                self.columns.push(values);
            }
        }
        Ok(())
    }

    /// Rows for which `keep(row)` holds, in order.
    pub fn filter(&self, mut keep: impl FnMut(usize) -> bool) -> Self {
        let rows: Vec<usize> = (0..self.len()).filter(|&r| keep(r)).collect();
        self.select(&rows)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let rows: Vec<usize> = (0..self.len().min(n)).collect();
        self.select(&rows)
    }

    fn select(&self, rows: &[usize]) -> Self {
        Self {
            headers: self.headers.clone(),
            timestamps: rows.iter().map(|&r| self.timestamps[r].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| rows.iter().map(|&r| c[r]).collect())
                .collect(),
        }
    }
}

/// Plant timestamps are `M/D/YYYY H:MM`, occasionally without the time.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%m/%d/%Y %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%m/%d/%Y %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%m/%d/%Y")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn in_month(text: &str, month: u32, year: i32) -> bool {
    parse_timestamp(text).is_some_and(|t| t.month() == month && t.year() == year)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
DateTime,flow (gpm),pressure (psi)
8/1/2021 2:00,1600.5,136
8/1/2021 14:00,Bad Data,137.5
9/2/2021 2:00,1500,
";

    #[test]
    fn coerces_numeric_columns() {
        let t = Table::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.header(1), Some("flow (gpm)"));
        assert_eq!(t.column("flow (gpm)").unwrap(), &[Some(1600.5), None, Some(1500.0)]);
        assert_eq!(t.value(2, "pressure (psi)").unwrap(), None);
        assert_eq!(t.timestamps()[1], "8/1/2021 14:00");
        assert!(matches!(t.column("temperature"), Err(BatchError::MissingColumn { .. })));
    }

    #[test]
    fn filter_and_head_keep_columns_aligned() {
        let t = Table::from_reader(SAMPLE.as_bytes()).unwrap();
        let august = t.filter(|r| in_month(&t.timestamps()[r], 8, 2021));
        assert_eq!(august.len(), 2);
        assert_eq!(august.column("pressure (psi)").unwrap(), &[Some(136.0), Some(137.5)]);
        assert_eq!(t.head(1).len(), 1);
        assert_eq!(t.head(10).len(), 3);
    }

    #[test]
    fn derived_columns_must_match_length() {
        let mut t = Table::from_reader(SAMPLE.as_bytes()).unwrap();
        t.set_column("salinity (g/L)", vec![Some(0.5); 3]).unwrap();
        assert_eq!(t.value(0, "salinity (g/L)").unwrap(), Some(0.5));
        assert!(t.set_column("x", vec![None; 2]).is_err());
    }

    #[test]
    fn timestamps_parse_without_padding() {
        let t = parse_timestamp("8/19/2021 2:00").unwrap();
        assert_eq!((t.month(), t.day(), t.year()), (8, 19, 2021));
        assert!(parse_timestamp("3/13/2021").is_some());
        assert!(parse_timestamp("2021-08-19").is_none());
        assert!(!in_month("7/31/2021 23:00", 8, 2021));
        assert!(!in_month("8/1/2020 0:00", 8, 2021));
    }
}
