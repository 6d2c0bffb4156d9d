//! In-memory trajectory table
//!
//! One row per output frame, one column per field, column 0 is time.
//! Tables are read once and never mutated afterwards.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TrajectoryTable {
    data: Array2<f64>, // rows x columns
    names: Option<Vec<String>>, // column names when the file had a header
}

impl TrajectoryTable {
    /// Build from equally long rows. Row length is checked against the first row
    pub fn from_rows(rows: &[Vec<f64>], names: Option<Vec<String>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).ok_or(Error::EmptyTable)?;

        let mut data = Array2::zeros((rows.len(), cols));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::RaggedRow { line: i + 1, expected: cols, found: row.len() });
            }
            for (j, &v) in row.iter().enumerate() {
                data[[i, j]] = v;
            }
        }

        Ok(Self { data, names })
    }

    /// Whitespace-delimited `.dat` file; `#` lines and blank lines are skipped
    pub fn load_dat(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::parse_dat(BufReader::new(file)).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        debug!("loaded {} ({} rows, {} columns)", path.display(), table.n_rows(), table.n_cols());
        Ok(table)
    }

    pub fn parse_dat<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut width = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io("<stream>", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let row = trimmed
                .split_whitespace()
                .map(|tok| parse_number(tok, idx + 1))
                .collect::<Result<Vec<f64>>>()?;

            let expected = *width.get_or_insert(row.len());
            if row.len() != expected {
                return Err(Error::RaggedRow { line: idx + 1, expected, found: row.len() });
            }
            rows.push(row);
        }

        Self::from_rows(&rows, None)
    }

    /// Comma-separated file. A plain header row or a `#`-commented header
    /// (e.g. `# t, theta1, omega1, ...`) supplies column names; other `#`
    /// lines are comments
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::parse_csv(file)?;
        debug!("loaded {} ({} rows, {} columns)", path.display(), table.n_rows(), table.n_cols());
        Ok(table)
    }

    pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut header: Option<Vec<String>> = None;
        let mut commented_header: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut width = None;
        let mut record = StringRecord::new();

        while rdr.read_record(&mut record)? {
            let line = record.position().map_or(0, |p| p.line() as usize);
            let first = record.get(0).unwrap_or("");

            if first.starts_with('#') {
                if rows.is_empty() && commented_header.is_none() {
                    commented_header = names_from_comment(&record);
                }
                continue;
            }
            if record.iter().all(str::is_empty) {
                continue;
            }

            if rows.is_empty() && header.is_none() && record.iter().any(|f| f.parse::<f64>().is_err()) {
                header = Some(record.iter().map(str::to_string).collect());
                continue;
            }

            let row = record
                .iter()
                .map(|tok| parse_number(tok, line))
                .collect::<Result<Vec<f64>>>()?;

            let expected = *width.get_or_insert(row.len());
            if row.len() != expected {
                return Err(Error::RaggedRow { line, expected, found: row.len() });
            }
            rows.push(row);
        }

        Self::from_rows(&rows, header.or(commented_header))
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.as_ref()?.iter().position(|n| n == name)
    }

    /// Owned copy of column `index`
    pub fn column_at(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.n_cols() {
            return Err(Error::MissingColumn(format!("#{}", index)));
        }
        Ok(self.data.column(index).to_vec())
    }

    /// Owned copy of the column called `name`
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.column_index(name).ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        self.column_at(index)
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.n_rows()).then(|| self.data.row(index))
    }

    /// Column 0
    pub fn time(&self) -> Vec<f64> {
        self.data.column(0).to_vec()
    }
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| Error::Parse { line, token: token.to_string() })
}

/// Names from a `# a, b, c` line, only when none of them is numeric
fn names_from_comment(record: &StringRecord) -> Option<Vec<String>> {
    let names: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(i, f)| if i == 0 { f.trim_start_matches('#').trim() } else { f })
        .map(str::to_string)
        .collect();

    let usable = names.len() > 1
        && names.iter().all(|n| !n.is_empty() && n.parse::<f64>().is_err());
    usable.then_some(names)
}
