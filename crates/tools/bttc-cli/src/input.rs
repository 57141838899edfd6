//! Grid loading from JSON or CSV files

use std::{fs, io::Read, path::Path, str::FromStr};

use anyhow::{bail, Context};
use bttc::{is_valid_size, GridBuf};
use clap::ValueEnum;

/// Grid file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// JSON array of rows
    Json,
    /// One row per line, comma separated, no header
    Csv,
}

impl InputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A `size x size` sub-window starting at row `x`, column `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, size] = parts.as_slice() else {
            return Err(format!("expected X,Y,SIZE, got {s:?}"));
        };
        let parse = |part: &str| {
            part.parse::<usize>()
                .map_err(|err| format!("invalid window component {part:?}: {err}"))
        };
        Ok(Self {
            x: parse(*x)?,
            y: parse(*y)?,
            size: parse(*size)?,
        })
    }
}

/// Parse a JSON array of rows
pub fn parse_json(text: &str) -> anyhow::Result<GridBuf> {
    serde_json::from_str(text).context("invalid JSON grid")
}

/// Parse headerless CSV, one grid row per record
pub fn parse_csv(reader: impl Read) -> anyhow::Result<GridBuf> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV row {}", line + 1))?;
        let row = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().with_context(|| {
                    format!("row {}: {field:?} is not a number", line + 1)
                })
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(GridBuf::from_rows(rows)?)
}

/// Load a square grid, checking that it can be subdivided
///
/// When a window is requested the file may hold any square grid; otherwise its
/// side must be `2^m + 1`.
pub fn load_grid(
    path: &Path,
    format: Option<InputFormat>,
    window: Option<Window>,
) -> anyhow::Result<GridBuf> {
    let format = match format.or_else(|| InputFormat::from_path(path)) {
        Some(format) => format,
        None => bail!(
            "cannot tell the format of {}; pass --input-format",
            path.display()
        ),
    };

    let grid = match format {
        InputFormat::Json => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_json(&text)
        }
        InputFormat::Csv => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            parse_csv(file)
        }
    }
    .with_context(|| format!("failed to load grid from {}", path.display()))?;

    if window.is_none() && !is_valid_size(grid.size()) {
        bail!(
            "grid side {} is not of the form 2^m+1; resample it or pass --window",
            grid.size()
        );
    }

    tracing::info!(size = grid.size(), path = %path.display(), "grid loaded");
    Ok(grid)
}
