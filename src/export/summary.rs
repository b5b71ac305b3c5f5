//! Joins the rolling windows on date and writes them as one CSV table.

use crate::export::error::ExportError;
use crate::types::records::{DailyRecord, RollingRecord, SummaryRow};
use crate::types::variable::Statistic;
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const COL_DATE: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full outer join of rolling records on date.
///
/// A date reached by only some windows still gets a row; the other windows are absent from it.
pub fn join_windows(records: &[RollingRecord]) -> Vec<SummaryRow> {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<usize, _>> = BTreeMap::new();
    for record in records {
        by_date
            .entry(record.date)
            .or_default()
            .insert(record.window, record.stats);
    }
    by_date
        .into_iter()
        .map(|(date, windows)| SummaryRow { date, windows })
        .collect()
}

/// Column layout: `date`, then the seven statistics for each window in the given order.
pub fn summary_frame(rows: &[SummaryRow], windows: &[usize]) -> Result<DataFrame, ExportError> {
    let mut columns = Vec::with_capacity(1 + windows.len() * Statistic::ALL.len());
    columns.push(date_column(rows.iter().map(|r| r.date)));
    for &window in windows {
        for statistic in Statistic::ALL {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.get(window, statistic)).collect();
            columns.push(Column::new(statistic.window_column(window).into(), values));
        }
    }
    DataFrame::new(columns).map_err(ExportError::Frame)
}

/// Column layout: `date`, then the seven statistic names.
pub fn daily_frame(records: &[DailyRecord]) -> Result<DataFrame, ExportError> {
    let mut columns = Vec::with_capacity(1 + Statistic::ALL.len());
    columns.push(date_column(records.iter().map(|r| r.date)));
    for statistic in Statistic::ALL {
        let values: Vec<Option<f64>> = records.iter().map(|r| r.stats.get(statistic)).collect();
        columns.push(Column::new(statistic.name().into(), values));
    }
    DataFrame::new(columns).map_err(ExportError::Frame)
}

fn date_column(dates: impl Iterator<Item = NaiveDate>) -> Column {
    let dates: Vec<String> = dates.map(|d| d.format(DATE_FORMAT).to_string()).collect();
    Column::new(COL_DATE.into(), dates)
}

/// Writes the joined windows to `path`, replacing any previous file.
pub fn write_summary(
    path: &Path,
    rows: &[SummaryRow],
    windows: &[usize],
) -> Result<(), ExportError> {
    let mut df = summary_frame(rows, windows)?;
    write_csv(path, &mut df)?;
    info!("Wrote {} summary rows to {:?}", df.height(), path);
    Ok(())
}

/// Writes daily records to `path`, replacing any previous file.
pub fn write_daily(path: &Path, records: &[DailyRecord]) -> Result<(), ExportError> {
    let mut df = daily_frame(records)?;
    write_csv(path, &mut df)?;
    info!("Wrote {} daily rows to {:?}", df.height(), path);
    Ok(())
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<(), ExportError> {
    let path_buf = path.to_path_buf();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::WriteIo(path_buf.clone(), e))?;
    }
    let mut file =
        std::fs::File::create(path).map_err(|e| ExportError::WriteIo(path_buf.clone(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| ExportError::WritePolars(path_buf, e))
}

/// Reads a table written by [`write_summary`] back into rows.
pub fn read_summary(path: &Path) -> Result<Vec<SummaryRow>, ExportError> {
    let path_buf = path.to_path_buf();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path_buf.clone()))
        .map_err(|e| ExportError::Read(path_buf.clone(), e))?
        .finish()
        .map_err(|e| ExportError::Read(path_buf.clone(), e))?;

    let date_col = df
        .column(COL_DATE)
        .and_then(|c| c.str())
        .map_err(|_| ExportError::MissingDateColumn(path_buf.clone()))?;

    let mut rows = Vec::with_capacity(df.height());
    for (row, raw) in date_col.into_iter().enumerate() {
        let raw = raw.unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
            ExportError::InvalidValue {
                path: path_buf.clone(),
                column: COL_DATE.to_string(),
                row,
                value: raw.to_string(),
            }
        })?;
        rows.push(SummaryRow {
            date,
            windows: BTreeMap::new(),
        });
    }

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == COL_DATE {
            continue;
        }
        let (statistic, window) =
            parse_window_column(name).ok_or_else(|| ExportError::UnknownColumn {
                path: path_buf.clone(),
                column: name.to_string(),
            })?;
        let cells = column.str().map_err(|e| ExportError::Read(path_buf.clone(), e))?;
        for (row, cell) in cells.into_iter().enumerate() {
            let value = match cell.map(str::trim).filter(|s| !s.is_empty()) {
                None => None,
                Some(s) => Some(s.parse::<f64>().map_err(|_| ExportError::InvalidValue {
                    path: path_buf.clone(),
                    column: name.to_string(),
                    row,
                    value: s.to_string(),
                })?),
            };
            if let Some(value) = value {
                rows[row]
                    .windows
                    .entry(window)
                    .or_default()
                    .set(statistic, Some(value));
            }
        }
    }
    Ok(rows)
}

/// `precip_7d` → (Precip, 7)
fn parse_window_column(name: &str) -> Option<(Statistic, usize)> {
    let (stat, window) = name.rsplit_once('_')?;
    let window = window.strip_suffix('d')?.parse().ok()?;
    let statistic = Statistic::ALL.into_iter().find(|s| s.name() == stat)?;
    Some((statistic, window))
}

/// The window lengths present in a set of rows, ascending.
pub fn windows_of(rows: &[SummaryRow]) -> Vec<usize> {
    let mut windows: Vec<usize> = rows
        .iter()
        .flat_map(|r| r.windows.keys().copied())
        .collect();
    windows.sort_unstable();
    windows.dedup();
    windows
}
