/// Utilities for working with box tables as Polars DataFrames
///
/// Ground truth and replayed predictions share one CSV layout:
/// `filename, x_min, y_min, x_max, y_max`, one row per box. This module reads
/// and writes that layout and turns rows into per-image box groups.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use crate::error::LogoEvalError;
use crate::types::BoundingBox;

/// Filename column of a box table.
pub const FILENAME_COLUMN: &str = "filename";

/// Coordinate columns of a box table, in XYXY order.
pub const BOX_COLUMNS: [&str; 4] = ["x_min", "y_min", "x_max", "y_max"];

/// Validate that a DataFrame contains all required columns
///
/// # Returns
///
/// `Ok(())` if all columns are present, [`LogoEvalError::MissingColumn`]
/// naming the first absent one otherwise
pub fn validate_columns(df: &DataFrame, required_columns: &[&str]) -> Result<(), LogoEvalError> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for col in required_columns {
        if !column_names.iter().any(|c| c == col) {
            return Err(LogoEvalError::MissingColumn(col.to_string()));
        }
    }

    Ok(())
}

/// Validate the schema of a box table
///
/// Expected columns: filename, x_min, y_min, x_max, y_max. Extra columns are
/// allowed and ignored.
pub fn validate_box_table(df: &DataFrame) -> Result<(), LogoEvalError> {
    validate_columns(df, &[FILENAME_COLUMN])?;
    validate_columns(df, &BOX_COLUMNS)
}

/// Read a CSV file with a header row into a DataFrame
pub fn read_csv(path: &Path) -> Result<DataFrame, LogoEvalError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Read in-memory CSV text with a header row into a DataFrame
pub fn read_csv_str(csv: &str) -> Result<DataFrame, LogoEvalError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes().to_vec()))
        .finish()?;
    Ok(df)
}

/// Extract a column as strings, rejecting nulls
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, LogoEvalError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    column
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(str::to_string).ok_or_else(|| {
                LogoEvalError::InvalidBoundingBox(format!("row {row}: empty {name}"))
            })
        })
        .collect()
}

/// Extract a column as integers; float values are truncated, nulls kept
fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, LogoEvalError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Group the rows of a box table by filename
///
/// Boxes keep their row order within an image; images are ordered by name.
/// Rows with missing, negative or inverted coordinates are rejected with an
/// error naming the file and row.
pub fn group_boxes_by_filename(
    df: &DataFrame,
) -> Result<BTreeMap<String, Vec<BoundingBox>>, LogoEvalError> {
    validate_box_table(df)?;

    let file_names = string_column(df, FILENAME_COLUMN)?;
    let coords = BOX_COLUMNS
        .iter()
        .map(|name| int_column(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: BTreeMap<String, Vec<BoundingBox>> = BTreeMap::new();

    for (row, file_name) in file_names.into_iter().enumerate() {
        let mut values = [0u32; 4];
        for (slot, (column, name)) in values.iter_mut().zip(coords.iter().zip(BOX_COLUMNS)) {
            let raw = column[row].ok_or_else(|| {
                LogoEvalError::InvalidBoundingBox(format!(
                    "{file_name} (row {row}): missing or non-numeric {name}"
                ))
            })?;
            *slot = u32::try_from(raw).map_err(|_| {
                LogoEvalError::InvalidBoundingBox(format!(
                    "{file_name} (row {row}): {name} = {raw} is out of range"
                ))
            })?;
        }

        let [x_min, y_min, x_max, y_max] = values;
        let bbox = BoundingBox::new(x_min, y_min, x_max, y_max).map_err(|e| {
            LogoEvalError::InvalidBoundingBox(format!("{file_name} (row {row}): {e}"))
        })?;

        groups.entry(file_name).or_default().push(bbox);
    }

    Ok(groups)
}

/// Build a box table from `(filename, box)` rows
pub fn boxes_to_dataframe<'a, I>(rows: I) -> Result<DataFrame, LogoEvalError>
where
    I: IntoIterator<Item = (&'a str, &'a BoundingBox)>,
{
    let mut file_names: Vec<String> = Vec::new();
    let mut x_min: Vec<i64> = Vec::new();
    let mut y_min: Vec<i64> = Vec::new();
    let mut x_max: Vec<i64> = Vec::new();
    let mut y_max: Vec<i64> = Vec::new();

    for (file_name, bbox) in rows {
        file_names.push(file_name.to_string());
        x_min.push(i64::from(bbox.x_min()));
        y_min.push(i64::from(bbox.y_min()));
        x_max.push(i64::from(bbox.x_max()));
        y_max.push(i64::from(bbox.y_max()));
    }

    let df = df!(
        FILENAME_COLUMN => file_names,
        BOX_COLUMNS[0] => x_min,
        BOX_COLUMNS[1] => y_min,
        BOX_COLUMNS[2] => x_max,
        BOX_COLUMNS[3] => y_max,
    )?;
    Ok(df)
}

/// Write a DataFrame as CSV with a header row, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), LogoEvalError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}
