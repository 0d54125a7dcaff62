use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HmmError;

/// Default file-name prefix of warping path tables.
pub const PATH_TABLE_PREFIX: &str = "path_word";

/// Parses a two-column `(template row, input column)` table.
///
/// Fields may be separated by commas or whitespace. Lines that do not hold
/// exactly two integers are skipped.
pub fn parse_path_table(contents: &str) -> Vec<(i64, i64)> {
    contents
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .collect();
            if fields.len() != 2 {
                return None;
            }
            let i = fields[0].parse::<i64>().ok()?;
            let j = fields[1].parse::<i64>().ok()?;
            Some((i, j))
        })
        .collect()
}

/// Reads a path table and requires at least two points.
pub fn read_path_table(path: &Path) -> Result<Vec<(i64, i64)>, HmmError> {
    let contents = fs::read_to_string(path).map_err(|e| HmmError::io("read path table", e))?;
    let points = parse_path_table(&contents);
    if points.len() < 2 {
        return Err(HmmError::invalid_input(format!(
            "'{}' holds {} point(s); a path needs at least 2",
            path.display(),
            points.len()
        )));
    }
    Ok(points)
}

/// Sorted `<prefix>*.csv` files directly under `dir`.
pub fn collect_path_tables(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, HmmError> {
    let entries = fs::read_dir(dir).map_err(|e| HmmError::io("list path table directory", e))?;
    let mut tables = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HmmError::io("read path table directory entry", e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".csv"));
        if matches {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}
