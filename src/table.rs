/// Iterate `rows` up to (not including) the first row whose `key` column is
/// blank, yielding each row with its 0-based offset from the top of the range.
///
/// Tables on the setup sheets have no fixed height: the first empty key cell
/// terminates them. `cap` bounds the scan for tables that never terminate.
pub fn rows_until_blank(
    rows: &[Vec<String>],
    key: usize,
    cap: usize,
) -> impl Iterator<Item = (usize, &[String])> {
    rows.iter()
        .take(cap)
        .map(Vec::as_slice)
        .enumerate()
        .take_while(move |(_, row)| !cell(row, key).is_empty())
}

/// Trimmed cell value; missing cells read as blank.
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", |s| s.trim())
}

/// Trimmed cell value, `None` when blank.
pub fn optional_cell(row: &[String], col: usize) -> Option<&str> {
    Some(cell(row, col)).filter(|s| !s.is_empty())
}

/// Column `col` of a row-major range, top to bottom.
pub fn column(rows: &[Vec<String>], col: usize) -> Vec<&str> {
    rows.iter().map(|row| cell(row, col)).collect()
}
