use std::fmt;
use std::str::FromStr;

/// A single cell address, 0-based internally, rendered in A1 notation.
///
/// Field order makes the derived `Ord` column-major: every row of column B sorts
/// before any row of column C. Registry tables are laid out one column per
/// location, so this is also table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { col, row }
    }

    pub fn offset(&self, rows: usize, cols: usize) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }

    /// The 1-based row number, i.e. the numeric suffix of the A1 address.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row_number())
    }
}

impl FromStr for CellRef {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| A1Error(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(A1Error(s.to_string()));
        }
        let row: usize = digits.parse().map_err(|_| A1Error(s.to_string()))?;
        if row == 0 {
            return Err(A1Error(s.to_string()));
        }
        let col = letters
            .chars()
            .try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)
            })
            .ok_or_else(|| A1Error(s.to_string()))?;
        Ok(Self::new(row - 1, col - 1))
    }
}

/// A rectangular range, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start: CellRef, height: usize, width: usize) -> Self {
        debug_assert!(height > 0 && width > 0, "range must cover at least one cell");
        Self {
            start,
            end: start.offset(height - 1, width - 1),
        }
    }

    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn width(&self) -> usize {
        self.end.col - self.start.col + 1
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = match s.split_once(':') {
            Some((a, b)) => (a.parse::<CellRef>()?, b.parse::<CellRef>()?),
            None => {
                let cell = s.parse::<CellRef>()?;
                (cell, cell)
            }
        };
        // Normalise so that start is the top-left corner.
        Ok(Self {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Error(pub String);

impl fmt::Display for A1Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid A1 reference: {:?}", self.0)
    }
}

impl std::error::Error for A1Error {}

fn column_letters(mut col: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_display() {
        assert_eq!(CellRef::new(0, 0).to_string(), "A1");
        assert_eq!(CellRef::new(3, 1).to_string(), "B4");
        assert_eq!(CellRef::new(96, 30).to_string(), "AE97");
        assert_eq!(CellRef::new(0, 25).to_string(), "Z1");
        assert_eq!(CellRef::new(0, 26).to_string(), "AA1");
    }

    #[test]
    fn cell_parse() {
        assert_eq!("A4".parse::<CellRef>().unwrap(), CellRef::new(3, 0));
        assert_eq!("ae97".parse::<CellRef>().unwrap(), CellRef::new(96, 30));
        assert!("4A".parse::<CellRef>().is_err());
        assert!("A0".parse::<CellRef>().is_err());
        assert!("A".parse::<CellRef>().is_err());
    }

    #[test]
    fn overlong_column_is_rejected() {
        let letters = "Z".repeat(40);
        let err = format!("{letters}1").parse::<CellRef>().unwrap_err();
        assert_eq!(err.0, format!("{letters}1"));
        assert!(format!("A1:{letters}9").parse::<CellRange>().is_err());
    }

    #[test]
    fn range_parse_and_size() {
        let r: CellRange = "A1:AE97".parse().unwrap();
        assert_eq!(r.height(), 97);
        assert_eq!(r.width(), 31);
        assert_eq!(r.to_string(), "A1:AE97");

        let single: CellRange = "B2".parse().unwrap();
        assert_eq!(single.height(), 1);
        assert_eq!(single.width(), 1);

        // Reversed corners are normalised
        let rev: CellRange = "C5:A1".parse().unwrap();
        assert_eq!(rev.start, CellRef::new(0, 0));
        assert_eq!(rev.end, CellRef::new(4, 2));
    }

    #[test]
    fn range_from_anchor() {
        let r = CellRange::new("A4".parse().unwrap(), 2000, 10);
        assert_eq!(r.to_string(), "A4:J2003");
    }

    #[test]
    fn column_major_order() {
        // B30 sorts before C4: locations are columns
        assert!(CellRef::new(29, 1) < CellRef::new(3, 2));
        assert!(CellRef::new(3, 1) < CellRef::new(4, 1));
    }
}
