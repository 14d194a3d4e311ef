//! A1-style cell references
//!
//! Column letters are bijective base-26: there is no zero digit, so after
//! taking `n % 26` the quotient is reduced by one (`n = n / 26 - 1`) and the
//! loop runs while `n >= 0`.

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Convert a zero-based column index to its letters (0→A, 25→Z, 26→AA, ...)
pub fn column_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = i64::from(col);

    while n >= 0 {
        letters.push(LETTERS[(n % 26) as usize]);
        n = n / 26 - 1;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}

/// Build a cell reference from a zero-based column and a one-based row
///
/// Examples:
/// - (0, 1) → A1
/// - (26, 1) → AA1
/// - (702, 12) → AAA12
pub fn cell_reference(col: u32, row: u32) -> String {
    format!("{}{}", column_letter(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        // Single letters
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");

        // Double letters
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");

        // Triple letters
        assert_eq!(column_letter(702), "AAA");
        assert_eq!(column_letter(16383), "XFD");
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 1), "A1");
        assert_eq!(cell_reference(25, 1), "Z1");
        assert_eq!(cell_reference(26, 1), "AA1");
        assert_eq!(cell_reference(701, 1), "ZZ1");
        assert_eq!(cell_reference(702, 1), "AAA1");
        assert_eq!(cell_reference(27, 12), "AB12");
    }

    #[test]
    fn test_column_letter_large_index() {
        assert_eq!(column_letter(u32::MAX), "MWLQKWV");
    }
}
