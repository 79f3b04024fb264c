//! Bijective base-26 column numerals.
//!
//! Column letters use digits `1..=26` (`A`..=`Z`) with no zero digit, so every
//! positive integer has exactly one spelling: `A`=1, `Z`=26, `AA`=27, `AZ`=52,
//! `ZZ`=702, `AAA`=703.

const RADIX: u32 = 26;

/// Render a 1-based column number as letters. Returns `None` for column 0.
pub fn column_to_letters(col: u32) -> Option<String> {
    if col == 0 {
        return None;
    }
    let mut buf = Vec::new();
    let mut div = col;
    while div > 0 {
        let mut rem = div % RADIX;
        div /= RADIX;
        if rem == 0 {
            rem = RADIX;
            div -= 1;
        }
        buf.push(b'A' + (rem - 1) as u8);
    }
    buf.reverse();
    Some(buf.into_iter().map(char::from).collect())
}

/// Parse column letters (either case) into a 1-based column number.
///
/// Returns `None` for empty input, non-letters, or values that overflow `u32`.
pub fn letters_to_column(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in s.bytes() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col.checked_mul(RADIX)?.checked_add(digit)?;
    }
    Some(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_columns() {
        let cases = [
            (1, "A"),
            (26, "Z"),
            (27, "AA"),
            (52, "AZ"),
            (53, "BA"),
            (702, "ZZ"),
            (703, "AAA"),
            (16_384, "XFD"),
        ];
        for (col, letters) in cases {
            assert_eq!(column_to_letters(col).as_deref(), Some(letters), "col {col}");
            assert_eq!(letters_to_column(letters), Some(col), "letters {letters}");
        }
    }

    #[test]
    fn zero_has_no_spelling() {
        assert_eq!(column_to_letters(0), None);
    }

    #[test]
    fn lowercase_letters_parse() {
        assert_eq!(letters_to_column("az"), Some(52));
        assert_eq!(letters_to_column("aA"), Some(27));
    }

    #[test]
    fn rejects_non_letters_and_overflow() {
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
        assert_eq!(letters_to_column("$A"), None);
        assert_eq!(letters_to_column("ZZZZZZZZ"), None);
    }

    #[test]
    fn u32_max_roundtrips() {
        let letters = column_to_letters(u32::MAX).unwrap();
        assert_eq!(letters_to_column(&letters), Some(u32::MAX));
    }
}
