//! ISBN-10 / ISBN-13 normalization.
//!
//! Every ISBN accepted at the boundary is converted to its canonical
//! 13-digit form here before it is used as a key.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsbnError {
    #[error("ISBN must only contain numeric characters or 'X' for ISBN-10.")]
    InvalidCharacters,

    #[error("ISBN must be 10 or 13 characters long.")]
    InvalidLength,

    #[error("Invalid ISBN-10")]
    InvalidIsbn10,

    #[error("Invalid ISBN-13")]
    InvalidIsbn13,
}

/// Normalize an ISBN-10 or ISBN-13 (hyphens allowed) into a checksum-valid
/// ISBN-13.
pub fn normalize_isbn(raw: &str) -> Result<String, IsbnError> {
    let value: String = raw.trim().chars().filter(|c| *c != '-').collect();
    let bytes = value.as_bytes();

    let Some((&last, body)) = bytes.split_last() else {
        return Err(IsbnError::InvalidLength);
    };

    if !body.iter().all(u8::is_ascii_digit) {
        return Err(IsbnError::InvalidCharacters);
    }
    let last_is_x = matches!(last, b'X' | b'x');
    if !last.is_ascii_digit() && !(last_is_x && bytes.len() == 10) {
        return Err(IsbnError::InvalidCharacters);
    }

    match bytes.len() {
        10 => {
            let mut sum: u32 = body
                .iter()
                .enumerate()
                .map(|(i, d)| (10 - i as u32) * digit(*d))
                .sum();
            sum += if last_is_x { 10 } else { digit(last) };
            if sum % 11 != 0 {
                return Err(IsbnError::InvalidIsbn10);
            }

            let mut isbn13 = String::with_capacity(13);
            isbn13.push_str("978");
            isbn13.push_str(&value[..9]);
            let check = isbn13_check_digit(isbn13.as_bytes());
            isbn13.push(char::from(b'0' + check as u8));
            Ok(isbn13)
        }
        13 => {
            if isbn13_check_digit(body) != digit(last) {
                return Err(IsbnError::InvalidIsbn13);
            }
            Ok(value)
        }
        _ => Err(IsbnError::InvalidLength),
    }
}

/// Check digit for the first 12 digits of an ISBN-13.
fn isbn13_check_digit(first12: &[u8]) -> u32 {
    let sum: u32 = first12
        .iter()
        .take(12)
        .enumerate()
        .map(|(i, d)| digit(*d) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    (10 - sum % 10) % 10
}

fn digit(b: u8) -> u32 {
    (b - b'0') as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satisfies_isbn13_checksum(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 13
            && b.iter().all(u8::is_ascii_digit)
            && isbn13_check_digit(&b[..12]) == digit(b[12])
    }

    #[test]
    fn test_isbn10_is_converted() {
        assert_eq!(normalize_isbn("0306406152").unwrap(), "9780306406157");
        assert_eq!(normalize_isbn("0-306-40615-2").unwrap(), "9780306406157");
    }

    #[test]
    fn test_isbn10_check_digit_x() {
        // 080442957X is a valid ISBN-10 with an X check digit
        let isbn = normalize_isbn("080442957X").unwrap();
        assert_eq!(isbn, "9780804429573");
        assert_eq!(normalize_isbn("080442957x").unwrap(), isbn);
    }

    #[test]
    fn test_isbn10_results_satisfy_isbn13_checksum() {
        for raw in ["0306406152", "080442957X", "2070408507", "0198526636"] {
            let isbn = normalize_isbn(raw).unwrap();
            assert!(isbn.starts_with("978"), "{}", isbn);
            assert!(satisfies_isbn13_checksum(&isbn), "{}", isbn);
        }
    }

    #[test]
    fn test_isbn13_is_kept() {
        assert_eq!(normalize_isbn("978-0-306-40615-7").unwrap(), "9780306406157");
        assert_eq!(normalize_isbn("9782070408504").unwrap(), "9782070408504");
        assert_eq!(normalize_isbn("  9782070408504 ").unwrap(), "9782070408504");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_isbn("0306406152").unwrap();
        assert_eq!(normalize_isbn(&once).unwrap(), once);
    }

    #[test]
    fn test_bad_checksums() {
        assert_eq!(normalize_isbn("0306406151"), Err(IsbnError::InvalidIsbn10));
        assert_eq!(normalize_isbn("9780306406158"), Err(IsbnError::InvalidIsbn13));
    }

    #[test]
    fn test_bad_lengths() {
        assert_eq!(normalize_isbn(""), Err(IsbnError::InvalidLength));
        assert_eq!(normalize_isbn("12345"), Err(IsbnError::InvalidLength));
        assert_eq!(normalize_isbn("978030640615"), Err(IsbnError::InvalidLength));
        assert_eq!(normalize_isbn("97803064061570"), Err(IsbnError::InvalidLength));
    }

    #[test]
    fn test_bad_characters() {
        assert_eq!(normalize_isbn("03064A6152"), Err(IsbnError::InvalidCharacters));
        assert_eq!(normalize_isbn("030640615Y"), Err(IsbnError::InvalidCharacters));
        // X is only a check digit for ISBN-10
        assert_eq!(normalize_isbn("978030640615X"), Err(IsbnError::InvalidCharacters));
    }
}
