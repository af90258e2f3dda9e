//! Book field rules that depend on the calendar

use crate::error::{AppError, AppResult};

/// Year of the Gutenberg Bible, the earliest accepted publication year.
pub const EARLIEST_PUBLISHED_YEAR: i32 = 1455;

pub const MIN_ORDER_QTY: i32 = 1;
pub const MAX_ORDER_QTY: i32 = 500;

pub fn validate_published_year(year: i32, current_year: i32) -> AppResult<i32> {
    if !(EARLIEST_PUBLISHED_YEAR..=current_year).contains(&year) {
        return Err(AppError::Validation(format!(
            "Published year must be between {} and {}",
            EARLIEST_PUBLISHED_YEAR, current_year
        )));
    }
    Ok(year)
}

pub fn validate_qty(qty: i32) -> AppResult<i32> {
    if !(MIN_ORDER_QTY..=MAX_ORDER_QTY).contains(&qty) {
        return Err(AppError::Validation(format!(
            "Order cannot have more than {} copies of a book, and orders cannot be of zero quantity",
            MAX_ORDER_QTY
        )));
    }
    Ok(qty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_year_bounds() {
        assert!(validate_published_year(1455, 2025).is_ok());
        assert!(validate_published_year(2025, 2025).is_ok());
        assert!(validate_published_year(1454, 2025).is_err());
        assert!(validate_published_year(2026, 2025).is_err());
    }

    #[test]
    fn test_qty_bounds() {
        assert!(validate_qty(1).is_ok());
        assert!(validate_qty(500).is_ok());
        assert!(validate_qty(0).is_err());
        assert!(validate_qty(501).is_err());
        assert!(validate_qty(-3).is_err());
    }
}
