//! Field validators applied at the request boundary.
//!
//! Everything here is pure: no storage access, no ambient state beyond the
//! current year passed in by the caller.

pub mod book;
pub mod isbn;
pub mod patron;

pub use isbn::{normalize_isbn, IsbnError};
