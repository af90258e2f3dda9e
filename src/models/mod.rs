//! Data models for Biblio

pub mod author;
pub mod book;
pub mod borrow;
pub mod patron;
pub mod publisher;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookCopy};
pub use borrow::{Borrow, BorrowDetails};
pub use patron::{Patron, PatronStatus};
pub use publisher::Publisher;
