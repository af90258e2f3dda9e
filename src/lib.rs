//! Biblio library management server
//!
//! A REST JSON API for managing patrons, books and their physical copies,
//! authors, publishers and the borrow/return lifecycle, with a daily
//! overdue fine run.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
