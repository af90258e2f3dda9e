//! Patron management service

use std::sync::Arc;

use chrono::Datelike;
use validator::Validate;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::patron::{CreatePatron, Patron, UpdatePatron},
    repository::{patrons::PATRON_NOT_FOUND, Repository},
    validation::patron::{validate_patron_id, validate_phone},
};

/// Name searches return at most this many matches
pub const NAME_SEARCH_LIMIT: i64 = 3;
/// Fine searches return at most this many patrons
pub const FINE_SEARCH_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct PatronsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl PatronsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    fn patron_id(&self, raw: &str) -> AppResult<String> {
        validate_patron_id(raw, self.clock.today().year())
    }

    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        self.repository.patrons.list().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.patrons.count().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Patron> {
        let id = self.patron_id(id)?;
        self.repository.patrons.get_by_id(&id).await
    }

    /// Exact "first last" match
    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<Patron>> {
        let parts: Vec<&str> = name.split_whitespace().collect();
        let [first, last] = parts.as_slice() else {
            return Err(AppError::InvalidRequest(
                "Patron name must be given as first and last name".to_string(),
            ));
        };

        let patrons = self
            .repository
            .patrons
            .find_by_name(first, last, NAME_SEARCH_LIMIT)
            .await?;
        if patrons.is_empty() {
            return Err(AppError::NotFound(PATRON_NOT_FOUND.to_string()));
        }
        Ok(patrons)
    }

    /// Patrons owing strictly more than `fine`
    pub async fn with_fine_above(&self, fine: i32) -> AppResult<Vec<Patron>> {
        if fine < 0 {
            return Err(AppError::Validation("Fine must not be negative".to_string()));
        }
        let patrons = self
            .repository
            .patrons
            .find_with_fine_above(fine, FINE_SEARCH_LIMIT)
            .await?;
        if patrons.is_empty() {
            return Err(AppError::NotFound(format!("No patrons with a fine above {}", fine)));
        }
        Ok(patrons)
    }

    pub async fn total_fines(&self) -> AppResult<i64> {
        self.repository.patrons.total_fines().await
    }

    pub async fn create(&self, mut data: CreatePatron) -> AppResult<Patron> {
        data.patron_id = self.patron_id(&data.patron_id)?;
        data.patron_phone = validate_phone(&data.patron_phone)?;
        data.validate()?;

        let patron = self.repository.patrons.create(&data).await?;
        tracing::info!(patron_id = %patron.id, "Patron created");
        Ok(patron)
    }

    pub async fn update(&self, id: &str, mut data: UpdatePatron) -> AppResult<Patron> {
        let id = self.patron_id(id)?;
        if let Some(phone) = data.patron_phone.take() {
            data.patron_phone = Some(validate_phone(&phone)?);
        }
        data.validate()?;

        let patron = self.repository.patrons.update(&id, &data).await?;
        tracing::info!(patron_id = %patron.id, "Patron updated");
        Ok(patron)
    }

    /// Delete a patron and its borrows
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let id = self.patron_id(id)?;
        self.repository.patrons.delete(&id).await?;
        tracing::info!(patron_id = %id, "Patron deleted");
        Ok(())
    }
}
