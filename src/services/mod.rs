//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod clock;
pub mod fines;
pub mod patrons;

use std::sync::Arc;

use crate::repository::Repository;

use self::{borrows::LifecycleManager, clock::Clock};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub patrons: patrons::PatronsService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services over `repository`, reading dates from `clock`
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let lifecycle = LifecycleManager::new(Arc::new(repository.clone()), clock.clone());
        Self {
            patrons: patrons::PatronsService::new(repository.clone(), clock.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), clock.clone()),
            borrows: borrows::BorrowsService::new(repository.clone(), lifecycle, clock),
            repository,
        }
    }
}
