use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::application::repos::HealthRepo;

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    pub store: Arc<dyn HealthRepo>,
}

impl ApiState {
    pub fn new(catalog: Arc<CatalogService>, store: Arc<dyn HealthRepo>) -> Self {
        Self { catalog, store }
    }
}
