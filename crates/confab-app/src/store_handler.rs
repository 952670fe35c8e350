use std::sync::Arc;

use salvo::async_trait;

use confab_core::error::CoreError;
use confab_db::store::Store;

use crate::error::AppResult;

pub struct StoreHandler {
    pub store: Arc<dyn Store>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the persistence store from the depot.
///
/// ## Errors
/// Returns an error if the store is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn Store>> {
    depot
        .obtain::<Arc<dyn Store>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Store not found in depot").into())
}
