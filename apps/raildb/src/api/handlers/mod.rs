//! Route handlers, one module per surface.

pub mod analytics;
pub mod fragility;
pub mod students;
pub mod system;

use super::error::ApiError;
use raildb_core::{GradeRecord, GradeStore, StoreError};

/// Run a store operation on the blocking pool.
pub(crate) async fn blocking<T, F>(store: &GradeStore, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&GradeStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    Ok(tokio::task::spawn_blocking(move || op(&store)).await??)
}

/// Load every record for an aggregation.
pub(crate) async fn all_records(store: &GradeStore) -> Result<Vec<GradeRecord>, ApiError> {
    blocking(store, GradeStore::all).await
}
