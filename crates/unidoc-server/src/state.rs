//! Server state management.

use std::sync::Arc;

use unidoc_core::UnidocCore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<UnidocCore>,
}

impl AppState {
    pub fn new(core: UnidocCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }

    /// Run `f` against the core on the blocking thread pool.
    ///
    /// A panic inside `f` surfaces as an internal error.
    pub async fn run_blocking<F, T>(&self, f: F) -> Result<T, crate::ApiError>
    where
        F: FnOnce(&UnidocCore) -> Result<T, unidoc_core::UnidocError> + Send + 'static,
        T: Send + 'static,
    {
        let core = Arc::clone(&self.core);
        let result = tokio::task::spawn_blocking(move || f(&core)).await?;
        Ok(result?)
    }
}
