use std::sync::{Arc, Mutex};

use selah_core::clock::Clock;
use selah_core::Database;
use selah_llm::TextGenerator;

/// Shared application state passed to all route handlers.
///
/// The database handle is a single mutex-guarded connection; handlers take
/// the lock inside `spawn_blocking` so rusqlite work never stalls the
/// async executor.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub clock: Arc<dyn Clock>,
    pub generator: Arc<dyn TextGenerator>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn TextGenerator>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            clock,
            generator,
            admin_token,
        }
    }

    /// Run a database closure on the blocking pool, holding the connection
    /// lock only for the duration of the closure.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, crate::error::AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> selah_core::error::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut db = db.lock().map_err(|_| {
                selah_core::error::SelahError::QueryFailed("connection lock poisoned".into())
            })?;
            f(&mut db)
        })
        .await
        .map_err(|e| crate::error::AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(result)
    }
}
