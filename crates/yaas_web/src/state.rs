use std::path::PathBuf;
use std::sync::Arc;
use yaas_core::ArticleStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    /// Directory holding the static frontend (`index.html`)
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStorage>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            public_dir: public_dir.into(),
        }
    }
}
