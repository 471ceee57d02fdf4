use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument};

use super::model::FareModel;
use crate::{FareError, Result};

struct CachedModel {
    source: String,
    model: Arc<FareModel>,
}

/// Loads the fare model from a fixed path and keeps it for the process lifetime.
///
/// The file is read on every load and only re-parsed when its contents
/// differ from the cached artifact. A deleted file becomes a load error.
pub struct ModelStore {
    path: PathBuf,
    cached: Mutex<Option<CachedModel>>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Arc<FareModel>> {
        let source = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FareError::model_load(&self.path, "model file not found"),
            _ => FareError::model_load(&self.path, e.to_string()),
        })?;

        if let Some(cached) = self.lock().as_ref() {
            if cached.source == source {
                debug!("Using cached fare model");
                return Ok(Arc::clone(&cached.model));
            }
        }

        let model = Arc::new(parse_model(&self.path, &source)?);
        info!("Loaded fare model (version {})", model.version);

        *self.lock() = Some(CachedModel {
            source,
            model: Arc::clone(&model),
        });
        Ok(model)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedModel>> {
        self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_model(path: &Path, json: &str) -> Result<FareModel> {
    FareModel::from_json(json)
        .map_err(|e| FareError::model_load(path, format!("invalid model artifact: {e}")))
}
