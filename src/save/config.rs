//! Root directories that save locations are resolved against

use super::types::SaveError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Base directories for the save system
///
/// `save_root` holds user-facing save data; `data_root` (optional) holds
/// internal game data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootConfig {
    save_root: PathBuf,
    data_root: Option<PathBuf>,
}

impl RootConfig {
    /// Creates the configuration, creating both directories if they don't exist
    pub fn init(
        save_root: impl AsRef<Path>,
        data_root: Option<impl AsRef<Path>>,
    ) -> Result<Self, SaveError> {
        let save_root = save_root.as_ref().to_path_buf();
        let data_root = data_root.map(|p| p.as_ref().to_path_buf());

        create_root(&save_root)?;
        if let Some(data_root) = &data_root {
            create_root(data_root)?;
        }

        Ok(RootConfig {
            save_root,
            data_root,
        })
    }

    /// Platform default roots: `<data dir>/<app_name>/saves` and `<data dir>/<app_name>/data`
    pub fn for_app(app_name: &str) -> Result<Self, SaveError> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;
        let app_dir = data_dir.join(app_name);

        RootConfig::init(app_dir.join("saves"), Some(app_dir.join("data")))
    }

    pub fn save_root(&self) -> &Path {
        &self.save_root
    }

    pub fn data_root(&self) -> Option<&Path> {
        self.data_root.as_deref()
    }

    /// Root for the given partition
    pub fn root(&self, is_game_data: bool) -> Result<&Path, SaveError> {
        if is_game_data {
            self.data_root().ok_or(SaveError::NoDataRoot)
        } else {
            Ok(self.save_root())
        }
    }
}

fn create_root(path: &Path) -> Result<(), SaveError> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        log::debug!("Created root directory {}", path.display());
    }
    Ok(())
}
