//! Location and error types for the save system
//!
//! A `Location` describes where a value lives; the `SaveManager` resolves it
//! into a `TargetLocation` (a concrete folder + filename pair).

use std::fs;
use std::path::{Component, Path, PathBuf};

/// File extension used for every generated filename
pub const JSON_EXTENSION: &str = "json";

/// Where a value should be saved to / loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `<save root>/<TypeName>.json`
    Bare,

    /// `<data root or save root>/<subfolder>/<name>.json`
    Partitioned {
        is_game_data: bool,
        subfolder: PathBuf,
        name: String,
    },

    /// `<folder>/<name>`, outside both configured roots. The name is used verbatim.
    Explicit { folder: PathBuf, name: String },
}

impl Location {
    pub fn bare() -> Self {
        Location::Bare
    }

    /// User-facing save data under the save root
    pub fn save_data(subfolder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Location::Partitioned {
            is_game_data: false,
            subfolder: subfolder.into(),
            name: name.into(),
        }
    }

    /// Internal game data under the data root
    pub fn game_data(subfolder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Location::Partitioned {
            is_game_data: true,
            subfolder: subfolder.into(),
            name: name.into(),
        }
    }

    pub fn folder(folder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Location::Explicit {
            folder: folder.into(),
            name: name.into(),
        }
    }

    /// Whether resolving this location needs a configured root
    pub fn needs_root(&self) -> bool {
        !matches!(self, Location::Explicit { .. })
    }
}

/// A resolved `(folder, filename)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    pub folder: PathBuf,
    pub filename: String,
}

impl TargetLocation {
    pub fn new(folder: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        TargetLocation {
            folder: folder.into(),
            filename: filename.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }

    /// Sibling path used while writing, renamed over `path()` once complete
    pub fn temp_path(&self) -> PathBuf {
        self.folder.join(format!("{}.tmp", self.filename))
    }

    /// Where an undecodable file is moved before the default replaces it
    ///
    /// `<file>.corrupt` if free, otherwise the first free `<file>.corrupt.N`.
    pub fn corrupt_path(&self) -> PathBuf {
        let first = self.folder.join(format!("{}.corrupt", self.filename));
        if !first.exists() {
            return first;
        }

        (1u32..)
            .map(|n| self.folder.join(format!("{}.corrupt.{}", self.filename, n)))
            .find(|path| !path.exists())
            .unwrap_or(first)
    }

    /// Creates the folder (and parents) if it doesn't exist
    pub fn ensure_folder(&self) -> Result<(), SaveError> {
        if !self.folder.exists() {
            fs::create_dir_all(&self.folder)?;
        }
        Ok(())
    }
}

/// Whether `path` has a `.json` extension (any case)
pub fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(JSON_EXTENSION))
}

/// `name` with `.json` appended, unless it already ends in `.json`
pub fn json_filename(name: &str) -> String {
    if has_json_extension(Path::new(name)) {
        name.to_string()
    } else {
        format!("{}.{}", name, JSON_EXTENSION)
    }
}

/// `subfolder` reduced to its plain components, so joining it onto a root
/// can never leave that root
///
/// `/abs/dir` becomes `abs/dir`; `..` and `.` are dropped.
pub fn relative_subfolder(subfolder: &Path) -> PathBuf {
    subfolder
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Short, unqualified name of `T` with generic arguments stripped
///
/// `savelib::Settings` becomes `Settings`, `Vec<String>` becomes `Vec`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// Error types for save/load operations
#[derive(Debug)]
pub enum SaveError {
    /// No root configuration has been set on the manager
    NotInitialized,
    /// Game data was requested but no data root is configured
    NoDataRoot,
    /// The codec produced zero bytes
    EmptySerialization,
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    /// The file exists but its contents can't be decoded
    CorruptedData(String),
    /// The fallback instance could not be built
    ConstructionFailure(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::NotInitialized => write!(f, "Save system is not initialized"),
            SaveError::NoDataRoot => write!(f, "No data root configured"),
            SaveError::EmptySerialization => write!(f, "Serialization produced no output"),
            SaveError::IoError(e) => write!(f, "IO error: {}", e),
            SaveError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            SaveError::CorruptedData(msg) => write!(f, "Corrupted save data: {}", msg),
            SaveError::ConstructionFailure(msg) => {
                write!(f, "Failed to construct default instance: {}", msg)
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::IoError(e) => Some(e),
            SaveError::SerializationError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        SaveError::IoError(err)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::SerializationError(err)
    }
}
