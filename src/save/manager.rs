//! Save manager for handling save/load operations
//!
//! This module provides the SaveManager struct which handles:
//! - Resolving a `Location` against the configured roots
//! - Saving values to JSON files (write to temp, then rename)
//! - Loading values, falling back to a freshly persisted default
//! - Save file management (exists, remove, listing)

use super::codec::{Codec, JsonCodec};
use super::config::RootConfig;
use super::types::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct SaveManager<C: Codec = JsonCodec> {
    config: Option<RootConfig>,
    codec: C,
}

impl SaveManager<JsonCodec> {
    /// Creates an uninitialized SaveManager
    ///
    /// Only explicit-folder locations work until `init` is called.
    pub fn new() -> Self {
        SaveManager::with_codec(JsonCodec::default())
    }

    /// Creates a SaveManager with the given roots
    ///
    /// Both directories will be created if they don't exist.
    pub fn with_roots(
        save_root: impl AsRef<Path>,
        data_root: Option<impl AsRef<Path>>,
    ) -> Result<Self, SaveError> {
        let mut manager = SaveManager::new();
        manager.init(save_root, data_root)?;
        Ok(manager)
    }
}

impl Default for SaveManager<JsonCodec> {
    fn default() -> Self {
        SaveManager::new()
    }
}

impl<C: Codec> SaveManager<C> {
    pub fn with_codec(codec: C) -> Self {
        SaveManager {
            config: None,
            codec,
        }
    }

    /// Sets the root directories, creating them if needed
    ///
    /// Calling this again replaces the previous configuration.
    pub fn init(
        &mut self,
        save_root: impl AsRef<Path>,
        data_root: Option<impl AsRef<Path>>,
    ) -> Result<(), SaveError> {
        let config = RootConfig::init(save_root, data_root)?;
        log::info!(
            "Save system initialized (saves: {}, data: {})",
            config.save_root().display(),
            config
                .data_root()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        self.config = Some(config);
        Ok(())
    }

    pub fn set_config(&mut self, config: RootConfig) {
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&RootConfig> {
        self.config.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// Resolves the file a value of type `T` lives in for `location`
    pub fn resolve<T: ?Sized>(&self, location: &Location) -> Result<TargetLocation, SaveError> {
        let folder = self.resolve_folder(location)?;
        let filename = match location {
            Location::Bare => json_filename(short_type_name::<T>()),
            Location::Partitioned { name, .. } => json_filename(name),
            Location::Explicit { name, .. } => name.clone(),
        };
        Ok(TargetLocation::new(folder, filename))
    }

    fn resolve_folder(&self, location: &Location) -> Result<PathBuf, SaveError> {
        match location {
            Location::Bare => Ok(self.require_config()?.save_root().to_path_buf()),
            Location::Partitioned {
                is_game_data,
                subfolder,
                ..
            } => Ok(self
                .require_config()?
                .root(*is_game_data)?
                .join(relative_subfolder(subfolder))),
            Location::Explicit { folder, .. } => Ok(folder.clone()),
        }
    }

    fn require_config(&self) -> Result<&RootConfig, SaveError> {
        self.config.as_ref().ok_or(SaveError::NotInitialized)
    }

    /// Saves a value, returning whether it was written
    ///
    /// Failures are logged, never propagated.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T, location: &Location) -> bool {
        match self.try_save(value, location) {
            Ok(_) => true,
            Err(e) => {
                log::error!(
                    "Failed to save {} to {}: {}",
                    short_type_name::<T>(),
                    self.describe::<T>(location),
                    e
                );
                false
            }
        }
    }

    /// Saves a value and returns the path it was written to
    pub fn try_save<T: Serialize + ?Sized>(
        &self,
        value: &T,
        location: &Location,
    ) -> Result<PathBuf, SaveError> {
        let target = self.resolve::<T>(location)?;
        self.write_value(value, &target)?;

        log::info!(
            "Saved {} to: {}",
            short_type_name::<T>(),
            target.path().display()
        );

        Ok(target.path())
    }

    fn write_value<T: Serialize + ?Sized>(
        &self,
        value: &T,
        target: &TargetLocation,
    ) -> Result<(), SaveError> {
        let text = self.codec.encode(value)?;
        if text.is_empty() {
            return Err(SaveError::EmptySerialization);
        }

        target.ensure_folder()?;
        write_replacing(target, &text)?;
        Ok(())
    }

    /// Loads a value, or creates, saves and returns `T::default()`
    ///
    /// Returns `None` only when the location can't be resolved.
    pub fn load<T>(&self, location: &Location) -> Option<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.load_or_else(location, || Ok(T::default()))
    }

    /// Loads a value, or creates one with `factory`, saves and returns it
    ///
    /// A file that exists but can't be decoded is moved aside to
    /// `<name>.corrupt` (or the first free `<name>.corrupt.N`) before the fresh value replaces it. Returns `None`
    /// when the location can't be resolved or `factory` fails.
    pub fn load_or_else<T, F>(&self, location: &Location, factory: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, SaveError>,
    {
        let type_name = short_type_name::<T>();

        let target = match self.resolve::<T>(location) {
            Ok(target) => target,
            Err(e) => {
                log::error!("Failed to load {}: {}", type_name, e);
                return None;
            }
        };

        if let Err(e) = target.ensure_folder() {
            log::warn!(
                "Could not create folder {}: {}",
                target.folder.display(),
                e
            );
        }

        match self.read::<T>(&target) {
            Ok(value) => return Some(value),
            Err(SaveError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No saved {} at {}, creating default",
                    type_name,
                    target.path().display()
                );
            }
            Err(SaveError::IoError(e)) => {
                log::warn!(
                    "Failed to read {} from {}: {}. Creating default",
                    type_name,
                    target.path().display(),
                    e
                );
            }
            Err(e) => {
                log::warn!(
                    "Corrupted {} at {}: {}. Creating default",
                    type_name,
                    target.path().display(),
                    e
                );
                set_aside_corrupt(&target);
            }
        }

        let value = match factory() {
            Ok(value) => value,
            Err(e) => {
                log::error!(
                    "Failed to load {} from {}: {}",
                    type_name,
                    target.path().display(),
                    e
                );
                return None;
            }
        };

        match self.write_value(&value, &target) {
            Ok(()) => log::info!("Saved default {} to: {}", type_name, target.path().display()),
            Err(e) => log::error!(
                "Failed to save default {} to {}: {}",
                type_name,
                target.path().display(),
                e
            ),
        }

        Some(value)
    }

    /// Loads a value without any fallback
    pub fn try_load<T: DeserializeOwned>(&self, location: &Location) -> Result<T, SaveError> {
        let target = self.resolve::<T>(location)?;
        target.ensure_folder()?;
        self.read(&target)
    }

    fn read<T: DeserializeOwned>(&self, target: &TargetLocation) -> Result<T, SaveError> {
        let bytes = fs::read(target.path())?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SaveError::CorruptedData(format!("not valid UTF-8: {}", e)))?;
        self.codec.decode(&text)
    }

    /// Check if a save file exists for `T` at `location`
    pub fn exists<T: ?Sized>(&self, location: &Location) -> bool {
        self.resolve::<T>(location)
            .map(|target| target.path().is_file())
            .unwrap_or(false)
    }

    /// Delete the save file for `T` at `location`
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    pub fn remove<T: ?Sized>(&self, location: &Location) -> Result<bool, SaveError> {
        let path = self.resolve::<T>(location)?.path();
        if !path.is_file() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        log::info!("Removed save file: {}", path.display());
        Ok(true)
    }

    /// List the `.json` files in `<data root or save root>/<subfolder>`, sorted by name
    pub fn list_folder(
        &self,
        is_game_data: bool,
        subfolder: impl Into<PathBuf>,
    ) -> Result<Vec<String>, SaveError> {
        self.list(&Location::Partitioned {
            is_game_data,
            subfolder: subfolder.into(),
            name: String::new(),
        })
    }

    /// List the `.json` files in the folder `location` resolves to, sorted by name
    ///
    /// The name part of `location` is ignored.
    pub fn list(&self, location: &Location) -> Result<Vec<String>, SaveError> {
        let folder = self.resolve_folder(location)?;
        if !folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&folder)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && has_json_extension(&path) {
                if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
                    names.push(filename.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn describe<T: ?Sized>(&self, location: &Location) -> String {
        match self.resolve::<T>(location) {
            Ok(target) => target.path().display().to_string(),
            Err(_) => format!("{:?}", location),
        }
    }
}

/// Writes `<file>.tmp` and renames it over the target, so a failed write
/// leaves the previous file in place
fn write_replacing(target: &TargetLocation, text: &str) -> Result<(), SaveError> {
    let temp_path = target.temp_path();

    if let Err(e) = fs::write(&temp_path, text) {
        fs::remove_file(&temp_path).ok();
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&temp_path, target.path()) {
        fs::remove_file(&temp_path).ok();
        return Err(e.into());
    }

    Ok(())
}

fn set_aside_corrupt(target: &TargetLocation) {
    let corrupt_path = target.corrupt_path();
    match fs::rename(target.path(), &corrupt_path) {
        Ok(()) => log::warn!("Moved corrupted file to: {}", corrupt_path.display()),
        Err(e) => log::error!(
            "Failed to move corrupted file {}: {}",
            target.path().display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Config {
        volume: u32,
    }

    /// Codec that always produces empty output
    struct SilentCodec;

    impl Codec for SilentCodec {
        fn encode<T: Serialize + ?Sized>(&self, _value: &T) -> Result<String, SaveError> {
            Ok(String::new())
        }

        fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, SaveError> {
            JsonCodec::default().decode(text)
        }
    }

    fn manager_in(temp_dir: &TempDir) -> SaveManager {
        SaveManager::with_roots(
            temp_dir.path().join("saves"),
            Some(temp_dir.path().join("data")),
        )
        .expect("Failed to create SaveManager")
    }

    #[test]
    fn test_resolve_bare_uses_type_name() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        let target = manager.resolve::<Config>(&Location::bare()).unwrap();
        assert_eq!(target.folder, temp_dir.path().join("saves"));
        assert_eq!(target.filename, "Config.json");
    }

    #[test]
    fn test_resolve_partitioned() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        let save = manager
            .resolve::<Config>(&Location::save_data("settings", "audio"))
            .unwrap();
        assert_eq!(save.path(), temp_dir.path().join("saves/settings/audio.json"));

        let data = manager
            .resolve::<Config>(&Location::game_data("settings", "audio.json"))
            .unwrap();
        assert_eq!(data.path(), temp_dir.path().join("data/settings/audio.json"));
    }

    #[test]
    fn test_resolve_explicit_uses_name_verbatim() {
        let manager = SaveManager::new();
        let target = manager
            .resolve::<Config>(&Location::folder("/tmp/elsewhere", "config.dat"))
            .unwrap();
        assert_eq!(target.path(), PathBuf::from("/tmp/elsewhere/config.dat"));
    }

    #[test]
    fn test_uninitialized_rejects_rooted_locations() {
        let manager = SaveManager::new();
        assert!(!manager.is_initialized());

        let result = manager.try_save(&Config { volume: 1 }, &Location::bare());
        assert!(matches!(result, Err(SaveError::NotInitialized)));
        assert!(!manager.save(&Config { volume: 1 }, &Location::save_data("a", "b")));
        assert!(manager.load::<Config>(&Location::bare()).is_none());
    }

    #[test]
    fn test_explicit_location_works_uninitialized() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new();
        let location = Location::folder(temp_dir.path().join("nested"), "config.dat");

        assert!(manager.save(&Config { volume: 3 }, &location));
        assert_eq!(
            manager.load::<Config>(&location),
            Some(Config { volume: 3 })
        );
    }

    #[test]
    fn test_empty_serialization_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SaveManager::with_codec(SilentCodec);
        manager
            .init(temp_dir.path().join("saves"), None::<&Path>)
            .unwrap();
        let location = Location::save_data("settings", "audio");

        let result = manager.try_save(&Config { volume: 5 }, &location);
        assert!(matches!(result, Err(SaveError::EmptySerialization)));
        assert!(!manager.save(&Config { volume: 5 }, &location));
        assert!(!manager.exists::<Config>(&location));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "audio");

        manager.try_save(&Config { volume: 5 }, &location).unwrap();

        let target = manager.resolve::<Config>(&location).unwrap();
        assert!(target.path().exists());
        assert!(!target.temp_path().exists());
    }

    #[test]
    fn test_failed_factory_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "audio");

        let loaded: Option<Config> = manager.load_or_else(&location, || {
            Err(SaveError::ConstructionFailure("no default".to_string()))
        });

        assert!(loaded.is_none());
        assert!(!manager.exists::<Config>(&location));
    }

    #[test]
    fn test_corrupt_file_is_set_aside() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "audio");
        let target = manager.resolve::<Config>(&location).unwrap();
        target.ensure_folder().unwrap();
        fs::write(target.path(), "{not json").unwrap();

        let loaded = manager.load::<Config>(&location);

        assert_eq!(loaded, Some(Config::default()));
        assert_eq!(
            fs::read_to_string(target.corrupt_path()).unwrap(),
            "{not json"
        );
        assert_eq!(
            fs::read_to_string(target.path()).unwrap(),
            r#"{"volume":0}"#
        );
    }

    #[test]
    fn test_invalid_utf8_file_is_set_aside() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "audio");
        let target = manager.resolve::<Config>(&location).unwrap();
        target.ensure_folder().unwrap();
        let original = [0xff, 0xfe, b'{'];
        fs::write(target.path(), original).unwrap();
        let backup = target.corrupt_path();

        let loaded = manager.load::<Config>(&location);

        assert_eq!(loaded, Some(Config::default()));
        assert_eq!(fs::read(&backup).unwrap(), original);
        assert_eq!(
            fs::read_to_string(target.path()).unwrap(),
            r#"{"volume":0}"#
        );
        let backup_name = backup.file_name().unwrap().to_string_lossy().to_string();
        let result = manager.try_load::<Config>(&Location::folder(&target.folder, backup_name));
        assert!(matches!(result, Err(SaveError::CorruptedData(_))));
    }

    #[test]
    fn test_repeated_corruption_keeps_every_backup() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "audio");
        let target = manager.resolve::<Config>(&location).unwrap();
        target.ensure_folder().unwrap();

        fs::write(target.path(), "first").unwrap();
        manager.load::<Config>(&location);
        fs::write(target.path(), "second").unwrap();
        manager.load::<Config>(&location);

        let first = target.folder.join("audio.json.corrupt");
        let second = target.folder.join("audio.json.corrupt.1");
        assert_eq!(fs::read_to_string(first).unwrap(), "first");
        assert_eq!(fs::read_to_string(second).unwrap(), "second");
    }

    #[test]
    fn test_absolute_subfolder_stays_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        let path = manager
            .try_save(&Config { volume: 1 }, &Location::save_data(elsewhere.path(), "audio"))
            .unwrap();

        assert!(path.starts_with(temp_dir.path().join("saves")));
        assert!(!elsewhere.path().join("audio.json").exists());

        let escaped = manager
            .resolve::<Config>(&Location::game_data("../../up", "audio"))
            .unwrap();
        assert_eq!(escaped.path(), temp_dir.path().join("data/up/audio.json"));
    }

    #[test]
    fn test_pretty_codec_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SaveManager::with_codec(JsonCodec::pretty());
        manager.init(temp_dir.path(), None::<&Path>).unwrap();
        let location = Location::save_data("settings", "audio");

        assert!(manager.save(&Config { volume: 5 }, &location));

        let text = fs::read_to_string(temp_dir.path().join("settings/audio.json")).unwrap();
        assert_eq!(text, "{\n  \"volume\": 5\n}");
        assert_eq!(manager.load::<Config>(&location), Some(Config { volume: 5 }));
    }

    #[test]
    fn test_try_load_does_not_fall_back() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let location = Location::save_data("settings", "missing");

        let result = manager.try_load::<Config>(&location);
        assert!(matches!(result, Err(SaveError::IoError(ref e)) if e.kind() == io::ErrorKind::NotFound));
        assert!(!manager.exists::<Config>(&location));
    }

    #[test]
    fn test_remove_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        assert!(manager.save(&Config { volume: 1 }, &Location::save_data("slots", "b")));
        assert!(manager.save(&Config { volume: 2 }, &Location::save_data("slots", "a")));
        fs::write(temp_dir.path().join("saves/slots/notes.txt"), "ignored").unwrap();

        assert!(manager.save(&Config { volume: 3 }, &Location::save_data("slots", "c.JSON")));

        let names = manager.list_folder(false, "slots").unwrap();
        assert_eq!(
            names,
            vec!["a.json".to_string(), "b.json".to_string(), "c.JSON".to_string()]
        );

        assert!(manager.remove::<Config>(&Location::save_data("slots", "a")).unwrap());
        assert!(!manager.remove::<Config>(&Location::save_data("slots", "a")).unwrap());
        assert_eq!(
            manager.list_folder(false, "slots").unwrap(),
            vec!["b.json".to_string(), "c.JSON".to_string()]
        );
    }

    #[test]
    fn test_list_missing_folder_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        assert!(manager.list_folder(true, "nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_reinit_last_call_wins() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager_in(&temp_dir);
        let second = temp_dir.path().join("second");
        manager.init(&second, None::<&Path>).unwrap();

        assert_eq!(manager.config().unwrap().save_root(), second.as_path());
        assert!(manager.config().unwrap().data_root().is_none());
    }
}
