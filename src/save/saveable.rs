//! Saveable trait for values that can be saved/loaded
//!
//! Implementing this trait is optional. It only adds method-call sugar that
//! forwards to the `SaveManager`; calling the manager directly behaves the same.

use super::codec::Codec;
use super::manager::SaveManager;
use super::types::Location;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Trait for values that can save and load themselves through a SaveManager
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize)]
/// struct AudioSettings { volume: u32 }
///
/// impl Saveable for AudioSettings {}
///
/// let settings = AudioSettings::load_partitioned(&manager, false, "settings", "audio")?;
/// settings.save_partitioned(&manager, false, "settings", "audio");
/// ```
pub trait Saveable: Serialize + DeserializeOwned + Default {
    fn save_to<C: Codec>(&self, manager: &SaveManager<C>, location: &Location) -> bool {
        manager.save(self, location)
    }

    fn load_from<C: Codec>(manager: &SaveManager<C>, location: &Location) -> Option<Self> {
        manager.load(location)
    }

    /// Save under `<data root or save root>/<subfolder>/<name>.json`
    fn save_partitioned<C: Codec>(
        &self,
        manager: &SaveManager<C>,
        is_game_data: bool,
        subfolder: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> bool {
        self.save_to(manager, &partitioned(is_game_data, subfolder, name))
    }

    fn load_partitioned<C: Codec>(
        manager: &SaveManager<C>,
        is_game_data: bool,
        subfolder: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Option<Self> {
        Self::load_from(manager, &partitioned(is_game_data, subfolder, name))
    }
}

fn partitioned(is_game_data: bool, subfolder: impl Into<PathBuf>, name: impl Into<String>) -> Location {
    Location::Partitioned {
        is_game_data,
        subfolder: subfolder.into(),
        name: name.into(),
    }
}
