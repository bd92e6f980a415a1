//! Save/Load system
//!
//! This module persists arbitrary serde values as JSON files:
//! - Two configurable roots ("save data" and optional "game data")
//! - One `Location` descriptor for every call shape (bare, partitioned, explicit folder)
//! - Loads never fail on a missing or corrupted file; a default is created and saved instead
//! - Optional `Saveable` trait for method-call sugar
//!
//! # Architecture
//!
//! - `config`: RootConfig, the base directories
//! - `codec`: Codec trait and the serde_json backed JsonCodec
//! - `types`: Location descriptors and error types
//! - `manager`: SaveManager for file operations
//! - `saveable`: Saveable trait for values
//!
//! # Example Usage
//!
//! ```ignore
//! let mut save_manager = SaveManager::new();
//! save_manager.init("/tmp/s", Some("/tmp/d"))?;
//!
//! save_manager.save(&Config { volume: 5 }, &Location::save_data("settings", "audio"));
//!
//! // Config { volume: 5 }, or Config::default() (and a freshly written file) if missing
//! let config: Option<Config> = save_manager.load(&Location::save_data("settings", "audio"));
//! ```

pub mod codec;
pub mod config;
pub mod manager;
pub mod saveable;
pub mod types;

// Re-export commonly used types
pub use codec::{Codec, JsonCodec};
pub use config::RootConfig;
pub use manager::SaveManager;
pub use saveable::Saveable;
pub use types::*;
