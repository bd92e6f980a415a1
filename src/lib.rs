//! savelib: persist serde values as JSON files and load them back,
//! falling back to a saved default when nothing usable is on disk.

pub mod save;

pub use save::{
    Codec, JsonCodec, Location, RootConfig, SaveError, SaveManager, Saveable, TargetLocation,
};
