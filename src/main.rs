//! Small demo of the save system
//!
//! Usage: `savelib-demo [SAVE_ROOT [DATA_ROOT]]`
//!
//! Without arguments the platform data directory is used. Run it twice to see
//! the launch counter survive between runs; `RUST_LOG=info` shows what happens.

use savelib::{Location, RootConfig, SaveManager, Saveable};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

const APP_NAME: &str = "savelib-demo";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Settings {
    volume: u32,
    fullscreen: bool,
    launch_count: u64,
}

impl Saveable for Settings {}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.as_slice() {
        [] => RootConfig::for_app(APP_NAME),
        [save_root] => RootConfig::init(save_root, None::<&str>),
        [save_root, data_root, ..] => RootConfig::init(save_root, Some(data_root)),
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to initialize save system: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut save_manager = SaveManager::new();
    save_manager.set_config(config);

    let location = Location::save_data("settings", "settings");
    let Some(mut settings) = Settings::load_from(&save_manager, &location) else {
        log::error!("Could not load settings");
        return ExitCode::FAILURE;
    };

    settings.launch_count += 1;
    println!("Loaded settings: {:?}", settings);

    if !settings.save_to(&save_manager, &location) {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
