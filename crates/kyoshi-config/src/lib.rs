use std::env;

use serde::{Deserialize, Serialize};

use self::storage::StorageConfig;
use self::tutor::TutorConfig;

pub mod storage;
pub mod tutor;

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    pub tutor: TutorConfig,
    pub storage: StorageConfig,

    /// app_to_ui channel capacity (streamed pattern bursts)
    pub app_channel_capacity: usize,
    /// ui_to_app channel capacity
    pub ui_channel_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let app_channel_capacity = env::var("APP_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let ui_channel_capacity = env::var("UI_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);

        Config {
            tutor: TutorConfig::new(),
            storage: StorageConfig::new(),

            app_channel_capacity,
            ui_channel_capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
