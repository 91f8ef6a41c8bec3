// Configuration loading

pub mod settings;

pub use settings::{
    CompareSettings, ConfigError, HttpSettings, LoadSettings, Settings, DEFAULT_CONCORDANCE_URL,
    DEFAULT_PORT,
};
