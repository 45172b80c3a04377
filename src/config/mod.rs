//! Configuration loaded from `.lpvault.toml`.

pub mod settings;

pub use settings::Settings;
