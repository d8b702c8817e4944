//! Process settings for nestread.
//!
//! Settings are read once at startup from a dotenv-style file (plus the
//! process environment) and then passed by reference to everything that
//! needs them.

pub mod loader;
pub mod schema;

pub use {
    loader::{load_settings, load_settings_with},
    schema::{ConfigError, Settings},
};
