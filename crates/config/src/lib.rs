//! Persisted user settings.
//!
//! Settings are loaded once at startup and passed down explicitly; no
//! module reads them ambiently. Stored as JSON under the platform config
//! directory (`~/.config/fincore/settings.json` on Linux).

mod settings;
mod theme;

pub use settings::{settings_file_path, ConfigError, Settings};
pub use theme::ThemePreference;
