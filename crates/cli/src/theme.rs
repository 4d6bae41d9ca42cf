use fincore_config::{settings_file_path, Settings, ThemePreference};

use crate::CliError;

/// Show the persisted theme, or set it when an argument is given.
pub fn cmd_theme(theme: Option<String>) -> Result<(), CliError> {
    let path = settings_file_path()
        .ok_or_else(|| CliError::error("no config directory on this platform"))?;
    let mut settings = Settings::load_from(&path).map_err(|e| CliError::error(e.to_string()))?;

    match theme {
        None => {
            println!("{}", settings.theme.as_str());
        }
        Some(raw) => {
            let parsed: ThemePreference = raw.parse().map_err(CliError::usage)?;
            settings.theme = parsed;
            settings
                .save_to(&path)
                .map_err(|e| CliError::error(e.to_string()))?;
            println!("Theme set to {}", parsed.as_str());
        }
    }
    Ok(())
}
