//! Settings parser for .vista-grande/config.toml

use std::path::Path;

use super::types::Settings;
use vista_core::prelude::*;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const CONFIG_DIR: &str = ".vista-grande";

/// Load settings from `<base>/.vista-grande/config.toml`
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(base_path: &Path) -> Settings {
    let config_path = base_path.join(CONFIG_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create a commented default config file in `.vista-grande/`
pub fn init_config_dir(base_path: &Path) -> Result<()> {
    let config_dir = base_path.join(CONFIG_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .map_err(|e| Error::config(format!("Failed to create {} dir: {}", CONFIG_DIR, e)))?;
    }

    let config_path = config_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Vista Grande loader configuration

[transition]
# How long show_loader keeps the transition overlay up (0 = until hidden)
duration_ms = 1500
# Wait after hiding before another show_loader is accepted
settle_ms = 300

[full_screen]
duration_ms = 4500

[operation]
# Minimum visible time for show_loader_for_operation
min_duration_ms = 1200

[navigation]
debounce_ms = 2000
loader_duration_ms = 1500

[session]
storage_key = "vista-grande-loaded"
splash_duration_ms = 4500
"#;
        std::fs::write(&config_path, default_content)?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(load_settings(dir.path()), Settings::default());
    }

    #[test]
    fn test_init_writes_parseable_defaults() {
        let dir = tempdir().unwrap();
        init_config_dir(dir.path()).unwrap();

        let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILENAME);
        assert!(path.exists());
        assert_eq!(load_settings(dir.path()), Settings::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(CONFIG_FILENAME),
            "[navigation]\ndebounce_ms = 500\n",
        )
        .unwrap();

        init_config_dir(dir.path()).unwrap();
        assert_eq!(load_settings(dir.path()).navigation.debounce_ms, 500);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILENAME), "[transition\nsettle_ms =").unwrap();

        assert_eq!(load_settings(dir.path()), Settings::default());
    }
}
