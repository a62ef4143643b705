//! Where tabnav looks for its user config and writes logs
//!
//! Lookup order for the config directory:
//! 1. `TABNAV_CONFIG_DIR`, used as-is (handy for editor integrations and tests)
//! 2. `%APPDATA%\tabnav` on Windows, `$XDG_CONFIG_HOME/tabnav` elsewhere
//! 3. `~/.config/tabnav`

use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "tabnav";
const CONFIG_DIR_ENV: &str = "TABNAV_CONFIG_DIR";

pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let platform = env::var_os("APPDATA");
    #[cfg(not(target_os = "windows"))]
    let platform = env::var_os("XDG_CONFIG_HOME");

    resolve_config_dir(
        env::var_os(CONFIG_DIR_ENV),
        platform,
        dirs::home_dir(),
    )
}

fn resolve_config_dir(
    explicit: Option<OsString>,
    platform: Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let non_empty = |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);

    non_empty(explicit).or_else(|| {
        non_empty(platform)
            .or_else(|| home.map(|h| h.join(".config")))
            .map(|base| base.join(APP_DIR))
    })
}

/// User config layered over the built-in contexts
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs dir if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "no config directory (HOME unset?)".to_string())?;
    create_dir(&logs)?;
    Ok(logs)
}

fn create_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = resolve_config_dir(
            Some("/tmp/tabnav-test".into()),
            Some("/xdg".into()),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(dir, Some(PathBuf::from("/tmp/tabnav-test")));
    }

    #[test]
    fn test_platform_dir_then_home() {
        let dir = resolve_config_dir(None, Some("/xdg".into()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, Some(PathBuf::from("/xdg/tabnav")));

        // Empty variables count as unset
        let dir = resolve_config_dir(Some("".into()), Some("".into()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, Some(PathBuf::from("/home/u/.config/tabnav")));

        assert_eq!(resolve_config_dir(None, None, None), None);
    }

    #[test]
    fn test_files_live_in_config_dir() {
        let Some(dir) = config_dir() else {
            return;
        };
        assert_eq!(config_file(), Some(dir.join("config.yaml")));
        assert_eq!(logs_dir(), Some(dir.join("logs")));
    }
}
