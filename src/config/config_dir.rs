use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Overrides every other lookup when set.
pub const CONFIG_PATH_ENV: &str = "LERNLY_CONFIG";

const CONFIG_FILE: &str = "config.toml";

/// `$HOME/.config/lernly/config.toml` on unix, `%APPDATA%\lernly\config.toml` on windows.
fn user_config_file() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|dir| dir.join(crate::APPLICATION_NAME).join(CONFIG_FILE))
}

/// Resolves the configuration path. Debug builds read `./config.toml`,
/// release builds prefer the per-user file and fall back to the working directory.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    let local = Path::new(".").join(CONFIG_FILE);
    if use_local {
        return local;
    }

    user_config_file()
        .filter(|path| path.exists())
        .unwrap_or(local)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let path = find_config_file(use_local);
    tracing::trace!("looking for config at: {}", path.display());

    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path));
    }

    let path = path.canonicalize()?;
    debug!("using {} as configuration file", path.display());
    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod test {
    use std::{env, fs};

    use super::*;

    #[test]
    fn user_config_file_test() {
        if let Some(path) = user_config_file() {
            assert!(path.ends_with(Path::new(crate::APPLICATION_NAME).join(CONFIG_FILE)));
        }
    }

    // One test mutates the environment so lookups never race each other.
    #[test]
    fn config_lookup_test() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("custom.toml");
        fs::write(&file_path, b"foo = 'bar'").unwrap();

        unsafe {
            env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(find_config_file(true), Path::new(".").join(CONFIG_FILE));

        unsafe {
            env::set_var(CONFIG_PATH_ENV, &file_path);
        }
        assert_eq!(find_config_file(false), file_path);
        assert_eq!(read_config(true).unwrap(), b"foo = 'bar'");

        unsafe {
            env::set_var(CONFIG_PATH_ENV, temp_dir.path().join("absent.toml"));
        }
        assert!(matches!(
            read_config(false),
            Err(ConfigError::ConfigNotFound(_))
        ));

        unsafe {
            env::remove_var(CONFIG_PATH_ENV);
        }
    }
}
