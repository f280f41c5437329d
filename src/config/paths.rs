use std::{
    env, fs,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};

const APP_NAME: &str = "reel";

/// Locations of Reel's files.
///
/// Configuration lives under the XDG config home; playlists and logs live
/// under `$HOME/.reel`.
pub struct ConfigPaths;

impl ConfigPaths {
    /// `$XDG_CONFIG_HOME/reel`, or `$HOME/.config/reel`.
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is set
    pub fn config_dir() -> Result<PathBuf, Error> {
        let base = match env::var_os("XDG_CONFIG_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => home()?.join(".config"),
        };
        Ok(base.join(APP_NAME))
    }

    /// Main configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined
    pub fn main_config() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// `$HOME/.reel`, created on demand.
    ///
    /// # Errors
    /// Returns an error if `HOME` is unset or the directory cannot be created
    pub fn app_data_dir() -> Result<PathBuf, Error> {
        ensure_dir(home()?.join(format!(".{APP_NAME}")))
    }

    /// Rolling log directory, created on demand.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created
    pub fn log_dir() -> Result<PathBuf, Error> {
        ensure_dir(Self::app_data_dir()?.join("logs"))
    }

    /// Default playlist file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be determined
    pub fn playlists_file() -> Result<PathBuf, Error> {
        Ok(Self::app_data_dir()?.join("playlists.json"))
    }
}

fn home() -> Result<PathBuf, Error> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, Error> {
    if !Path::new(&dir).exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
