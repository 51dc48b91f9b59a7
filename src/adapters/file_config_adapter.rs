//! INI file configuration adapter.

use crate::domain::error::SignalbookError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// Read and parse an INI file. A missing or unreadable file is an I/O
    /// error, malformed content is a config parse error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SignalbookError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(content).map_err(|reason| SignalbookError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        Self::parse(content.to_string())
    }

    fn parse(content: String) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content)?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}
