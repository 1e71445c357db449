//! INI file configuration adapter.

use crate::domain::error::AlgotraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AlgotraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AlgotraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AlgotraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AlgotraderError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, AlgotraderError> {
        self.config
            .getfloat(section, key)
            .map_err(|reason| AlgotraderError::invalid(section, key, reason))
    }

    fn get_uint(&self, section: &str, key: &str) -> Result<Option<u64>, AlgotraderError> {
        self.config
            .getuint(section, key)
            .map_err(|reason| AlgotraderError::invalid(section, key, reason))
    }
}
