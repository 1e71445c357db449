//! Configuration access port trait.

use crate::domain::error::AlgotraderError;

/// Typed lookups into sectioned configuration.
///
/// Numeric getters distinguish a missing key (`Ok(None)`) from a value that
/// does not parse (`Err(ConfigInvalid)`).
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, AlgotraderError>;
    fn get_uint(&self, section: &str, key: &str) -> Result<Option<u64>, AlgotraderError>;

    fn double_or(&self, section: &str, key: &str, default: f64) -> Result<f64, AlgotraderError> {
        Ok(self.get_double(section, key)?.unwrap_or(default))
    }

    fn uint_or(&self, section: &str, key: &str, default: u64) -> Result<u64, AlgotraderError> {
        Ok(self.get_uint(section, key)?.unwrap_or(default))
    }

    fn require_string(&self, section: &str, key: &str) -> Result<String, AlgotraderError> {
        self.get_string(section, key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AlgotraderError::missing(section, key))
    }
}
