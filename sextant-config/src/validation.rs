// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Validation rules shared by configuration types
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty or blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of<T: PartialEq + std::fmt::Debug>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of {:?}, got {:?}",
                field, allowed, value
            )));
        }
        Ok(())
    }

    /// Validate port number
    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid port number",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
        assert!(ConfigValidator::not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_one_of_validation() {
        let allowed = ["http", "https"];
        assert!(ConfigValidator::one_of(&"https", &allowed, "scheme").is_ok());

        let err = ConfigValidator::one_of(&"ftp", &allowed, "scheme").unwrap_err();
        assert!(err.to_string().contains("scheme"));
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_port_validation() {
        assert!(ConfigValidator::is_port(8500, "port").is_ok());
        assert!(ConfigValidator::is_port(0, "port").is_err());
    }
}
