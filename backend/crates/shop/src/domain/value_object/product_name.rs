use std::fmt;

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;

pub const MAX_PRODUCT_NAME_CHARS: usize = 255;

/// Display name of a product, trimmed, 1..=255 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductName(String);

impl ProductName {
    pub fn new(input: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = input.as_ref().trim();
        let len = trimmed.chars().count();
        if len == 0 || len > MAX_PRODUCT_NAME_CHARS {
            return Err(AppError::bad_request(format!(
                "Product name must be 1-{MAX_PRODUCT_NAME_CHARS} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_limits() {
        assert_eq!(ProductName::new("  Tea  ").unwrap().as_str(), "Tea");
        assert!(ProductName::new("   ").is_err());
        assert!(ProductName::new("x".repeat(256)).is_err());
        assert!(ProductName::new("茶".repeat(255)).is_ok());
    }
}
