//! Pagination configuration.

use serde::Deserialize;

use crate::validate::is_valid_sql_identifier;

/// Errors from loading or validating a [`PaginationConfig`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The TOML could not be parsed.
    #[error("invalid pagination config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A page size of zero was configured.
    #[error("{0} must be at least 1")]
    ZeroPageSize(&'static str),
    /// The default page size is above the maximum.
    #[error("default_page_size ({default}) exceeds max_page_size ({max})")]
    DefaultExceedsMax {
        /// Configured default.
        default: u64,
        /// Configured maximum.
        max: u64,
    },
    /// The identity column is not a valid SQL identifier.
    #[error("invalid identity_column '{0}'")]
    InvalidIdentity(String),
}

/// Settings applied at the transport boundary.
///
/// Every field has a default, so an empty TOML document is valid:
///
/// ```
/// use cursor_page::PaginationConfig;
///
/// let config = PaginationConfig::from_toml_str("max_page_size = 50").unwrap();
/// assert_eq!(config.default_page_size, 20);
/// assert_eq!(config.max_page_size, 50);
/// assert_eq!(config.identity_column, "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size when the client does not ask for one.
    pub default_page_size: u64,
    /// Larger client page sizes are clamped to this.
    pub max_page_size: u64,
    /// Unique column appended to every order as a tie-breaker.
    pub identity_column: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            identity_column: "id".to_string(),
        }
    }
}

impl PaginationConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize("default_page_size"));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::ZeroPageSize("max_page_size"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::DefaultExceedsMax {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        if !is_valid_sql_identifier(&self.identity_column) {
            return Err(ConfigError::InvalidIdentity(self.identity_column.clone()));
        }
        Ok(())
    }
}
