//! Builder configuration.

use crate::error::{SormError, SormResult};

/// Page size emitted as `LIMIT <offset>,<size>` when no explicit limit is set.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Defaults a [`StatementBuilder`](crate::StatementBuilder) returns to after
/// every reset.
///
/// Per-statement overrides (`prefix()`, `enable_audit()`) last for one
/// statement only; these values survive resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Prefix prepended to every table name.
    pub table_prefix: String,
    /// Implicit page size for SELECT without an explicit limit.
    pub default_page_size: u64,
    /// Whether statements are audited without calling `enable_audit()`.
    pub audit_by_default: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            audit_by_default: false,
        }
    }
}

impl BuilderConfig {
    /// Create a new configuration with defaults (no prefix, page size 100, no audit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table prefix.
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Set the implicit page size. Zero is treated as [`DEFAULT_PAGE_SIZE`].
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = if size == 0 { DEFAULT_PAGE_SIZE } else { size };
        self
    }

    /// Audit every statement.
    pub fn with_audit_by_default(mut self, enabled: bool) -> Self {
        self.audit_by_default = enabled;
        self
    }

    /// Read configuration from the environment.
    ///
    /// - `SORM_TABLE_PREFIX`: table prefix
    /// - `SORM_PAGE_SIZE`: implicit page size (positive integer)
    /// - `SORM_AUDIT`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> SormResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SormResult<Self> {
        let mut config = Self::default();

        if let Some(prefix) = lookup("SORM_TABLE_PREFIX") {
            config.table_prefix = prefix.trim().to_string();
        }

        if let Some(size) = lookup("SORM_PAGE_SIZE") {
            let size = size.trim();
            config.default_page_size = match size.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(SormError::validation(format!(
                        "SORM_PAGE_SIZE must be a positive integer, got '{size}'"
                    )));
                }
            };
        }

        if let Some(flag) = lookup("SORM_AUDIT") {
            config.audit_by_default = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(SormError::validation(format!(
                        "SORM_AUDIT must be a boolean, got '{other}'"
                    )));
                }
            };
        }

        Ok(config)
    }
}
