use std::path::PathBuf;

use probe_table_lib::OverflowPolicy;

use crate::error::{AttendanceError, Result};

// --- Service Configuration ---
pub const DEFAULT_TABLE_CAPACITY: usize = 20;
pub const DEFAULT_DB_PATH: &str = "database.json";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7077";

pub const ENV_LISTEN_ADDR: &str = "ATTENDANCE_ADDR";
pub const ENV_TABLE_CAPACITY: &str = "ATTENDANCE_TABLE_CAPACITY";
pub const ENV_DB_PATH: &str = "ATTENDANCE_DB_PATH";
pub const ENV_STRICT_CAPACITY: &str = "ATTENDANCE_STRICT_CAPACITY";

// Skipped-row and eviction warnings per batch before the rest are suppressed.
pub const MAX_LOGGED_SKIPS: usize = 10;

// Report cells are cut to these widths.
pub const REPORT_NAME_WIDTH: usize = 30;
pub const REPORT_DEPARTMENT_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_addr: String,
    pub table_capacity: usize,
    pub db_path: PathBuf,
    pub strict_capacity: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            table_capacity: DEFAULT_TABLE_CAPACITY,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            strict_capacity: false,
        }
    }
}

impl ServiceConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TABLE_CAPACITY) {
            config.table_capacity = raw.trim().parse().map_err(|_| {
                AttendanceError::Config(format!("{} must be a positive integer, got '{}'", ENV_TABLE_CAPACITY, raw))
            })?;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(ENV_STRICT_CAPACITY) {
            config.strict_capacity = parse_flag(&raw).ok_or_else(|| {
                AttendanceError::Config(format!("{} must be true or false, got '{}'", ENV_STRICT_CAPACITY, raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_capacity == 0 {
            return Err(AttendanceError::Config("table capacity must be greater than 0".to_string()));
        }
        if self.listen_addr.is_empty() {
            return Err(AttendanceError::Config("listen address must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        if self.strict_capacity {
            OverflowPolicy::Strict
        } else {
            OverflowPolicy::OverwriteHome
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
