use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::crm::{CrmSettings, GroupingMode};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Supabase,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "supabase" | "rest" => Ok(StoreBackend::Supabase),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub address_prefix: Option<String>,
    pub grouping: GroupingMode,
    pub join_group_name: bool,
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构造，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_backend = match get("STORE_BACKEND") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "STORE_BACKEND",
                value: v,
            })?,
            None => StoreBackend::Postgres,
        };

        let grouping = match get("MEMBER_GROUPING").as_deref().map(str::trim) {
            None | Some("group_ref") => GroupingMode::GroupRef,
            Some("affiliation") => GroupingMode::Affiliation,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "MEMBER_GROUPING",
                    value: other.to_string(),
                });
            }
        };

        let config = Config {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: get("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_uri: get("API_BASE_URI").unwrap_or_else(|| "/api".into()),
            store_backend,
            database_url: get("DATABASE_URL"),
            run_migrations: get("RUN_MIGRATIONS")
                .map(|v| parse_bool("RUN_MIGRATIONS", &v))
                .transpose()?
                .unwrap_or(false),
            supabase_url: get("SUPABASE_URL"),
            supabase_key: get("SUPABASE_KEY"),
            redis_url: get("REDIS_URL"),
            rate_limit_window_secs: get("RATE_LIMIT_WINDOW")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            rate_limit_requests: get("RATE_LIMIT_REQUESTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            address_prefix: get("ADDRESS_PREFIX").map(|v| v.trim().to_string()),
            grouping,
            join_group_name: get("JOIN_GROUP_NAME")
                .map(|v| parse_bool("JOIN_GROUP_NAME", &v))
                .transpose()?
                .unwrap_or(true),
        };

        // 后端所需的连接信息必须齐全
        let missing = match store_backend {
            StoreBackend::Postgres if config.database_url.is_none() => Some("DATABASE_URL"),
            StoreBackend::Supabase if config.supabase_url.is_none() => Some("SUPABASE_URL"),
            StoreBackend::Supabase if config.supabase_key.is_none() => Some("SUPABASE_KEY"),
            _ => None,
        };
        match missing {
            Some(key) => Err(ConfigError::Missing(key)),
            None => Ok(config),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn crm_settings(&self) -> CrmSettings {
        CrmSettings {
            grouping: self.grouping,
            join_group_name: self.join_group_name,
            address_prefix: self.address_prefix.clone(),
        }
    }
}
