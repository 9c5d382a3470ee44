use clap::{Parser, ValueEnum};
use pinhole_shortener::WriteMode;
use pinhole_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "PINHOLE_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "PINHOLE_REDIS_URL";
pub const WRITE_MODE_ENV: &str = "PINHOLE_WRITE_MODE";
pub const KEY_LENGTH_ENV: &str = "PINHOLE_KEY_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "PINHOLE_MAX_ATTEMPTS";
pub const MAX_EXTRA_LENGTH_ENV: &str = "PINHOLE_MAX_EXTRA_LENGTH";
pub const LIST_PAGE_SIZE_ENV: &str = "PINHOLE_LIST_PAGE_SIZE";
pub const CREATE_TIMEOUT_MS_ENV: &str = "PINHOLE_CREATE_TIMEOUT_MS";
pub const MAX_CUSTOM_KEY_LENGTH_ENV: &str = "PINHOLE_MAX_CUSTOM_KEY_LENGTH";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WriteModeArg {
    #[value(name = "best-effort")]
    BestEffort,
    #[value(name = "conditional")]
    Conditional,
}

impl From<WriteModeArg> for WriteMode {
    fn from(value: WriteModeArg) -> Self {
        match value {
            WriteModeArg::BestEffort => WriteMode::BestEffort,
            WriteModeArg::Conditional => WriteMode::Conditional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL prepended to short keys in responses.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = WRITE_MODE_ENV, value_enum, default_value_t = WriteModeArg::Conditional)]
    pub write_mode: WriteModeArg,

    #[arg(long, env = KEY_LENGTH_ENV, default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..))]
    pub key_length: u16,

    /// Candidates tried per key length before widening.
    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = 16)]
    pub max_attempts: usize,

    /// How many characters allocation may grow past `key_length`.
    #[arg(long, env = MAX_EXTRA_LENGTH_ENV, default_value_t = 2)]
    pub max_extra_length: usize,

    #[arg(long, env = LIST_PAGE_SIZE_ENV, default_value_t = 1000)]
    pub list_page_size: usize,

    #[arg(long, env = CREATE_TIMEOUT_MS_ENV, default_value_t = 5000)]
    pub create_timeout_ms: u64,

    #[arg(long, env = MAX_CUSTOM_KEY_LENGTH_ENV, default_value_t = 64)]
    pub max_custom_key_length: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
