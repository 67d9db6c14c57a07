use anyhow::{Context, bail};
use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 5000);
const DEFAULT_FEED_LIMIT: u32 = 10;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub feed_limit: u32,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = parse_or(&lookup, "HOOKFEED_BIND_ADDR", || SocketAddr::from(DEFAULT_BIND_ADDR))?;
        let feed_limit = parse_or(&lookup, "HOOKFEED_FEED_LIMIT", || DEFAULT_FEED_LIMIT)?;
        if feed_limit == 0 {
            bail!("HOOKFEED_FEED_LIMIT must be positive");
        }
        let max_body_bytes =
            parse_or(&lookup, "HOOKFEED_MAX_BODY_BYTES", || DEFAULT_MAX_BODY_BYTES)?;

        let backend = lookup("HOOKFEED_STORE").unwrap_or_else(|| "postgres".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "postgres" => {
                let database_url = lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .context("DATABASE_URL not set")?;
                let max_connections = parse_or(&lookup, "HOOKFEED_DB_MAX_CONNECTIONS", || {
                    DEFAULT_DB_MAX_CONNECTIONS
                })?;
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StoreBackend::Memory,
            other => bail!("unknown HOOKFEED_STORE {other:?}, expected postgres or memory"),
        };

        Ok(Self {
            bind_addr,
            store,
            feed_limit,
            max_body_bytes,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: impl FnOnce() -> T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        _ => Ok(default()),
    }
}
