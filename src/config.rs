use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_POSTGRES_URI: &str =
    "postgresql://postgres@localhost:5432/postgres?sslmode=disable";

/// Process configuration, read once from the environment at startup.
///
/// Every field has a default so the service starts with an empty environment.
/// Zero-valued request/server timeouts disable the corresponding limit.
#[derive(Debug, Clone)]
pub struct Config {
    pub instance_id: String,
    pub bind_host: String,
    pub port: u16,
    pub ping_path: String,
    pub ping_response: String,
    pub req_timeout: Duration,
    pub server_read_timeout: Duration,
    pub server_write_timeout: Duration,
    pub db_conn_max_lifetime: Duration,
    /// 0 falls back to `store::DEFAULT_MAX_OPEN`.
    pub db_max_open: u32,
    /// Warm-connection floor. 0 keeps none warm.
    pub db_max_idle: u32,
    pub postgres_uri: String,
    pub users_path_prefix: String,
    pub users_select_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let instance_id = lookup("INSTANCE_ID")
            .unwrap_or_else(|| format!("app-{}", uuid::Uuid::new_v4()));

        let bind_host = lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = parse_var("PORT", 9090_u16, "a port number")?;
        if port == 0 {
            return Err(ConfigError::invalid("PORT", "0", "a port number"));
        }

        let ping_path = lookup("PING_PATH").unwrap_or_else(|| "/ping".to_string());
        let ping_response = lookup("PING_RESPONSE").unwrap_or_else(|| "PONG".to_string());

        let req_timeout = duration_var("REQ_TIMEOUT", Duration::from_millis(500))?;
        let server_read_timeout = duration_var("SERVER_READ_TIMEOUT", Duration::from_millis(1000))?;
        let server_write_timeout =
            duration_var("SERVER_WRITE_TIMEOUT", Duration::from_millis(2000))?;

        let db_conn_max_lifetime = duration_var("DB_CONN_MAX_LIFETIME", Duration::ZERO)?;
        let db_max_open = parse_var("DB_MAX_OPEN", 0_u32, "a non-negative integer")?;
        let db_max_idle = parse_var("DB_MAX_IDLE", 2_u32, "a non-negative integer")?;

        let postgres_uri = lookup("POSTGRES_URI")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_POSTGRES_URI.to_string());

        let users_path_prefix = lookup("USERS_PATH").unwrap_or_else(|| "users".to_string());
        let users_select_limit =
            parse_var("USERS_SELECT_LIMIT", 10_u32, "a non-negative integer")?;

        Ok(Config {
            instance_id,
            bind_host,
            port,
            ping_path,
            ping_response,
            req_timeout,
            server_read_timeout,
            server_write_timeout,
            db_conn_max_lifetime,
            db_max_open,
            db_max_idle,
            postgres_uri,
            users_path_prefix,
            users_select_limit,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instance_id: "app-default".to_string(),
            bind_host: "0.0.0.0".to_string(),
            port: 9090,
            ping_path: "/ping".to_string(),
            ping_response: "PONG".to_string(),
            req_timeout: Duration::from_millis(500),
            server_read_timeout: Duration::from_millis(1000),
            server_write_timeout: Duration::from_millis(2000),
            db_conn_max_lifetime: Duration::ZERO,
            db_max_open: 0,
            db_max_idle: 2,
            postgres_uri: DEFAULT_POSTGRES_URI.to_string(),
            users_path_prefix: "users".to_string(),
            users_select_limit: 10,
        }
    }
}

// Blank values count as unset.
fn lookup(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(var: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::invalid(var, &raw, expected)),
        None => Ok(default),
    }
}

fn duration_var(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match lookup(var) {
        Some(raw) => parse_duration(&raw)
            .ok_or_else(|| ConfigError::invalid(var, &raw, "a duration such as 500ms, 2s or 1m30s")),
        None => Ok(default),
    }
}

/// Parses durations written as `<decimal><unit>` sequences (`300ms`, `1.5s`, `1h30m`).
///
/// Units are `ns`, `us`/`µs`, `ms`, `s`, `m` and `h`. A bare `0` is accepted
/// without a unit. Negative values are rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() {
        return None;
    }

    let mut rest = s;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let scale = unit_nanos(unit)?;

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut nanos = whole.checked_mul(scale)?;
        if !frac.is_empty() {
            let digits: u128 = frac.parse().ok()?;
            let denom = 10_u128.checked_pow(u32::try_from(frac.len()).ok()?)?;
            nanos = nanos.checked_add(digits.checked_mul(scale)? / denom)?;
        }
        total = total.checked_add(nanos)?;
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000).ok()?;
    let subsec = u32::try_from(total % 1_000_000_000).ok()?;
    Some(Duration::new(secs, subsec))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}
