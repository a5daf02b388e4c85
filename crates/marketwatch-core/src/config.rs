//! 애플리케이션 설정.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::types::duration::CandleDuration;

/// 애플리케이션 전체 설정.
///
/// 설정 파일을 읽은 뒤 `MARKETWATCH__` 접두사의 환경 변수로
/// 덮어씁니다 (예: `MARKETWATCH__REDIS__URL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Redis 설정
    #[serde(default)]
    pub redis: RedisConfig,
    /// 수집기 동작 설정
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 수집 대상 소스 목록
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
}

/// Redis 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// 접속 URL
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// 수집기 동작 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// 데몬 반복 주기 (초)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// HTTP 요청 타임아웃 (초)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 출력 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// 수집 소스 하나의 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// 소스 종류 (binance-trades, binance-klines)
    pub exchange: String,
    /// 거래 심볼 (예: LSKBTC)
    pub symbol: String,
    /// 집계 기간 목록
    #[serde(default = "default_durations")]
    pub durations: Vec<CandleDuration>,
    /// 페이지 중복 판정 정책 (full, first_last, min_max)
    #[serde(default = "default_policy")]
    pub policy: String,
    /// API 베이스 URL 오버라이드
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_durations() -> Vec<CandleDuration> {
    CandleDuration::all().to_vec()
}

fn default_policy() -> String {
    "min_max".to_string()
}

impl AppConfig {
    /// 설정 파일과 환경 변수에서 설정을 읽습니다.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("watcher.interval_secs", 60_i64)?
            .set_default("watcher.http_timeout_secs", 30_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("MARKETWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// 기본 경로(config/default.toml)에서 설정을 읽습니다.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new("config/default.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    // 환경 변수를 만지는 테스트와 load 호출이 겹치지 않게 직렬화
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_full_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_temp(
            "marketwatch-config-full.toml",
            r#"
[redis]
url = "redis://cache:6379"

[watcher]
interval_secs = 120
http_timeout_secs = 10

[logging]
level = "debug"
format = "json"

[[sources]]
exchange = "binance-trades"
symbol = "LSKBTC"
durations = ["minute", "hour"]
policy = "full"
"#,
        );
        let config = AppConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.watcher.interval_secs, 120);
        assert_eq!(config.watcher.http_timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");

        assert_eq!(config.sources.len(), 1);
        let source = &config.sources[0];
        assert_eq!(source.exchange, "binance-trades");
        assert_eq!(source.symbol, "LSKBTC");
        assert_eq!(
            source.durations,
            vec![CandleDuration::Minute, CandleDuration::Hour]
        );
        assert_eq!(source.policy, "full");
        assert!(source.base_url.is_none());
    }

    #[test]
    fn source_defaults_apply_to_minimal_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_temp(
            "marketwatch-config-minimal.toml",
            r#"
[[sources]]
exchange = "binance-klines"
symbol = "LSKBTC"
"#,
        );
        let config = AppConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.watcher.interval_secs, 60);
        assert_eq!(config.logging.level, "info");

        let source = &config.sources[0];
        assert_eq!(source.durations, CandleDuration::all().to_vec());
        assert_eq!(source.policy, "min_max");
    }

    #[test]
    fn environment_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_temp(
            "marketwatch-config-env.toml",
            "[[sources]]\nexchange = \"binance-trades\"\nsymbol = \"LSKBTC\"\n",
        );
        std::env::set_var("MARKETWATCH__WATCHER__INTERVAL_SECS", "15");
        let config = AppConfig::load(&path);
        std::env::remove_var("MARKETWATCH__WATCHER__INTERVAL_SECS");
        fs::remove_file(&path).ok();

        assert_eq!(config.unwrap().watcher.interval_secs, 15);
    }

    #[test]
    fn missing_file_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let result = AppConfig::load(Path::new("/nonexistent/marketwatch.toml"));
        assert!(result.is_err());
    }
}
