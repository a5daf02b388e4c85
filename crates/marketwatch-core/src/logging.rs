//! 로깅 초기화.

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 사람이 읽기 좋은 형식 (개발용)
    #[default]
    Pretty,
    /// JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 기본 로그 레벨 (RUST_LOG가 있으면 무시됨)
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 파일/라인 표시 여부
    pub with_file: bool,
    /// 타깃 모듈 표시 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 지정한 레벨로 설정을 만듭니다.
    pub fn new(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    /// 출력 형식을 지정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 환경 변수에서 설정을 만듭니다.
    ///
    /// 레벨은 `RUST_LOG`, 형식은 `LOG_FORMAT`을 읽습니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Self::default()
        }
    }
}

/// 전역 로깅을 초기화합니다.
///
/// `RUST_LOG` 환경 변수가 설정 레벨보다 우선합니다. 이미 초기화된
/// 경우 에러를 반환합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_file(config.with_file)
                        .with_target(config.with_target),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_file(config.with_file)
                        .with_target(config.with_target),
                )
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_file(config.with_file)
                        .with_target(config.with_target),
                )
                .try_init()?;
        }
    }

    tracing::info!(format = ?config.format, "로깅 초기화 완료");
    Ok(())
}
