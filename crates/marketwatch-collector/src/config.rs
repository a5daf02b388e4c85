//! 수집기 런타임 설정.

use std::path::Path;

use marketwatch_core::{AppConfig, SourceSettings};
use marketwatch_exchange::{
    BinanceKlineSource, BinanceTradeSource, MatchPolicy, SourceConfig, TradeSource,
};

use crate::error::{CollectorError, Result};

/// 설정 파일과 CLI 인자를 합친 실행 옵션.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 애플리케이션 설정
    pub app: AppConfig,
    /// 데몬 반복 주기 (초)
    pub interval_secs: u64,
    /// 지정 시 해당 소스만 처리 (exchange 또는 symbol로 매칭)
    pub only: Option<Vec<String>>,
}

impl RunOptions {
    /// 설정 파일을 읽고 CLI 오버라이드를 적용합니다.
    pub fn load(
        config_path: &Path,
        interval: Option<u64>,
        only: Option<Vec<String>>,
    ) -> Result<Self> {
        dotenvy::dotenv().ok();

        let app = AppConfig::load(config_path)
            .map_err(|e| CollectorError::Config(e.to_string()))?;
        if app.sources.is_empty() {
            return Err(CollectorError::Config("no sources configured".to_string()));
        }

        let interval_secs = interval.unwrap_or(app.watcher.interval_secs);
        Ok(Self {
            app,
            interval_secs,
            only,
        })
    }

    /// 처리 대상 소스 설정 목록.
    pub fn selected_sources(&self) -> Vec<&SourceSettings> {
        match &self.only {
            Some(names) => self
                .app
                .sources
                .iter()
                .filter(|s| names.iter().any(|n| n == &s.exchange || n == &s.symbol))
                .collect(),
            None => self.app.sources.iter().collect(),
        }
    }
}

/// 소스 설정으로 구체 소스를 만듭니다.
pub fn build_source(settings: &SourceSettings) -> Result<Box<dyn TradeSource>> {
    if settings.durations.is_empty() {
        return Err(CollectorError::Config(format!(
            "source {} has no durations",
            settings.exchange
        )));
    }

    let policy = settings
        .policy
        .parse::<MatchPolicy>()
        .map_err(CollectorError::Config)?;

    let mut config = SourceConfig::new(&settings.symbol)
        .with_durations(settings.durations.clone())
        .with_policy(policy);
    if let Some(base_url) = &settings.base_url {
        config = config.with_base_url(base_url);
    }

    match settings.exchange.as_str() {
        "binance-trades" => Ok(Box::new(BinanceTradeSource::new(config))),
        "binance-klines" => Ok(Box::new(BinanceKlineSource::new(config))),
        other => Err(CollectorError::Config(format!(
            "unknown exchange: {}",
            other
        ))),
    }
}
