//! 마켓 워처 수집기 CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use marketwatch_collector::modules::run_sources;
use marketwatch_collector::{build_source, CollectorError, RunOptions};
use marketwatch_core::{init_logging, LogConfig, LogFormat};
use marketwatch_data::{CandleStore, RedisCandleStore, RedisConfig};
use marketwatch_exchange::{TradeRetriever, TradeSource};

#[derive(Parser)]
#[command(name = "marketwatch-collector")]
#[command(about = "MarketWatch Candle Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 (설정 파일보다 우선, trace/debug/info/warn/error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 모든(또는 지정) 소스의 캔들을 1회 빌드
    Build {
        /// 특정 소스만 빌드 (exchange 이름 또는 심볼, 반복 지정 가능)
        #[arg(long)]
        source: Option<Vec<String>>,
    },

    /// 데몬 모드: 주기적으로 전체 빌드 반복
    Daemon {
        /// 반복 주기 (초, 설정 파일보다 우선)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// 저장된 캔들 상태 출력
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { source } => {
            let options = RunOptions::load(&cli.config, None, source)?;
            init_logging_for(&options, cli.log_level.as_deref());
            tracing::info!("마켓 워처 수집기 시작");

            let (retriever, store, sources) = setup(&options).await?;
            let stats = run_sources(&retriever, &sources, &store).await;
            stats.log_summary("캔들 빌드");
        }
        Commands::Daemon { interval } => {
            let options = RunOptions::load(&cli.config, interval, None)?;
            init_logging_for(&options, cli.log_level.as_deref());
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}초) ===",
                options.interval_secs
            );

            let (retriever, store, sources) = setup(&options).await?;

            let mut ticker =
                tokio::time::interval(Duration::from_secs(options.interval_secs));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = ticker.tick() => {
                        let stats = run_sources(&retriever, &sources, &store).await;
                        stats.log_summary("캔들 빌드");
                        tracing::info!(
                            "=== 빌드 완료, 다음 실행: {}초 후 ===",
                            options.interval_secs
                        );
                    }
                }
            }
        }
        Commands::Status => {
            let options = RunOptions::load(&cli.config, None, None)?;
            init_logging_for(&options, cli.log_level.as_deref());

            let (_retriever, store, sources) = setup(&options).await?;

            for source in &sources {
                let key = source.store_key();
                for &duration in source.durations() {
                    let candles = store.load_candles(&key, duration).await?;
                    match candles.last() {
                        Some(last) => tracing::info!(
                            key = %key,
                            duration = %duration,
                            count = candles.len(),
                            last_date = %last.date,
                            close = %last.close,
                            "캔들 상태"
                        ),
                        None => tracing::info!(
                            key = %key,
                            duration = %duration,
                            "저장된 캔들 없음"
                        ),
                    }
                }
            }
        }
    }

    tracing::info!("마켓 워처 수집기 종료");
    Ok(())
}

/// 설정 파일의 로깅 섹션(그리고 CLI 오버라이드)으로 로깅을 켭니다.
fn init_logging_for(options: &RunOptions, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&options.app.logging.level);
    let format = options
        .app
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();

    if let Err(err) = init_logging(LogConfig::new(level).with_format(format)) {
        eprintln!("failed to initialize logging: {err}");
    }
}

/// 수집기 구성요소를 만들고 저장소 연결을 확인합니다.
async fn setup(
    options: &RunOptions,
) -> Result<(TradeRetriever, RedisCandleStore, Vec<Box<dyn TradeSource>>), CollectorError> {
    let retriever =
        TradeRetriever::new(Duration::from_secs(options.app.watcher.http_timeout_secs))?;

    let redis_config = RedisConfig {
        url: options.app.redis.url.clone(),
        ..Default::default()
    };
    let store = RedisCandleStore::connect(&redis_config).await?;
    store.health_check().await?;
    tracing::info!("Redis 연결 성공");

    let sources = options
        .selected_sources()
        .into_iter()
        .map(build_source)
        .collect::<Result<Vec<_>, _>>()?;
    if sources.is_empty() {
        return Err(CollectorError::Config(
            "no sources matched the filter".to_string(),
        ));
    }

    tracing::info!(sources = sources.len(), "수집기 준비 완료");
    Ok((retriever, store, sources))
}
