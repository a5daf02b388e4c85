//! 캔들 빌드 오케스트레이션.
//!
//! 소스 하나에 대해 수집을 한 번 수행한 뒤, 설정된 기간마다
//! 집계 → 삭제 → 저장을 순차 실행합니다. 저장은 언제나 전체 교체
//! 이므로 저장 상태는 마지막 빌드의 수집 결과를 그대로 비춥니다.

use std::time::Instant;

use tracing::{error, info};

use marketwatch_core::{aggregate, CandleDuration, Trade};
use marketwatch_data::CandleStore;
use marketwatch_exchange::{RetrievalCursor, TradeRetriever, TradeSource};

use crate::error::{CollectorError, Result};
use crate::stats::BuildStats;

/// 소스 하나의 빌드 결과.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOutcome {
    /// 수집한 체결 수
    pub trades: usize,
    /// 저장한 캔들 수
    pub candles: usize,
}

/// 소스 하나에 대해 전체 빌드를 실행합니다.
///
/// 저장소의 마지막 캔들에서 high-water id를 복원해 수집하고, 설정된
/// 기간마다 순차적으로 집계/영속화합니다. 한 기간이 실패하면 남은
/// 기간은 중단되고 실패한 기간 이름이 에러에 담깁니다.
pub async fn build_candles(
    retriever: &TradeRetriever,
    source: &dyn TradeSource,
    store: &dyn CandleStore,
) -> Result<BuildOutcome> {
    let key = source.store_key();

    // 첫 설정 기간의 마지막 캔들이 high-water 기준
    let last_seen = match source.durations().first() {
        Some(&duration) => store
            .last_candle(&key, duration)
            .await?
            .map(|candle| candle.last_trade),
        None => None,
    };

    let mut cursor = RetrievalCursor::resume_from(last_seen);
    let trades = retriever.retrieve(source, &mut cursor).await?;

    if trades.is_empty() {
        info!(source = source.name(), "신규 체결 없음");
    } else {
        info!(
            source = source.name(),
            count = trades.len(),
            last_seen = ?last_seen,
            "체결 수집 완료"
        );
    }

    let candles = persist_durations(&trades, &key, source.durations(), store).await?;

    Ok(BuildOutcome {
        trades: trades.len(),
        candles,
    })
}

/// 기간별 집계 결과를 전체 교체 방식으로 저장합니다.
///
/// 빈 체결 시퀀스도 각 기간의 drop + save를 그대로 수행해 저장
/// 상태를 수집 결과와 일치시킵니다.
pub async fn persist_durations(
    trades: &[Trade],
    key: &str,
    durations: &[CandleDuration],
    store: &dyn CandleStore,
) -> Result<usize> {
    let mut saved = 0;

    for &duration in durations {
        let candles = aggregate(trades, duration);

        store
            .drop_candles(key, duration)
            .await
            .map_err(|source| CollectorError::Persistence { duration, source })?;
        store
            .save_candles(key, duration, &candles)
            .await
            .map_err(|source| CollectorError::Persistence { duration, source })?;

        info!(key = key, duration = %duration, count = candles.len(), "캔들 저장 완료");
        saved += candles.len();
    }

    Ok(saved)
}

/// 소스 목록을 순차 처리하고 통계를 반환합니다.
///
/// 소스 하나의 실패는 기록만 하고 다음 소스로 넘어갑니다.
pub async fn run_sources(
    retriever: &TradeRetriever,
    sources: &[Box<dyn TradeSource>],
    store: &dyn CandleStore,
) -> BuildStats {
    let started = Instant::now();
    let mut stats = BuildStats::new();

    for source in sources {
        stats.total += 1;
        match build_candles(retriever, source.as_ref(), store).await {
            Ok(outcome) => {
                stats.success += 1;
                stats.total_trades += outcome.trades;
                stats.total_candles += outcome.candles;
                if outcome.trades == 0 {
                    stats.empty += 1;
                }
            }
            Err(err) => {
                stats.errors += 1;
                error!(source = source.name(), error = %err, "소스 빌드 실패");
            }
        }
    }

    stats.elapsed = started.elapsed();
    stats
}
