//! 캔들 저장소.

pub mod redis;

use async_trait::async_trait;

use marketwatch_core::{Candle, CandleDuration};

use crate::error::Result;

/// 캔들 영속화 인터페이스.
///
/// 파이프라인은 항상 `drop_candles` 직후 `save_candles`를 부르는
/// 전체 교체 방식으로 사용합니다. 빈 시퀀스 저장도 유효한 교체
/// 입니다.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// 해당 키/기간의 캔들을 모두 제거합니다.
    async fn drop_candles(&self, key: &str, duration: CandleDuration) -> Result<()>;

    /// 캔들 시퀀스를 저장합니다. 기존 값은 통째로 대체됩니다.
    async fn save_candles(
        &self,
        key: &str,
        duration: CandleDuration,
        candles: &[Candle],
    ) -> Result<()>;

    /// 저장된 캔들을 timestamp 오름차순으로 반환합니다.
    async fn load_candles(&self, key: &str, duration: CandleDuration) -> Result<Vec<Candle>>;

    /// 가장 최근 캔들. 없으면 None.
    async fn last_candle(&self, key: &str, duration: CandleDuration) -> Result<Option<Candle>>;
}
