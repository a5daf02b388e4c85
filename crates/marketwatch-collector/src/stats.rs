//! 수집 실행 통계.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 빌드 실행 통계.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    /// 시도한 소스 수
    pub total: usize,
    /// 성공한 소스 수
    pub success: usize,
    /// 실패한 소스 수
    pub errors: usize,
    /// 신규 레코드가 없었던 소스 수
    pub empty: usize,
    /// 수집한 체결 수
    pub total_trades: usize,
    /// 저장한 캔들 수
    pub total_candles: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BuildStats {
    /// 새 통계 객체를 만듭니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 (%).
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약을 로그로 남깁니다.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            empty = self.empty,
            total_trades = self.total_trades,
            total_candles = self.total_candles,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "빌드 완료"
        );
    }
}
