//! 정규화된 체결 레코드.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::decimal::{Price, Quantity};

/// 정규화된 체결 레코드.
///
/// 개별 체결(tick)과 사전 집계 행(kline)을 모두 이 형태로 정규화
/// 합니다. tick은 네 가격이 모두 체결가와 같고, kline 행은 행이
/// 담고 있던 OHLC를 그대로 옮깁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 소스 안에서 유일한 단조 증가 id
    pub id: u64,
    /// 체결 시각 (UTC)
    pub time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 기초 자산 수량
    pub amount: Quantity,
    /// 호가 자산 수량 (kline 행만 제공)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<Decimal>,
    /// 사전 집계된 체결 수 (kline 행만 제공)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_trades: Option<u32>,
}

impl Trade {
    /// 단일 체결로 레코드를 만듭니다.
    pub fn tick(id: u64, time: DateTime<Utc>, price: Price, amount: Quantity) -> Self {
        Self {
            id,
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            amount,
            quote_amount: None,
            num_trades: None,
        }
    }

    /// 호가 자산 기준 체결 가치.
    ///
    /// kline 행은 제공된 값을 그대로 쓰고, tick은 수량 × 체결가로
    /// 계산합니다.
    pub fn quote_value(&self) -> Decimal {
        self.quote_amount.unwrap_or_else(|| self.amount * self.close)
    }

    /// 이 레코드가 대표하는 체결 수.
    pub fn trade_count(&self) -> u32 {
        self.num_trades.unwrap_or(1)
    }
}
