//! OHLCV 캔들과 집계.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::decimal::{fixed8, Price};
use crate::types::duration::CandleDuration;
use crate::types::trade::Trade;

/// 기간별 OHLCV 캔들.
///
/// `timestamp`는 기간 경계로 내림한 UTC epoch 초이며, 같은 키의
/// 캔들 시퀀스 안에서 유일합니다. 거래량은 소수 8자리로 고정해
/// 문자열로 직렬화합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 버킷 시작 (UTC epoch 초)
    pub timestamp: i64,
    /// 버킷 시작 시각
    pub date: DateTime<Utc>,
    /// 시가 (버킷 내 가장 이른 체결)
    pub open: Price,
    /// 종가 (버킷 내 가장 늦은 체결)
    pub close: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 기초 자산 거래량 합
    #[serde(with = "rust_decimal::serde::str")]
    pub base_volume: Decimal,
    /// 호가 자산 거래량 합
    #[serde(with = "rust_decimal::serde::str")]
    pub quote_volume: Decimal,
    /// 버킷 내 첫 체결 id
    pub first_trade: u64,
    /// 버킷 내 마지막 체결 id
    pub last_trade: u64,
    /// 집계된 체결 수
    pub num_trades: u32,
}

/// 체결 시퀀스를 기간별 캔들로 집계합니다.
///
/// 버킷은 체결 시각을 UTC 기간 경계로 내림해 정해지고, 체결이 없는
/// 버킷은 만들지 않습니다. 반환 시퀀스는 timestamp 오름차순이며
/// 입력 순서에 영향을 받지 않습니다.
pub fn aggregate(trades: &[Trade], duration: CandleDuration) -> Vec<Candle> {
    let mut buckets: BTreeMap<i64, Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        buckets
            .entry(duration.bucket_timestamp(trade.time.timestamp()))
            .or_default()
            .push(trade);
    }

    buckets
        .into_iter()
        .filter_map(|(timestamp, bucket)| build_candle(timestamp, &bucket))
        .collect()
}

/// 버킷 하나를 캔들로 만듭니다. 빈 버킷은 None.
///
/// 첫/마지막 체결은 (시각, id) 순서로 정합니다. 같은 시각에 겹친
/// 체결은 id가 더 큰 쪽을 늦은 것으로 봅니다.
fn build_candle(timestamp: i64, bucket: &[&Trade]) -> Option<Candle> {
    let first = bucket.iter().copied().min_by_key(|t| (t.time, t.id))?;
    let last = bucket.iter().copied().max_by_key(|t| (t.time, t.id))?;

    let mut high = first.high;
    let mut low = first.low;
    let mut base_volume = Decimal::ZERO;
    let mut quote_volume = Decimal::ZERO;
    let mut num_trades: u32 = 0;

    for trade in bucket.iter().copied() {
        high = high.max(trade.high);
        low = low.min(trade.low);
        base_volume += trade.amount;
        quote_volume += trade.quote_value();
        num_trades = num_trades.saturating_add(trade.trade_count());
    }

    Some(Candle {
        timestamp,
        date: bucket_date(timestamp),
        open: first.open,
        close: last.close,
        high,
        low,
        base_volume: fixed8(base_volume),
        quote_volume: fixed8(quote_volume),
        first_trade: first.id,
        last_trade: last.id,
        num_trades,
    })
}

fn bucket_date(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tick(id: u64, secs: i64, price: Decimal, qty: Decimal) -> Trade {
        Trade::tick(id, DateTime::from_timestamp(secs, 0).unwrap(), price, qty)
    }

    #[test]
    fn single_trade_candle_collapses_prices() {
        let candles = aggregate(&[tick(1, 30, dec!(10), dec!(2))], CandleDuration::Minute);
        assert_eq!(candles.len(), 1);

        let candle = &candles[0];
        assert_eq!(candle.timestamp, 0);
        assert_eq!(candle.open, dec!(10));
        assert_eq!(candle.close, dec!(10));
        assert_eq!(candle.high, dec!(10));
        assert_eq!(candle.low, dec!(10));
        assert_eq!(candle.first_trade, 1);
        assert_eq!(candle.last_trade, 1);
        assert_eq!(candle.num_trades, 1);
    }

    #[test]
    fn same_second_trades_order_by_id() {
        let trades = vec![
            tick(2, 30, dec!(12), dec!(1)),
            tick(1, 30, dec!(10), dec!(1)),
        ];
        let candles = aggregate(&trades, CandleDuration::Minute);

        let candle = &candles[0];
        assert_eq!(candle.open, dec!(10));
        assert_eq!(candle.close, dec!(12));
        assert_eq!(candle.first_trade, 1);
        assert_eq!(candle.last_trade, 2);
    }

    #[test]
    fn day_boundary_splits_buckets() {
        let trades = vec![
            tick(1, 86_399, dec!(10), dec!(1)),
            tick(2, 86_400, dec!(11), dec!(1)),
        ];
        let candles = aggregate(&trades, CandleDuration::Day);

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 0);
        assert_eq!(candles[1].timestamp, 86_400);
        assert_eq!(candles[1].date.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn preaggregated_rows_sum_counts_and_quote_volume() {
        let mut row = tick(60_000, 60, dec!(10), dec!(5));
        row.quote_amount = Some(dec!(49.5));
        row.num_trades = Some(3);
        let trades = vec![row, tick(70_000, 70, dec!(11), dec!(1))];

        let candles = aggregate(&trades, CandleDuration::Minute);
        assert_eq!(candles.len(), 1);

        let candle = &candles[0];
        assert_eq!(candle.num_trades, 4);
        assert_eq!(candle.quote_volume.to_string(), "60.50000000");
        assert_eq!(candle.base_volume.to_string(), "6.00000000");
    }

    #[test]
    fn candle_serializes_volumes_as_strings() {
        let candles = aggregate(&[tick(1, 0, dec!(10), dec!(3))], CandleDuration::Minute);
        let json = serde_json::to_string(&candles[0]).unwrap();
        assert!(json.contains("\"base_volume\":\"3.00000000\""));
        assert!(json.contains("\"quote_volume\":\"30.00000000\""));

        let parsed: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, &candles[0]);
    }
}
