//! Binance 체결/캔들 소스.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use marketwatch_core::{CandleDuration, Trade};

use crate::error::{ExchangeError, Result};
use crate::retrieve::MatchPolicy;
use crate::traits::{SourceConfig, TradeSource};

/// 요청 범위 밖 조회에 대한 Binance 에러 코드.
const CODE_OUT_OF_RANGE: i64 = -1104;

/// Binance aggTrades 응답 레코드.
#[derive(Debug, Deserialize)]
struct BinanceAggTrade {
    #[serde(rename = "a")]
    id: u64,
    #[serde(rename = "p")]
    price: String,
    #[serde(rename = "q")]
    qty: String,
    #[serde(rename = "T")]
    time: i64,
}

impl From<BinanceAggTrade> for Trade {
    fn from(raw: BinanceAggTrade) -> Self {
        Trade::tick(
            raw.id,
            millis_to_datetime(raw.time),
            parse_decimal(&raw.price),
            parse_decimal(&raw.qty),
        )
    }
}

/// Binance kline 응답 행.
#[derive(Debug, Deserialize)]
struct BinanceKline(
    i64,    // 0: Open time (ms)
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time (ms)
    String, // 7: Quote asset volume
    u32,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

impl From<BinanceKline> for Trade {
    fn from(row: BinanceKline) -> Self {
        Trade {
            // 행의 open time이 소스 안에서 유일한 id 역할을 한다
            id: u64::try_from(row.0).unwrap_or(0),
            time: millis_to_datetime(row.0),
            open: parse_decimal(&row.1),
            high: parse_decimal(&row.2),
            low: parse_decimal(&row.3),
            close: parse_decimal(&row.4),
            amount: parse_decimal(&row.5),
            quote_amount: Some(parse_decimal(&row.7)),
            num_trades: Some(row.8),
        }
    }
}

/// kline 응답. 배열 그대로 오거나 result 키로 감싸져 올 수 있다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KlineResponse {
    Wrapped { result: Vec<BinanceKline> },
    Bare(Vec<BinanceKline>),
}

/// Binance 에러 본문.
///
/// 엔드포인트에 따라 에러 메시지 필드 이름이 다릅니다
/// (`msg`, `message`, `error`).
#[derive(Debug, Deserialize)]
struct BinanceError {
    #[serde(default)]
    code: i64,
    #[serde(rename = "msg", alias = "message", alias = "error")]
    message: String,
}

fn parse_decimal(value: &str) -> Decimal {
    value.parse().unwrap_or(Decimal::ZERO)
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// 비 2xx 응답을 에러로 분류합니다.
///
/// 범위 밖 조회(400 + -1104)는 데이터 소진 신호로 봅니다.
fn classify_failure(status: StatusCode, body: &str) -> ExchangeError {
    if let Ok(err) = serde_json::from_str::<BinanceError>(body) {
        if status == StatusCode::BAD_REQUEST && err.code == CODE_OUT_OF_RANGE {
            return ExchangeError::NoMoreData;
        }
        return ExchangeError::Upstream {
            status: status.as_u16(),
            message: err.message,
        };
    }
    ExchangeError::Upstream {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    }
}

/// 2xx 본문에 담긴 에러 필드를 찾습니다. 빈 메시지는 무시합니다.
fn envelope_error(body: &str) -> Option<ExchangeError> {
    match serde_json::from_str::<BinanceError>(body) {
        Ok(err) if !err.message.is_empty() => Some(ExchangeError::Api {
            code: err.code,
            message: err.message,
        }),
        _ => None,
    }
}

// ============================================================
// aggTrades 소스
// ============================================================

/// Binance aggTrades 피드.
///
/// 개별 체결을 id 커서(fromId)로 페이지네이션합니다.
#[derive(Debug, Clone)]
pub struct BinanceTradeSource {
    config: SourceConfig,
}

impl BinanceTradeSource {
    /// 새 소스를 만듭니다.
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

impl TradeSource for BinanceTradeSource {
    fn name(&self) -> &'static str {
        "binance-trades"
    }

    fn store_key(&self) -> String {
        format!("{}:{}", self.name(), self.config.symbol)
    }

    fn durations(&self) -> &[CandleDuration] {
        &self.config.durations
    }

    fn policy(&self) -> MatchPolicy {
        self.config.policy
    }

    fn build_request(&self, cursor: Option<u64>) -> String {
        let mut url = format!(
            "{}/api/v1/aggTrades?symbol={}",
            self.config.base_url, self.config.symbol
        );
        if let Some(from_id) = cursor {
            url.push_str(&format!("&fromId={}", from_id));
        }
        url
    }

    fn parse_page(&self, status: StatusCode, body: &str) -> Result<Vec<Trade>> {
        if !status.is_success() {
            return Err(classify_failure(status, body));
        }
        if let Some(err) = envelope_error(body) {
            return Err(err);
        }

        let records: Vec<BinanceAggTrade> = serde_json::from_str(body)?;
        Ok(records.into_iter().map(Trade::from).collect())
    }
}

// ============================================================
// klines 소스
// ============================================================

/// Binance klines 피드.
///
/// 1분 kline 행을 시작 시각 커서(startTime)로 페이지네이션합니다.
/// 행의 open time(ms)이 id 역할을 합니다.
#[derive(Debug, Clone)]
pub struct BinanceKlineSource {
    config: SourceConfig,
}

impl BinanceKlineSource {
    /// 새 소스를 만듭니다.
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

impl TradeSource for BinanceKlineSource {
    fn name(&self) -> &'static str {
        "binance-klines"
    }

    fn store_key(&self) -> String {
        format!("{}:{}", self.name(), self.config.symbol)
    }

    fn durations(&self) -> &[CandleDuration] {
        &self.config.durations
    }

    fn policy(&self) -> MatchPolicy {
        self.config.policy
    }

    fn build_request(&self, cursor: Option<u64>) -> String {
        let mut url = format!(
            "{}/api/v1/klines?symbol={}&interval=1m",
            self.config.base_url, self.config.symbol
        );
        if let Some(start_time) = cursor {
            url.push_str(&format!("&startTime={}", start_time));
        }
        url
    }

    fn parse_page(&self, status: StatusCode, body: &str) -> Result<Vec<Trade>> {
        if !status.is_success() {
            return Err(classify_failure(status, body));
        }
        if let Some(err) = envelope_error(body) {
            return Err(err);
        }

        let response: KlineResponse = serde_json::from_str(body)?;
        let rows = match response {
            KlineResponse::Wrapped { result } => result,
            KlineResponse::Bare(rows) => rows,
        };
        Ok(rows.into_iter().map(Trade::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade_source() -> BinanceTradeSource {
        BinanceTradeSource::new(SourceConfig::new("LSKBTC"))
    }

    fn kline_source() -> BinanceKlineSource {
        BinanceKlineSource::new(SourceConfig::new("LSKBTC"))
    }

    #[test]
    fn trade_request_appends_id_cursor() {
        let source = trade_source();
        assert_eq!(
            source.build_request(None),
            "https://api.binance.com/api/v1/aggTrades?symbol=LSKBTC"
        );
        assert_eq!(
            source.build_request(Some(42)),
            "https://api.binance.com/api/v1/aggTrades?symbol=LSKBTC&fromId=42"
        );
    }

    #[test]
    fn kline_request_appends_time_cursor() {
        let source = kline_source();
        assert_eq!(
            source.build_request(None),
            "https://api.binance.com/api/v1/klines?symbol=LSKBTC&interval=1m"
        );
        assert_eq!(
            source.build_request(Some(1_498_793_709_153)),
            "https://api.binance.com/api/v1/klines?symbol=LSKBTC&interval=1m&startTime=1498793709153"
        );
    }

    #[test]
    fn store_keys_include_symbol() {
        assert_eq!(trade_source().store_key(), "binance-trades:LSKBTC");
        assert_eq!(kline_source().store_key(), "binance-klines:LSKBTC");
    }

    #[test]
    fn parses_agg_trades() {
        let body = r#"[
            {"a":26129,"p":"0.01633102","q":"4.70443515","f":27781,"l":27781,"T":1498793709153,"m":true,"M":true}
        ]"#;
        let trades = trade_source().parse_page(StatusCode::OK, body).unwrap();

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.id, 26129);
        assert_eq!(trade.open, dec!(0.01633102));
        assert_eq!(trade.close, dec!(0.01633102));
        assert_eq!(trade.amount, dec!(4.70443515));
        assert_eq!(trade.time.timestamp_millis(), 1_498_793_709_153);
        assert_eq!(trade.quote_amount, None);
        assert_eq!(trade.num_trades, None);
    }

    #[test]
    fn parses_kline_rows() {
        let body = r#"[
            [1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]
        ]"#;
        let trades = kline_source().parse_page(StatusCode::OK, body).unwrap();

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.id, 1_499_040_000_000);
        assert_eq!(trade.time.timestamp_millis(), 1_499_040_000_000);
        assert_eq!(trade.open, dec!(0.01634790));
        assert_eq!(trade.high, dec!(0.80000000));
        assert_eq!(trade.low, dec!(0.01575800));
        assert_eq!(trade.close, dec!(0.01577100));
        assert_eq!(trade.amount, dec!(148976.11427815));
        assert_eq!(trade.quote_amount, Some(dec!(2434.19055334)));
        assert_eq!(trade.num_trades, Some(308));
    }

    #[test]
    fn parses_wrapped_kline_envelope() {
        let body = r#"{"success":true,"message":"","result":[
            [60000,"1","2","0.5","1.5","10",119999,"15",7,"5","7.5","0"]
        ]}"#;
        let trades = kline_source().parse_page(StatusCode::OK, body).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, 60_000);
        assert_eq!(trades[0].num_trades, Some(7));
    }

    #[test]
    fn out_of_range_is_no_more_data() {
        let body = r#"{"code":-1104,"msg":"Not all sent parameters were read."}"#;
        let err = trade_source()
            .parse_page(StatusCode::BAD_REQUEST, body)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NoMoreData));
        assert!(err.is_terminal());
    }

    #[test]
    fn other_bad_request_is_upstream() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        let err = trade_source()
            .parse_page(StatusCode::BAD_REQUEST, body)
            .unwrap_err();
        match err {
            ExchangeError::Upstream { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid symbol.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_error_is_upstream() {
        let err = trade_source()
            .parse_page(StatusCode::INTERNAL_SERVER_ERROR, "upstream down")
            .unwrap_err();
        match err {
            ExchangeError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn embedded_error_field_is_api_error() {
        let body = r#"{"error":"MARKET_NOT_PROVIDED"}"#;
        let err = kline_source().parse_page(StatusCode::OK, body).unwrap_err();
        match err {
            ExchangeError::Api { code, message } => {
                assert_eq!(code, 0);
                assert_eq!(message, "MARKET_NOT_PROVIDED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let err = trade_source()
            .parse_page(StatusCode::OK, "<html>not json</html>")
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Parse(_)));
    }

    #[test]
    fn zero_id_page_is_invalid() {
        let source = trade_source();
        let page = vec![Trade::tick(
            0,
            millis_to_datetime(0),
            dec!(1),
            dec!(1),
        )];
        assert!(!source.is_page_valid(&page));
        assert!(source.is_page_valid(&[]));
    }

    #[test]
    fn unparsable_decimal_falls_back_to_zero() {
        assert_eq!(parse_decimal("not-a-number"), Decimal::ZERO);
        assert_eq!(parse_decimal("1.5"), dec!(1.5));
    }
}
