//! 거래소 시장 데이터 수집.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `TradeSource` trait: 거래소 피드 인터페이스 (요청 URL 생성 + 응답 해석)
//! - Binance aggTrades / klines 소스 구현
//! - 페이지네이션 수집 루프(`TradeRetriever`)와 종료 판정 정책
//! - 수집 에러 타입

pub mod error;
pub mod retrieve;
pub mod source;
pub mod traits;

pub use error::{ExchangeError, Result};
pub use retrieve::{MatchPolicy, RetrievalCursor, TradeRetriever};
pub use source::binance::{BinanceKlineSource, BinanceTradeSource};
pub use traits::{SourceConfig, TradeSource, DEFAULT_BASE_URL};
