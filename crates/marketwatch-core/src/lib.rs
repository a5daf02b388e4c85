//! 마켓 워처 코어 라이브러리.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 정규화된 체결(`Trade`)과 기간별 캔들(`Candle`) 타입
//! - 체결 시퀀스를 기간별 캔들로 만드는 집계 함수
//! - 애플리케이션 설정 로더와 로깅 초기화

pub mod config;
pub mod logging;
pub mod types;

pub use config::{AppConfig, LoggingConfig, RedisConfig, SourceSettings, WatcherConfig};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use types::{aggregate, fixed8, Candle, CandleDuration, Price, Quantity, Trade};
