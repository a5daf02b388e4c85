//! 캔들 데이터 저장.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `CandleStore` trait: drop / save / load 영속화 인터페이스
//! - Redis 구현 (JSON 직렬화, 단일 SET에 의한 원자적 전체 교체)

pub mod error;
pub mod storage;

pub use error::{DataError, Result};
pub use storage::redis::{RedisCandleStore, RedisConfig};
pub use storage::CandleStore;
