//! 데이터 계층 에러 타입.

use thiserror::Error;

/// 데이터 계층 작업 에러.
#[derive(Error, Debug)]
pub enum DataError {
    /// 저장소 연결 실패
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 저장소 명령 실패
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 직렬화/역직렬화 실패
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        Self::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// 데이터 계층 Result 타입.
pub type Result<T> = std::result::Result<T, DataError>;
