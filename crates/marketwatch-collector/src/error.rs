//! 수집기 에러 타입.

use std::error::Error;
use std::fmt;

use marketwatch_core::CandleDuration;
use marketwatch_data::DataError;
use marketwatch_exchange::ExchangeError;

/// 수집기 실행 에러.
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 문제
    Config(String),
    /// 체결 수집 실패
    Retrieval(ExchangeError),
    /// 저장소 접근 실패
    Store(DataError),
    /// 특정 기간의 영속화 실패
    Persistence {
        /// 실패한 집계 기간
        duration: CandleDuration,
        /// 원인
        source: DataError,
    },
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "설정 에러: {}", msg),
            Self::Retrieval(err) => write!(f, "수집 에러: {}", err),
            Self::Store(err) => write!(f, "저장소 에러: {}", err),
            Self::Persistence { duration, source } => {
                write!(f, "{} 캔들 저장 실패: {}", duration, source)
            }
        }
    }
}

impl Error for CollectorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Retrieval(err) => Some(err),
            Self::Store(err) | Self::Persistence { source: err, .. } => Some(err),
        }
    }
}

impl From<ExchangeError> for CollectorError {
    fn from(err: ExchangeError) -> Self {
        Self::Retrieval(err)
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        Self::Store(err)
    }
}

/// 수집기 Result 타입.
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_names_the_duration() {
        let err = CollectorError::Persistence {
            duration: CandleDuration::Hour,
            source: DataError::CacheError("SET failed".into()),
        };
        let text = err.to_string();
        assert!(text.contains("hour"));
        assert!(text.contains("SET failed"));
    }

    #[test]
    fn exchange_errors_map_to_retrieval() {
        let err = CollectorError::from(ExchangeError::NoMoreData);
        assert!(matches!(err, CollectorError::Retrieval(_)));
    }

    #[test]
    fn data_errors_map_to_store() {
        let err = CollectorError::from(DataError::ConnectionError("refused".into()));
        assert!(matches!(err, CollectorError::Store(_)));
    }
}
