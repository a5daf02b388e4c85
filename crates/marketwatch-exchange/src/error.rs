//! 거래소 에러 타입.

use thiserror::Error;

/// 거래소 데이터 수집 에러.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// 전송 실패 (연결, DNS 등)
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// 업스트림 HTTP 에러 (비 2xx 응답)
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// 응답 본문에 담긴 API 에러
    #[error("API error ({code}): {message}")]
    Api { code: i64, message: String },

    /// 요청 범위에 더 이상 데이터가 없음 (정상 종료 신호)
    #[error("no more data in the requested range")]
    NoMoreData,

    /// 응답 본문 해석 실패
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ExchangeError {
    /// 수집 루프를 정상 종료시키는 신호인지.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoMoreData)
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// 거래소 작업 Result 타입.
pub type Result<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_no_more_data_is_terminal() {
        assert!(ExchangeError::NoMoreData.is_terminal());
        assert!(!ExchangeError::Network("refused".into()).is_terminal());
        assert!(!ExchangeError::Upstream {
            status: 500,
            message: "boom".into()
        }
        .is_terminal());
    }

    #[test]
    fn json_errors_map_to_parse() {
        let err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        assert!(matches!(ExchangeError::from(err), ExchangeError::Parse(_)));
    }
}
