//! 캔들 집계 기간.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 캔들 집계 기간.
///
/// 저장 키와 설정 파일에서는 소문자 이름("minute", "hour", "day")을
/// 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleDuration {
    /// 1분
    Minute,
    /// 1시간
    Hour,
    /// 1일
    Day,
}

impl CandleDuration {
    /// 지원하는 전체 기간.
    pub fn all() -> [Self; 3] {
        [Self::Minute, Self::Hour, Self::Day]
    }

    /// 기간 길이 (초).
    pub fn as_secs(self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    /// 저장 키에 쓰는 이름.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// epoch 초를 이 기간의 UTC 경계로 내림합니다.
    ///
    /// 음수 timestamp도 아래쪽 경계로 내림됩니다.
    pub fn bucket_timestamp(self, timestamp: i64) -> i64 {
        timestamp - timestamp.rem_euclid(self.as_secs())
    }
}

impl fmt::Display for CandleDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandleDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            other => Err(format!("unknown duration: {}", other)),
        }
    }
}
