//! 소스 인터페이스.

use reqwest::StatusCode;

use marketwatch_core::{CandleDuration, Trade};

use crate::error::Result;
use crate::retrieve::MatchPolicy;

/// 기본 API 베이스 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// 소스 구성.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// 거래 심볼
    pub symbol: String,
    /// API 베이스 URL
    pub base_url: String,
    /// 집계 기간 목록
    pub durations: Vec<CandleDuration>,
    /// 페이지 중복 판정 정책
    pub policy: MatchPolicy,
}

impl SourceConfig {
    /// 기본값으로 소스 구성을 만듭니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            durations: CandleDuration::all().to_vec(),
            policy: MatchPolicy::default(),
        }
    }

    /// 베이스 URL을 바꿉니다 (테스트/프록시용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 집계 기간 목록을 바꿉니다.
    pub fn with_durations(mut self, durations: Vec<CandleDuration>) -> Self {
        self.durations = durations;
        self
    }

    /// 중복 판정 정책을 바꿉니다.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// 거래소 체결 피드.
///
/// 구현체는 요청 URL 생성과 응답 해석만 담당합니다. 페이지네이션
/// 루프, 중복 제거, 종료 판정은 `TradeRetriever`가 수행합니다.
pub trait TradeSource: Send + Sync + std::fmt::Debug {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 저장 키 (`<이름>:<심볼>`).
    fn store_key(&self) -> String;

    /// 이 소스가 집계할 기간 목록.
    fn durations(&self) -> &[CandleDuration];

    /// 페이지 중복 판정 정책.
    fn policy(&self) -> MatchPolicy;

    /// 페이지 요청 URL을 만듭니다. cursor가 없으면 첫 페이지입니다.
    fn build_request(&self, cursor: Option<u64>) -> String;

    /// 응답을 정규화된 체결 목록으로 해석합니다.
    fn parse_page(&self, status: StatusCode, body: &str) -> Result<Vec<Trade>>;

    /// 중복 제거를 마친 페이지가 처리 가능한 형태인지 검사합니다.
    ///
    /// 빈 페이지는 유효합니다. 빈 페이지의 종료 판정은 정책이
    /// 담당합니다.
    fn is_page_valid(&self, page: &[Trade]) -> bool {
        page.first().map_or(true, |trade| trade.id > 0)
    }
}
