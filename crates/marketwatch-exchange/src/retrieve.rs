//! 페이지네이션 수집 루프.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use marketwatch_core::Trade;

use crate::error::{ExchangeError, Result};
use crate::traits::TradeSource;

/// 페이지 중복 판정 정책.
///
/// 새 페이지가 이미 수집한 데이터와 겹치는지 판단해 루프 종료를
/// 결정합니다. 소스 구성 시점에 한 번 선택됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// id 집합 전체 비교 (정확하지만 가장 비쌈)
    Full,
    /// 양끝 레코드 id 교차 비교
    FirstLast,
    /// 최소/최대 id 경계 비교 (기본값)
    #[default]
    MinMax,
}

impl MatchPolicy {
    /// 페이지가 수집분과 겹치지 않는 신규 데이터인지 판정합니다.
    ///
    /// 빈 페이지는 신규가 아니고, 수집분이 비어 있으면 항상 신규
    /// 입니다.
    pub fn page_is_new(&self, accepted: &[Trade], page: &[Trade]) -> bool {
        if page.is_empty() {
            return false;
        }
        if accepted.is_empty() {
            return true;
        }

        match self {
            Self::Full => {
                let accepted_ids: HashSet<u64> = accepted.iter().map(|t| t.id).collect();
                let page_ids: HashSet<u64> = page.iter().map(|t| t.id).collect();
                accepted_ids != page_ids
            }
            Self::FirstLast => {
                let first_differs =
                    accepted.first().map(|t| t.id) != page.last().map(|t| t.id);
                let last_differs =
                    accepted.last().map(|t| t.id) != page.first().map(|t| t.id);
                first_differs && last_differs
            }
            Self::MinMax => {
                let (page_min, page_max) = id_bounds(page);
                let (accepted_min, accepted_max) = id_bounds(accepted);
                !(page_min == accepted_min || page_max == accepted_max)
            }
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "first_last" => Ok(Self::FirstLast),
            "min_max" => Ok(Self::MinMax),
            other => Err(format!("unknown match policy: {}", other)),
        }
    }
}

fn id_bounds(records: &[Trade]) -> (u64, u64) {
    records.iter().fold((u64::MAX, 0), |(min, max), trade| {
        (min.min(trade.id), max.max(trade.id))
    })
}

/// 한 번의 수집 실행이 소유하는 페이지네이션 상태.
#[derive(Debug, Clone, Default)]
pub struct RetrievalCursor {
    /// 다음 요청에 쓸 페이지네이션 토큰
    pub next_start: Option<u64>,
    /// 더 이상 신규 데이터가 없다고 판정됨
    pub found: bool,
    /// 직전 빌드까지 저장된 high-water id
    pub last_seen: Option<u64>,
}

impl RetrievalCursor {
    /// 이전 빌드의 high-water id에서 이어받는 커서를 만듭니다.
    pub fn resume_from(last_seen: Option<u64>) -> Self {
        Self {
            next_start: None,
            found: false,
            last_seen,
        }
    }

    /// 수집된 최대 id 다음으로 커서를 전진시킵니다.
    ///
    /// fromId/startTime 파라미터는 하한 포함이라, 경계 레코드를
    /// 다시 받지 않도록 배타적으로 전진합니다.
    pub fn advance_past(&mut self, max_id: u64) {
        self.next_start = Some(max_id.saturating_add(1));
    }
}

/// 소스 하나에 대해 fetch-판정-전진 루프를 실행합니다.
#[derive(Debug, Clone)]
pub struct TradeRetriever {
    client: Client,
}

impl TradeRetriever {
    /// HTTP 타임아웃을 지정해 수집기를 만듭니다.
    pub fn new(http_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// 신규 레코드를 모두 수집해 id 오름차순으로 반환합니다.
    ///
    /// 전송 실패와 업스트림 에러는 수집 전체를 중단시키고 부분
    /// 결과를 버립니다. 범위 소진 신호, 형식이 깨진 페이지, 겹치는
    /// 페이지는 정상 종료로 처리합니다.
    pub async fn retrieve(
        &self,
        source: &dyn TradeSource,
        cursor: &mut RetrievalCursor,
    ) -> Result<Vec<Trade>> {
        let mut accepted: Vec<Trade> = Vec::new();

        while !cursor.found {
            let url = source.build_request(cursor.next_start);
            debug!(source = source.name(), url = %url, "requesting page");

            let response = self.client.get(&url).send().await?;
            let status = response.status();
            let body = response.text().await?;

            let page = match source.parse_page(status, &body) {
                Ok(page) => page,
                Err(ExchangeError::NoMoreData) => {
                    info!(source = source.name(), "no more data, ending retrieval");
                    cursor.found = true;
                    break;
                }
                Err(ExchangeError::Parse(reason)) => {
                    warn!(source = source.name(), %reason, "malformed page, ending retrieval");
                    cursor.found = true;
                    break;
                }
                Err(err) => return Err(err),
            };

            // 직전 빌드까지 저장된 레코드 제거
            let page: Vec<Trade> = match cursor.last_seen {
                Some(high_water) => page.into_iter().filter(|t| t.id > high_water).collect(),
                None => page,
            };

            if !source.is_page_valid(&page) {
                warn!(source = source.name(), "invalid page received, ending retrieval");
                cursor.found = true;
                break;
            }

            if source.policy().page_is_new(&accepted, &page) {
                info!(
                    source = source.name(),
                    start = ?cursor.next_start,
                    count = page.len(),
                    "found new trades"
                );
                accepted.extend(page);
                if let Some(max_id) = accepted.iter().map(|t| t.id).max() {
                    cursor.advance_past(max_id);
                }
            } else {
                cursor.found = true;
            }
        }

        accepted.sort_unstable_by_key(|t| t.id);
        Ok(accepted)
    }
}
