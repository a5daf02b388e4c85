//! Redis 캔들 저장소.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use async_trait::async_trait;
use marketwatch_core::{Candle, CandleDuration};

use crate::error::{DataError, Result};
use crate::storage::CandleStore;

/// Redis 연결 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// 접속 URL
    #[serde(default = "default_url")]
    pub url: String,
    /// 연결 수립 타임아웃 (초)
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_connection_timeout_secs() -> u64 {
    5
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

/// Redis 기반 캔들 저장소.
///
/// 키 하나(`candles:<key>:<duration>`)에 캔들 시퀀스 전체를 JSON
/// 으로 저장합니다. 저장이 단일 SET이라 교체가 원자적으로 보입니다.
#[derive(Clone)]
pub struct RedisCandleStore {
    connection: Arc<RwLock<MultiplexedConnection>>,
}

impl RedisCandleStore {
    /// 설정된 URL로 연결을 만듭니다.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        info!(url = %config.url, "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        let connection = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout_secs),
            client.get_multiplexed_tokio_connection(),
        )
        .await
        .map_err(|_| DataError::ConnectionError("connection timed out".to_string()))?
        .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self {
            connection: Arc::new(RwLock::new(connection)),
        })
    }

    /// PING으로 연결 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection.write().await;
        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(DataError::from)?;
        Ok(())
    }

    /// 캔들 저장 키.
    fn candles_key(key: &str, duration: CandleDuration) -> String {
        format!("candles:{}:{}", key, duration)
    }
}

#[async_trait]
impl CandleStore for RedisCandleStore {
    #[instrument(skip(self))]
    async fn drop_candles(&self, key: &str, duration: CandleDuration) -> Result<()> {
        let redis_key = Self::candles_key(key, duration);
        let mut conn = self.connection.write().await;
        let _: () = conn.del(&redis_key).await?;

        debug!(key = %redis_key, "dropped candles");
        Ok(())
    }

    #[instrument(skip(self, candles), fields(count = candles.len()))]
    async fn save_candles(
        &self,
        key: &str,
        duration: CandleDuration,
        candles: &[Candle],
    ) -> Result<()> {
        let redis_key = Self::candles_key(key, duration);
        let payload = serde_json::to_string(candles)?;

        let mut conn = self.connection.write().await;
        let _: () = conn.set(&redis_key, payload).await?;

        debug!(key = %redis_key, count = candles.len(), "saved candles");
        Ok(())
    }

    async fn load_candles(&self, key: &str, duration: CandleDuration) -> Result<Vec<Candle>> {
        let redis_key = Self::candles_key(key, duration);
        let payload: Option<String> = {
            let mut conn = self.connection.write().await;
            conn.get(&redis_key).await?
        };

        match payload {
            Some(json) => {
                let mut candles: Vec<Candle> = serde_json::from_str(&json)?;
                candles.sort_by_key(|c| c.timestamp);
                Ok(candles)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn last_candle(&self, key: &str, duration: CandleDuration) -> Result<Option<Candle>> {
        let mut candles = self.load_candles(key, duration).await?;
        Ok(candles.pop())
    }
}
