//! Redis session store

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use super::{SessionData, SessionStore};
use crate::error::{AppError, AppResult};

/// Sessions stored as JSON under `session:{id}` with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    lifetime: Duration,
}

impl RedisSessionStore {
    /// Create a new store and check the server answers
    pub async fn new(url: &str, lifetime: Duration) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, lifetime })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to get Redis connection: {}", e)))
    }
}

fn key(id: &str) -> String {
    format!("session:{}", id)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(key(id))
            .await
            .map_err(|e| AppError::Session(format!("Failed to read session: {}", e)))?;

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // Unreadable payloads (e.g. from an older release) start over
                    tracing::warn!("Discarding undecodable session: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()> {
        let json = serde_json::to_string(data)
            .map_err(|e| AppError::Session(format!("Failed to encode session: {}", e)))?;

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key(id), json, self.lifetime.as_secs())
            .await
            .map_err(|e| AppError::Session(format!("Failed to store session: {}", e)))
    }

    async fn destroy(&self, id: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key(id))
            .await
            .map_err(|e| AppError::Session(format!("Failed to delete session: {}", e)))
    }
}
