//! Process-local session store

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::{sync::RwLock, time::Instant};

use super::{SessionData, SessionStore};
use crate::error::AppResult;

/// Sessions kept in a map, expiring `lifetime` after their last save
pub struct MemorySessionStore {
    lifetime: Duration,
    sessions: RwLock<HashMap<String, (Instant, SessionData)>>,
}

impl MemorySessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|(expires_at, _)| *expires_at > Instant::now())
            .map(|(_, data)| data.clone()))
    }

    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, (expires_at, _)| *expires_at > now);
        sessions.insert(id.to_string(), (now + self.lifetime, data.clone()));
        Ok(())
    }

    async fn destroy(&self, id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sessions_expire_after_their_lifetime() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let data = SessionData {
            user_id: Some(1),
            ..SessionData::default()
        };
        store.save("abc", &data).await.unwrap();
        assert_eq!(store.load("abc").await.unwrap(), Some(data));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.load("abc").await.unwrap(), None);
    }
}
