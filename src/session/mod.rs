//! Server-side sessions keyed by an opaque cookie id

pub mod memory;
pub mod redis;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    error::{AppError, AppResult},
    models::ReservationDraft,
    services::calendar::DayMap,
    AppState,
};

pub use memory::MemorySessionStore;
pub use redis::RedisSessionStore;

/// Everything the site keeps between requests for one visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Booking in progress, or the just-booked reservation awaiting its summary
    pub reservation: Option<ReservationDraft>,
    /// Logged-in back-office user
    pub user_id: Option<i32>,
    pub flash: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
    /// Block maps last shown on the admin calendar, by room id
    #[serde(default)]
    pub block_maps: BTreeMap<i32, DayMap>,
}

/// One-time messages for the next rendered page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Messages {
    pub flash: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
}

/// Persistence for session data
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>>;

    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()>;

    async fn destroy(&self, id: &str) -> AppResult<()>;
}

/// Session bound to the current request. Changes are written back by [`Session::commit`].
pub struct Session {
    id: String,
    data: SessionData,
    loaded: Option<SessionData>,
    stale_id: Option<String>,
    store: Arc<dyn SessionStore>,
    config: Arc<SessionConfig>,
}

impl Session {
    /// Load the session named by `cookie_value`, or start a fresh one
    pub async fn load(
        store: Arc<dyn SessionStore>,
        config: Arc<SessionConfig>,
        cookie_value: Option<&str>,
    ) -> AppResult<Self> {
        let existing = match cookie_value {
            Some(id) => store.load(id).await?.map(|data| (id.to_string(), data)),
            None => None,
        };

        // Unknown ids are never adopted, a new one is issued instead
        let (id, loaded) = match existing {
            Some((id, data)) => (id, Some(data)),
            None => (new_session_id(), None),
        };

        Ok(Self {
            id,
            data: loaded.clone().unwrap_or_default(),
            loaded,
            stale_id: None,
            store,
            config,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn reservation(&self) -> Option<&ReservationDraft> {
        self.data.reservation.as_ref()
    }

    pub fn put_reservation(&mut self, draft: ReservationDraft) {
        self.data.reservation = Some(draft);
    }

    /// Remove and return the reservation (read-once)
    pub fn take_reservation(&mut self) -> Option<ReservationDraft> {
        self.data.reservation.take()
    }

    pub fn put_flash(&mut self, message: impl Into<String>) {
        self.data.flash = Some(message.into());
    }

    pub fn put_error(&mut self, message: impl Into<String>) {
        self.data.error = Some(message.into());
    }

    pub fn put_warning(&mut self, message: impl Into<String>) {
        self.data.warning = Some(message.into());
    }

    /// Pop flash, error and warning so they show exactly once
    pub fn take_messages(&mut self) -> Messages {
        Messages {
            flash: self.data.flash.take(),
            error: self.data.error.take(),
            warning: self.data.warning.take(),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.data.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.user_id.is_some()
    }

    pub fn put_block_map(&mut self, room_id: i32, map: DayMap) {
        self.data.block_maps.insert(room_id, map);
    }

    pub fn block_map(&self, room_id: i32) -> Option<&DayMap> {
        self.data.block_maps.get(&room_id)
    }

    /// Forget the calendar state once its edits are applied
    pub fn take_block_maps(&mut self) -> BTreeMap<i32, DayMap> {
        std::mem::take(&mut self.data.block_maps)
    }

    /// Log a user in under a fresh session id
    pub fn login(&mut self, user_id: i32) {
        self.renew();
        self.data.user_id = Some(user_id);
    }

    /// Drop all session data and continue under a fresh id
    pub fn destroy(&mut self) {
        self.data = SessionData::default();
        self.renew();
    }

    /// Issue a new id for the same data; the old id is deleted on commit
    pub fn renew(&mut self) {
        let old = std::mem::replace(&mut self.id, new_session_id());
        if self.stale_id.is_none() && self.loaded.is_some() {
            self.stale_id = Some(old);
        }
        self.loaded = None;
    }

    /// Persist changes and return the cookie to send back
    pub async fn commit(self) -> AppResult<CookieJar> {
        if let Some(stale) = &self.stale_id {
            self.store.destroy(stale).await?;
        }

        let unchanged = self.loaded.as_ref() == Some(&self.data);
        let empty_and_new = self.loaded.is_none() && self.data == SessionData::default();
        if !unchanged && !empty_and_new {
            self.store.save(&self.id, &self.data).await?;
        }

        let cookie = Cookie::build((self.config.cookie_name.clone(), self.id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure);

        Ok(CookieJar::new().add(cookie))
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_value = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string());

        Session::load(
            state.sessions.clone(),
            Arc::new(state.config.session.clone()),
            cookie_value.as_deref(),
        )
        .await
    }
}
