//! Locally held restaurant identity

use shared::models::{Restaurant, RestaurantStatus};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{ClientError, ClientResult};

/// The restaurant this client acts for; scopes the socket room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantSession {
    pub restaurant_id: String,
    pub name: String,
    pub status: RestaurantStatus,
    pub dine_in_available: bool,
}

impl From<Restaurant> for RestaurantSession {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            restaurant_id: restaurant.id,
            name: restaurant.name,
            status: restaurant.status,
            dine_in_available: restaurant.dine_in_available,
        }
    }
}

/// Shared, cloneable view of the current session
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<RestaurantSession>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<RestaurantSession> {
        self.inner.read().await.clone()
    }

    /// Restaurant id, or `NoSession` before a restaurant is loaded
    pub async fn restaurant_id(&self) -> ClientResult<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.restaurant_id.clone())
            .ok_or(ClientError::NoSession)
    }

    pub async fn set(&self, session: RestaurantSession) {
        *self.inner.write().await = Some(session);
    }

    /// Apply `f` to the held session; `NoSession` if there is none
    pub async fn update<F>(&self, f: F) -> ClientResult<RestaurantSession>
    where
        F: FnOnce(&mut RestaurantSession),
    {
        let mut guard = self.inner.write().await;
        let session = guard.as_mut().ok_or(ClientError::NoSession)?;
        f(session);
        Ok(session.clone())
    }

    pub async fn clear(&self) {
        self.inner.write().await.take();
    }
}
