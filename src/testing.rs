//! Recording collaborators shared by unit tests.

use crate::{
    navigate::{Navigator, Route},
    notify::{Notification, Notifier},
    session::{MemoryStore, SessionError, SessionStore, USER_ID},
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.routes.lock().unwrap().push(route.clone());
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Store whose writes are silently lost.
#[derive(Debug, Default)]
pub(crate) struct LossyStore;

#[async_trait]
impl SessionStore for LossyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, SessionError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Store that accepts every write except `userId`.
#[derive(Debug, Default)]
pub(crate) struct UserIdWriteFails {
    pub(crate) inner: MemoryStore,
}

#[async_trait]
impl SessionStore for UserIdWriteFails {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        if key == USER_ID {
            return Err(SessionError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.inner.remove(key).await
    }
}
