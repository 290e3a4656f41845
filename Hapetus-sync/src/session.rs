use async_trait::async_trait;
use tokio::sync::RwLock;

/// The signed-in user and the ID token sent with remote calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub id_token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            id_token: id_token.into(),
        }
    }
}

/// Source of the current session, `None` when nobody is signed in
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Option<Session>;
}

/// Session holder the app updates on sign-in and sign-out
#[derive(Debug, Default)]
pub struct SharedSession {
    inner: RwLock<Option<Session>>,
}

impl SharedSession {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }

    pub async fn sign_in(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    pub async fn sign_out(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for SharedSession {
    async fn current_session(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }
}
