//! Contributor identity resolution.
//!
//! The identity is derived on every call from whatever the auth session
//! provider reports right now; it is never cached, since sign-in, sign-out
//! and nickname edits can happen between any two engine commands.

use std::sync::{Arc, PoisonError, RwLock};

/// What the auth provider knows about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub nickname: Option<String>,
    pub email: Option<String>,
}

impl AuthSession {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            nickname: None,
            email: Some(email.into()),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

/// The auth session collaborator. `None` means anonymous.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<AuthSession>;
}

/// A mutable in-process session, driven by whatever performs sign-in.
#[derive(Debug, Default)]
pub struct SessionHandle {
    session: RwLock<Option<AuthSession>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(session: AuthSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    pub fn sign_in(&self, session: AuthSession) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn sign_out(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Change the nickname of the current session. No-op when signed out.
    pub fn set_nickname(&self, nickname: Option<String>) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            session.nickname = nickname;
        }
    }
}

impl SessionProvider for SessionHandle {
    fn current_session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    provider: Arc<dyn SessionProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    /// Nickname if set, else email, else `None` (anonymous).
    pub fn current(&self) -> Option<String> {
        let session = self.provider.current_session()?;
        non_blank(session.nickname).or_else(|| non_blank(session.email))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
