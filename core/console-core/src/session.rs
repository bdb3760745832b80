//! Explicit session context.
//!
//! The original console kept its access token in ambient module state; here
//! the token travels inside a `SessionContext` handed to the channel and to
//! every action call, with a `create → active → destroy` lifecycle. Each
//! context carries an epoch so a response that raced a teardown can be
//! recognized and discarded.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// One live console session: exactly one of these exists per tracked remote
/// cooperating session.
#[derive(Debug)]
pub struct SessionContext {
    token: String,
    epoch: u64,
    active: bool,
}

/// Cheap identity capture taken before issuing an async request; checked
/// again before the response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    epoch: u64,
}

impl SessionContext {
    pub fn create(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            epoch: NEXT_EPOCH.fetch_add(1, Ordering::Relaxed),
            active: true,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle { epoch: self.epoch }
    }

    /// True when a response captured under `handle` may still be applied.
    pub fn accepts(&self, handle: SessionHandle) -> bool {
        self.active && self.epoch == handle.epoch
    }

    /// Tears the session down. All responses captured before this point are
    /// rejected by [`SessionContext::accepts`] from now on.
    pub fn destroy(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_accepts_its_own_handle() {
        let session = SessionContext::create("secret");
        let handle = session.handle();
        assert!(session.accepts(handle));
        assert_eq!(session.token(), "secret");
    }

    #[test]
    fn destroyed_session_rejects_captured_handles() {
        let mut session = SessionContext::create("secret");
        let handle = session.handle();
        session.destroy();
        assert!(!session.accepts(handle));
        assert!(!session.is_active());
    }

    #[test]
    fn successor_session_rejects_predecessor_handles() {
        let first = SessionContext::create("one");
        let stale = first.handle();
        drop(first);
        let second = SessionContext::create("two");
        assert!(!second.accepts(stale));
    }
}
