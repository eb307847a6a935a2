//! Credential pool and round-robin rotation.
//!
//! The pool is immutable after startup and shared by reference count. Every
//! session owns its own [`KeyRotator`], so a rotation triggered by one user's
//! rate-limited retry never moves the cursor under another user.

use std::sync::Arc;

use embrace_types::Credential;

use crate::GenerationError;

/// Ordered credentials for the remote generation service.
#[derive(Debug, Clone, Default)]
pub struct CredentialPool {
    credentials: Arc<[Credential]>,
}

impl CredentialPool {
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }

    /// Build from raw strings, dropping blanks.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(raw.into_iter().filter_map(|s| Credential::new(s).ok()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// A fresh cursor positioned on the first credential.
    #[must_use]
    pub fn rotator(&self) -> KeyRotator {
        KeyRotator {
            pool: self.clone(),
            index: 0,
        }
    }
}

/// Cursor over a [`CredentialPool`].
///
/// Invariant: `index < pool.len()` whenever the pool is non-empty.
#[derive(Debug, Clone)]
pub struct KeyRotator {
    pool: CredentialPool,
    index: usize,
}

impl KeyRotator {
    pub fn current(&self) -> Result<&Credential, GenerationError> {
        self.pool
            .credentials
            .get(self.index)
            .ok_or(GenerationError::Unavailable)
    }

    /// Advance to the next credential. No-op for pools of zero or one.
    pub fn rotate(&mut self) {
        let len = self.pool.len();
        if len <= 1 {
            return;
        }
        self.index = (self.index + 1) % len;
        tracing::info!(credential_slot = self.index + 1, "Switched generation credential");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}
