//! In-memory user directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use marea_domain::auth::User;
use marea_domain::ports::UserDirectory;
use marea_domain::{JobError, Result};

/// [`UserDirectory`] over a map keyed by email. Lookups are counted so
/// tests can assert that token-derived identities never hit the directory.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<String, User>>,
    lookups: AtomicUsize,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.email.clone(), user);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup_user_by_email(&self, email: &str) -> Result<User> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| JobError::Directory {
                message: format!("no user with email {email}"),
            })
    }
}
