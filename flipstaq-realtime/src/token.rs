//! Token Store
//!
//! The channel client reads its bearer token through this seam instead of
//! global state. Applications back it with whatever persistence they use;
//! tests and short-lived tools use `StaticTokenStore`.

/// Source of the bearer token used to authenticate the connection.
pub trait TokenStore: Send {
    /// Returns the current token, or `None` when logged out.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed in-memory token.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    /// Creates a store holding the given token.
    pub fn new(token: &str) -> Self {
        StaticTokenStore {
            token: Some(token.to_string()),
        }
    }

    /// Creates a store with no token (connects will be refused).
    pub fn empty() -> Self {
        StaticTokenStore::default()
    }
}

impl TokenStore for StaticTokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
