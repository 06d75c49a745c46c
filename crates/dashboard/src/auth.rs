//! Signed-in user
//!
//! The console keeps the user it signed in under the `user` key of local
//! storage. Only the API token is read here.

use serde::Deserialize;

const USER_KEY: &str = "user";

#[derive(Debug, Deserialize)]
struct StoredUser {
    #[serde(default)]
    token: Option<String>,
}

/// Token from a stored user record, if it holds a non-empty one
pub fn token_from_json(json: &str) -> Option<String> {
    match serde_json::from_str::<StoredUser>(json) {
        Ok(user) => user.token.filter(|token| !token.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed stored user");
            None
        }
    }
}

/// Token of the signed-in user, if any
pub fn stored_token() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let json = storage.get_item(USER_KEY).ok()??;
    token_from_json(&json)
}
