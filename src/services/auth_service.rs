use std::sync::Arc;

use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::auth::{self, JwtKeys};
use crate::repository::UserRepository;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Verify credentials and issue an access token.
    ///
    /// Unknown usernames and wrong passwords fail with the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<String> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            warn!(username = %username, "login for unknown user");
            return Err(ServiceError::InvalidCredentials);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash)).await?;

        if !matches {
            warn!(username = %user.username, "login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.keys.issue(user.public_id, user.role)?;
        info!(public_id = %user.public_id, role = %user.role, "user logged in");
        Ok(token)
    }
}
