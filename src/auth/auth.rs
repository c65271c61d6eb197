use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::auth::jwt::verify_token;
use crate::auth::AUTH_COOKIE;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;

/// The authenticated principal, extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let cookie = match req.cookie(AUTH_COOKIE) {
            Some(c) => c,
            None => return ready(Err(ApiError::Unauthorized("Missing session cookie"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(ApiError::Db(crate::error::DbError::Internal(
                    "Config missing".to_string(),
                ))))
            }
        };

        let claims = match verify_token(cookie.value(), &config.auth_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ApiError::Unauthorized("Invalid or expired session"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ApiError::Unauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
        }))
    }
}

impl AuthUser {
    /// The "Administrator" policy: the role claim must be exactly
    /// Administrator.
    pub fn require_administrator(&self) -> Result<(), ApiError> {
        if self.role == Role::Administrator {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Administrator only"))
        }
    }

    /// The "User" policy: administrator privilege implies user privilege.
    pub fn require_user(&self) -> Result<(), ApiError> {
        if matches!(self.role, Role::Administrator | Role::User) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("User only"))
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> AuthUser {
        AuthUser {
            user_id: "u-1".to_string(),
            username: "jdoe".to_string(),
            role,
        }
    }

    #[test]
    fn user_role_is_denied_administrator_policy() {
        let user = principal(Role::User);

        assert!(user.require_administrator().is_err());
        assert!(user.require_user().is_ok());
    }

    #[test]
    fn administrator_passes_both_policies() {
        let admin = principal(Role::Administrator);

        assert!(admin.require_administrator().is_ok());
        assert!(admin.require_user().is_ok());
    }
}
