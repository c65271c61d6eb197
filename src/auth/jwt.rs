use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::model::user::User;
use crate::models::Claims;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Builds the session token carried by the authentication cookie.
pub fn generate_session_token(user: &User, secret: &str, ttl: usize) -> String {
    let claims = Claims {
        user_id: user.id.clone(),
        sub: user.username.clone(),
        role: user.role_id,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            username: "jdoe".to_string(),
            password: "hash".to_string(),
            full_name: "Test User".to_string(),
            role_id: Role::User.id(),
            position_id: None,
        }
    }

    #[test]
    fn token_roundtrip() {
        let token = generate_session_token(&user(), "secret", 60);
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.sub, "jdoe");
        assert_eq!(claims.role, Role::User.id());
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let token = generate_session_token(&user(), "secret", 60);

        assert!(verify_token(&token, "other-secret").is_err());
        assert!(verify_token(&format!("{}x", token), "secret").is_err());
    }
}
