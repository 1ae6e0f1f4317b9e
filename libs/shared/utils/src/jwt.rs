use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

type HmacSha256 = Hmac<Sha256>;

/// Validate a Supabase-issued JWT (HS256) and extract the caller identity.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims
        .iat
        .map(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at: created_at.flatten(),
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn accepts_a_well_formed_token() {
        let test_user = TestUser::patient("jwt@example.com");
        let token = JwtTestUtils::create_test_token(&test_user, SECRET, None);

        let user = validate_token(&token, SECRET).expect("token should validate");
        assert_eq!(user.id, test_user.id);
        assert_eq!(user.role.as_deref(), Some("patient"));
    }

    #[test]
    fn rejects_expired_tokens() {
        let test_user = TestUser::patient("expired@example.com");
        let token = JwtTestUtils::create_expired_token(&test_user, SECRET);

        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let test_user = TestUser::patient("forged@example.com");
        let token = JwtTestUtils::create_invalid_signature_token(&test_user);

        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(validate_token("not-a-jwt", SECRET).is_err());
        assert!(validate_token(&JwtTestUtils::create_malformed_token(), SECRET).is_err());
    }

    #[test]
    fn rejects_everything_when_secret_is_unset() {
        let test_user = TestUser::patient("nosecret@example.com");
        let token = JwtTestUtils::create_test_token(&test_user, SECRET, None);

        assert!(validate_token(&token, "").is_err());
    }
}
