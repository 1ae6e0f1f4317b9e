use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::COOKIE, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthToken, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Name of the cookie the hosted auth SDK stores the access token under.
const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Authentication middleware. Accepts the identity token from either the
/// Authorization header or the auth SDK's cookie, verifies it, and stores
/// the `User` and raw `AuthToken` in request extensions for handlers.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)
        .ok_or_else(|| AppError::Auth("Please sign in to continue".to_string()))?;

    let user = validate_token(&token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(AuthToken(token));

    Ok(next.run(request).await)
}

fn extract_token<B>(request: &Request<B>) -> Option<String> {
    if let Some(value) = request.headers().get("Authorization") {
        if let Ok(auth_value) = value.to_str() {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    // Browser clients carry the token in the auth SDK's cookie instead.
    let cookies = request.headers().get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == ACCESS_TOKEN_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/patients/profile");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn prefers_the_authorization_header() {
        let request = request_with_headers(&[
            ("Authorization", "Bearer header-token"),
            ("Cookie", "sb-access-token=cookie-token"),
        ]);
        assert_eq!(extract_token(&request).as_deref(), Some("header-token"));
    }

    #[test]
    fn falls_back_to_the_access_token_cookie() {
        let request = request_with_headers(&[(
            "Cookie",
            "theme=dark; sb-access-token=cookie-token; lang=en",
        )]);
        assert_eq!(extract_token(&request).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn returns_none_without_credentials() {
        let request = request_with_headers(&[("Cookie", "theme=dark")]);
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn ignores_non_bearer_authorization_schemes() {
        let request = request_with_headers(&[("Authorization", "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_token(&request), None);
    }
}
