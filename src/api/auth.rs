use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use crate::auth::AccessDecision;
use crate::errors::CiphertraceError;
use super::AppState;
use tracing::debug;

/// Bearer token from the `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's profile and apply the access policy to the request
/// path. Allowed requests carry the profile as an extension.
pub async fn access_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Owned copy: the request must not stay borrowed across the await.
    let token = bearer_token(request.headers()).map(str::to_string);
    let profile = match token {
        Some(token) => match state.auth.session(&token).await {
            Ok(profile) => profile,
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    match state.policy.evaluate(&path, profile.as_ref()) {
        AccessDecision::Public | AccessDecision::Allow => {
            if let Some(profile) = profile {
                request.extensions_mut().insert(profile);
            }
            next.run(request).await
        }
        AccessDecision::Unauthenticated => {
            debug!(path = %path, "Rejected unauthenticated request");
            CiphertraceError::Authentication("Sign in to continue".into()).into_response()
        }
        AccessDecision::Forbidden => {
            let role = profile.map(|p| p.role.to_string()).unwrap_or_default();
            CiphertraceError::Permission(format!("The {} role cannot access {}", role, path)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);
    }
}
