use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::middleware::identity_middleware;
use crate::features::auth::{AuthenticatedUser, JwtValidator};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        issuer: None,
        jwt_leeway: Duration::from_secs(0),
    }
}

pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser::new(Uuid::new_v4(), Some("user".to_string()))
}

/// `Authorization` header value carrying a valid token for `user`
pub fn bearer_for(user: &AuthenticatedUser) -> String {
    let claims = json!({
        "user_id": user.user_id.to_string(),
        "role": user.role,
        "exp": Utc::now().timestamp() + 3600,
    });

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    format!("Bearer {}", token)
}

/// Resolve identities the same way the server does
pub fn with_identity(router: Router) -> Router {
    let validator = Arc::new(JwtValidator::new(&test_auth_config()));
    router.route_layer(axum::middleware::from_fn_with_state(
        validator,
        identity_middleware,
    ))
}
