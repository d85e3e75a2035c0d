use super::model::AuthenticatedUser;
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

/// Validates HS256 bearer tokens issued by the account service
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(rename = "exp")]
    _exp: u64,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.validate_nbf = true;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;

        // `user_id` is the issuer's own claim; `sub` is accepted for standard tokens
        let raw_id = claims
            .user_id
            .or(claims.sub)
            .ok_or_else(|| AppError::Auth("Token has no user identifier".to_string()))?;

        let user_id = Uuid::parse_str(&raw_id)
            .map_err(|_| AppError::Auth("Token user identifier is not a UUID".to_string()))?;

        let role = claims.role.filter(|r| !r.is_empty());

        Ok(AuthenticatedUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::Duration;

    const SECRET: &str = "test-secret";

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            issuer: issuer.map(str::to_string),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn exp_in(secs: i64) -> i64 {
        Utc::now().timestamp() + secs
    }

    #[test]
    fn test_valid_token_with_user_id_claim() {
        let validator = JwtValidator::new(&config(None));
        let user_id = Uuid::new_v4();
        let token = sign(
            json!({ "user_id": user_id.to_string(), "role": "user", "exp": exp_in(3600) }),
            SECRET,
        );

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role.as_deref(), Some("user"));
    }

    #[test]
    fn test_sub_claim_is_accepted() {
        let validator = JwtValidator::new(&config(None));
        let user_id = Uuid::new_v4();
        let token = sign(json!({ "sub": user_id.to_string(), "exp": exp_in(3600) }), SECRET);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert!(user.role.is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let token = sign(
            json!({ "user_id": Uuid::new_v4().to_string(), "exp": exp_in(-3600) }),
            SECRET,
        );

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let token = sign(
            json!({ "user_id": Uuid::new_v4().to_string(), "exp": exp_in(3600) }),
            "another-secret",
        );

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let token = sign(json!({ "user_id": "../../etc", "exp": exp_in(3600) }), SECRET);

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_issuer_is_enforced_when_configured() {
        let validator = JwtValidator::new(&config(Some("filevault")));
        let user_id = Uuid::new_v4().to_string();

        let good = sign(
            json!({ "user_id": user_id, "iss": "filevault", "exp": exp_in(3600) }),
            SECRET,
        );
        let bad = sign(
            json!({ "user_id": user_id, "iss": "elsewhere", "exp": exp_in(3600) }),
            SECRET,
        );

        assert!(validator.validate_token(&good).is_ok());
        assert!(validator.validate_token(&bad).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}
