use crate::config::JwtSettings;
use crate::database::CalendarStore;
use crate::models::AuthenticatedUser;
use crate::utils::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// JWT Claims. The identity service puts the user id in `id`; `sub` is accepted too.
// `aud` and `iss` are checked only when the token carries them.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // user id (hex ObjectId)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>, // issued at
    pub exp: usize, // expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>, // audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>, // issuer
}

impl Claims {
    pub fn user_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.sub.as_deref())
    }
}

const AUTH_FAILED: &str = "Authentication Failed";

// Verify JWT token
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);

    let mut issuers = HashSet::new();
    issuers.insert(settings.issuer.clone());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::debug!("Token rejected: {}", e);
        AppError::Unauthenticated(AUTH_FAILED.to_string())
    })
}

/// Loads the user named by the token. A well-formed token for a user that
/// no longer exists is rejected like a bad token.
pub async fn resolve_user(store: &dyn CalendarStore, claims: &Claims) -> Result<AuthenticatedUser, AppError> {
    let user_id = claims
        .user_id()
        .and_then(|id| ObjectId::parse_str(id).ok())
        .ok_or_else(|| AppError::Unauthenticated(AUTH_FAILED.to_string()))?;

    store
        .find_user(&user_id)
        .await?
        .map(AuthenticatedUser::from)
        .ok_or_else(|| AppError::Unauthenticated(AUTH_FAILED.to_string()))
}

/// Signs a token the way the identity service does
#[cfg(test)]
pub fn issue_token(user_id: &str, settings: &JwtSettings) -> String {
    use chrono::{Duration, Utc};

    let claims = Claims {
        id: Some(user_id.to_string()),
        iat: Some(Utc::now().timestamp() as usize),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        aud: Some(settings.audience.clone()),
        iss: Some(settings.issuer.clone()),
        ..Default::default()
    };

    sign(&claims, settings)
}

#[cfg(test)]
pub fn sign<T: Serialize>(claims: &T, settings: &JwtSettings) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(settings.secret.as_ref()),
    )
    .expect("token encodes")
}

#[cfg(test)]
pub fn test_settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret".to_string(),
        issuer: "calendar-service".to_string(),
        audience: "calendar-api".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::User;

    #[test]
    fn test_verify_round_trip() {
        let settings = test_settings();
        let token = issue_token("64b7f0c2a1b2c3d4e5f60718", &settings);
        let claims = verify_token(&token, &settings).unwrap();
        assert_eq!(claims.user_id(), Some("64b7f0c2a1b2c3d4e5f60718"));
    }

    #[test]
    fn test_accepts_minimal_identity_token() {
        let settings = test_settings();
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = sign(&serde_json::json!({ "id": "64b7f0c2a1b2c3d4e5f60718", "exp": exp }), &settings);
        let claims = verify_token(&token, &settings).unwrap();
        assert_eq!(claims.user_id(), Some("64b7f0c2a1b2c3d4e5f60718"));
        assert_eq!(claims.aud, None);
    }

    #[test]
    fn test_sub_is_used_when_id_is_absent() {
        let settings = test_settings();
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = sign(
            &serde_json::json!({
                "sub": "64b7f0c2a1b2c3d4e5f60718",
                "exp": exp,
                "aud": settings.audience,
                "iss": settings.issuer,
            }),
            &settings,
        );
        let claims = verify_token(&token, &settings).unwrap();
        assert_eq!(claims.user_id(), Some("64b7f0c2a1b2c3d4e5f60718"));

        let id_wins = Claims { id: Some("a".into()), sub: Some("b".into()), ..Default::default() };
        assert_eq!(id_wins.user_id(), Some("a"));
    }

    #[test]
    fn test_rejects_wrong_issuer_when_present() {
        let settings = test_settings();
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = sign(
            &serde_json::json!({ "id": "64b7f0c2a1b2c3d4e5f60718", "exp": exp, "iss": "someone-else" }),
            &settings,
        );
        assert!(verify_token(&token, &settings).is_err());
    }

    #[test]
    fn test_rejects_foreign_secret_and_audience() {
        let settings = test_settings();
        let token = issue_token("64b7f0c2a1b2c3d4e5f60718", &settings);

        let other_secret = JwtSettings { secret: "other".into(), ..test_settings() };
        assert!(matches!(verify_token(&token, &other_secret), Err(AppError::Unauthenticated(_))));

        let other_audience = JwtSettings { audience: "billing-api".into(), ..test_settings() };
        assert!(verify_token(&token, &other_audience).is_err());
        assert!(verify_token("not-a-jwt", &settings).is_err());
    }

    #[tokio::test]
    async fn test_resolve_user_requires_existing_user() {
        let store = MemoryStore::new();
        let known = ObjectId::new();
        store
            .insert_user(User { id: known, email: "a@example.com".into(), name: None, starred_events: vec![] })
            .await;

        let claims = |id: String| Claims { id: Some(id), ..Default::default() };

        let user = resolve_user(&store, &claims(known.to_hex())).await.unwrap();
        assert_eq!(user.id, known);

        let missing = resolve_user(&store, &claims(ObjectId::new().to_hex())).await;
        assert!(matches!(missing, Err(AppError::Unauthenticated(_))));

        let garbage = resolve_user(&store, &claims("42".into())).await;
        assert!(matches!(garbage, Err(AppError::Unauthenticated(_))));

        let anonymous = resolve_user(&store, &Claims::default()).await;
        assert!(matches!(anonymous, Err(AppError::Unauthenticated(_))));
    }
}
