//! Authentication service: password hashing, local JWT issuer, login, and refresh.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::LazyLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::db::Store;
use crate::errors::AppError;
use crate::models::user::User;
use crate::services::verifier::{SCOPE_TASKS_READ, SCOPE_TASKS_WRITE, SCOPE_USERS_ADMIN};

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// Hash checked for unknown accounts so both login failures cost one argon2 verify.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("decoy-password-never-issued").ok());

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub scope: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Space-separated scopes granted to a local user.
pub fn scopes_for(user: &User) -> String {
    let mut scopes = vec![SCOPE_TASKS_READ, SCOPE_TASKS_WRITE];
    if user.is_admin {
        scopes.push(SCOPE_USERS_ADMIN);
    }
    scopes.join(" ")
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(user: &User, jwt: &JwtConfig) -> Result<TokenPair, AppError> {
    let now = Utc::now();
    let encoding_key = EncodingKey::from_secret(jwt.secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    let access_claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        iss: jwt.issuer.clone(),
        aud: jwt.audience.clone(),
        scope: scopes_for(user),
        token_type: ACCESS.to_string(),
        exp: (now + Duration::seconds(jwt.access_token_expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let refresh_claims = Claims {
        token_type: REFRESH.to_string(),
        exp: (now + Duration::seconds(jwt.refresh_token_expiry_secs)).timestamp(),
        ..access_claims.clone()
    };

    let access_token = jsonwebtoken::encode(&header, &access_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let refresh_token = jsonwebtoken::encode(&header, &refresh_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt.access_token_expiry_secs,
    })
}

/// Validate a locally issued JWT and return the claims.
///
/// The algorithm is pinned to HS256 and the issuer must match.
pub fn validate_token(token: &str, jwt: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(jwt.secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[jwt.issuer.as_str()]);
    match jwt.audience {
        Some(ref aud) => validation.set_audience(&[aud.as_str()]),
        None => validation.validate_aud = false,
    }

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// Authenticate a user by email and password, returning a token pair.
pub async fn login(
    store: &dyn Store,
    email: &str,
    password: &str,
    jwt: &JwtConfig,
) -> Result<TokenPair, AppError> {
    let Some(user) = store.find_user_by_email(email).await? else {
        if let Some(decoy) = DECOY_HASH.as_deref() {
            verify_password(password, decoy)?;
        }
        tracing::info!("Login failed: unknown account");
        return Err(AppError::Unauthorized);
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = user.id, "User logged in");
    generate_tokens(&user, jwt)
}

/// Refresh an access token using a valid refresh token.
pub async fn refresh_token(
    store: &dyn Store,
    refresh_token_str: &str,
    jwt: &JwtConfig,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, jwt).map_err(|_| AppError::Unauthorized)?;

    if claims.token_type != REFRESH {
        return Err(AppError::Unauthorized);
    }

    let user = store
        .find_user(claims.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    generate_tokens(&user, jwt)
}

/// True when the claims describe a usable access token.
pub fn is_access_token(claims: &Claims) -> bool {
    claims.token_type == ACCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::user::NewUser;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt".to_string(),
            issuer: "task-manager".to_string(),
            audience: None,
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 604800,
        }
    }

    fn user(is_admin: bool) -> User {
        User {
            id: 7,
            email: "test@example.com".to_string(),
            first_name: None,
            last_name: None,
            password_hash: "hash".to_string(),
            is_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let config = jwt();
        let tokens = generate_tokens(&user(false), &config).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);

        let claims = validate_token(&tokens.access_token, &config).unwrap();
        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.user_id, 7);
        assert!(is_access_token(&claims));
        assert_eq!(claims.scope, "tasks:read tasks:write");

        let refresh_claims = validate_token(&tokens.refresh_token, &config).unwrap();
        assert_eq!(refresh_claims.token_type, "refresh");
        assert!(!is_access_token(&refresh_claims));
    }

    #[test]
    fn admin_gets_admin_scope() {
        assert!(scopes_for(&user(true)).contains(SCOPE_USERS_ADMIN));
        assert!(!scopes_for(&user(false)).contains(SCOPE_USERS_ADMIN));
    }

    #[test]
    fn decoy_hash_is_a_real_argon2_hash() {
        let decoy = DECOY_HASH.as_deref().unwrap();
        assert!(decoy.starts_with("$argon2id$"));
        assert!(!verify_password("secret", decoy).unwrap());
        assert!(!verify_password("", decoy).unwrap());
    }

    #[test]
    fn invalid_token_rejected() {
        assert!(validate_token("garbage.token.here", &jwt()).is_err());
    }

    #[test]
    fn foreign_issuer_rejected() {
        let mut other = jwt();
        other.issuer = "someone-else".to_string();
        let tokens = generate_tokens(&user(false), &other).unwrap();
        assert!(validate_token(&tokens.access_token, &jwt()).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let mut config = jwt();
        // Expired well beyond the 60s leeway window
        config.access_token_expiry_secs = -3600;
        let tokens = generate_tokens(&user(false), &config).unwrap();
        assert!(validate_token(&tokens.access_token, &config).is_err());
    }

    #[tokio::test]
    async fn login_and_refresh() {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                email: "ann@example.com".to_string(),
                first_name: None,
                last_name: None,
                password_hash: hash_password("secret").unwrap(),
                is_admin: false,
            })
            .await
            .unwrap();
        let config = jwt();

        assert!(login(&store, "ann@example.com", "nope", &config).await.unwrap_err().is_unauthorized());
        assert!(login(&store, "bob@example.com", "secret", &config).await.unwrap_err().is_unauthorized());

        let pair = login(&store, "ann@example.com", "secret", &config).await.unwrap();
        let refreshed = refresh_token(&store, &pair.refresh_token, &config).await.unwrap();
        assert!(!refreshed.access_token.is_empty());

        // An access token is not a refresh token
        assert!(refresh_token(&store, &pair.access_token, &config).await.is_err());
    }
}
