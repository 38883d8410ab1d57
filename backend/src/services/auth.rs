//! Authentication service for login, password change and token issuance

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{validate_password, Actor, AuditAction, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    audit: AuditService,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issued access token with the user it belongs to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// User row including the password hash
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: Option<String>,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Decode and validate a bearer token
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> AppResult<AuthTokens> {
        let email = email.trim().to_lowercase();
        let user = self.find_by_email(&email).await?;

        let user = match user {
            Some(user) if Self::verify_password(password, &user.password_hash)? => user,
            _ => {
                tracing::warn!(email = %email, "Login failed");
                self.audit
                    .record(
                        client,
                        AuditEntry::new(AuditAction::LoginFailed)
                            .by_email(&email)
                            .details("Invalid email or password"),
                    )
                    .await;
                return Err(AppError::InvalidCredentials);
            }
        };

        let user = user.into_user();
        let access_token = self.generate_token(&user)?;

        let actor = Actor {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        };
        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::LoginSuccess)
                    .by(&actor)
                    .entity("user", user.id, actor.display_name()),
            )
            .await;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
        })
    }

    /// Replace the caller's password after checking the current one
    pub async fn change_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
        client: &ClientInfo,
    ) -> AppResult<()> {
        validate_password(new_password)?;

        let stored = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(actor.user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if !Self::verify_password(current_password, &stored)? {
            self.audit
                .record(
                    client,
                    AuditEntry::new(AuditAction::LoginFailed)
                        .by(actor)
                        .details("Wrong current password on password change"),
                )
                .await;
            return Err(AppError::validation(
                "currentPassword",
                "Current password is incorrect",
                "Le mot de passe actuel est incorrect",
            ));
        }

        let password_hash = Self::hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(actor.user_id)
            .execute(&self.db)
            .await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::UserUpdated)
                    .by(actor)
                    .entity("user", actor.user_id, actor.display_name())
                    .details("Password changed"),
            )
            .await;

        Ok(())
    }

    /// Hash a password for storage
    pub fn hash_password(password: &str) -> AppResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
        verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, role, created_at
            FROM users
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    /// Generate an access token
    fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}
