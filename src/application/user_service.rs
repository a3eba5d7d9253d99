use crate::domain::error::DomainError;
use crate::domain::favorite::Favorite;
use crate::domain::repository::{FavoriteRepository, UserRepository};
use crate::domain::user::{Credentials, NewUser, Role, Session, User, UserUpdate};
use crate::domain::validation::Validate;
use crate::infrastructure::config::AdminSeed;
use crate::infrastructure::security::{generate_token, hash_password, verify_password};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

const INVALID_CREDENTIALS: &str = "Invalid mail or password";
const MAIL_TAKEN: &str = "User with this mail already exists";

/// User accounts and their favorite movies, as consumed by the HTTP routes.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn login(&self, credentials: Credentials) -> Result<Session>;
    async fn get_all(&self) -> Result<Vec<User>>;
    async fn create(&self, payload: NewUser) -> Result<User>;
    async fn update(&self, payload: UserUpdate) -> Result<User>;
    async fn delete_user_by_id(&self, id: i64) -> Result<()>;
    async fn get_all_favorites(&self, id_user: i64) -> Result<Vec<Favorite>>;
    async fn add_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite>;
    async fn remove_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite>;
}

pub struct DefaultUserService<R>
where
    R: UserRepository + FavoriteRepository,
{
    repository: Arc<R>,
    jwt_secret: String,
    token_ttl_secs: i64,
}

impl<R> DefaultUserService<R>
where
    R: UserRepository + FavoriteRepository,
{
    pub fn new(repository: Arc<R>, jwt_secret: String, token_ttl_secs: i64) -> Self {
        Self {
            repository,
            jwt_secret,
            token_ttl_secs,
        }
    }

    /// Creates the admin account, or promotes an existing account with that mail.
    #[instrument(skip(self, seed), fields(mail = %seed.mail))]
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<User> {
        if let Some(mut existing) = self.repository.find_user_by_mail(&seed.mail).await? {
            if existing.role != Role::Admin {
                existing.role = Role::Admin;
                existing.updated_at = Utc::now();
                self.repository.save_user(existing.clone()).await?;
                info!(user_id = existing.id, "Existing user promoted to admin");
            }
            return Ok(existing);
        }

        let payload = NewUser {
            first_name: "Admin".to_string(),
            last_name: "Admin".to_string(),
            user_name: "admin".to_string(),
            password: seed.password.clone(),
            mail: Some(seed.mail.clone()),
        };
        payload.validate().map_err(|message| {
            warn!(%message, "Admin seed rejected");
            DomainError::Validation(format!("Admin seed: {}", message))
        })?;

        let mut admin = self.create(payload).await?;
        admin.role = Role::Admin;
        self.repository.save_user(admin.clone()).await?;
        info!(user_id = admin.id, "Admin account seeded");
        Ok(admin)
    }

    async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| DomainError::Internal(format!("Password hashing task failed: {}", e)))?;
        hashed.map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e)).into()
        })
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool> {
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal(format!("Password check task failed: {}", e)))?;
        verified.map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e)).into()
        })
    }

    async fn store(&self, user: User) -> Result<()> {
        if !self.repository.save_user_if_mail_free(user).await? {
            warn!("Mail already in use");
            return Err(DomainError::Validation(MAIL_TAKEN.to_string()).into());
        }
        Ok(())
    }

    async fn require_user(&self, id: i64) -> Result<User> {
        self.repository.find_user_by_id(id).await?.ok_or_else(|| {
            warn!(user_id = id, "User not found");
            DomainError::NotFound(format!("User not found: {}", id)).into()
        })
    }
}

#[async_trait]
impl<R> UserService for DefaultUserService<R>
where
    R: UserRepository + FavoriteRepository,
{
    #[instrument(skip(self, credentials), fields(mail = ?credentials.mail))]
    async fn login(&self, credentials: Credentials) -> Result<Session> {
        trace!("Starting login");
        let (Some(mail), Some(password)) = (credentials.mail, credentials.password) else {
            warn!("Login attempted without mail or password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        };

        let user = self
            .repository
            .find_user_by_mail(&mail)
            .await?
            .ok_or_else(|| {
                warn!("User not found during login");
                DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        if !self.verify(password, user.password.clone()).await? {
            warn!(user_id = user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        let token = generate_token(
            user.id,
            user.role.as_str(),
            &self.jwt_secret,
            self.token_ttl_secs,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e))
        })?;

        info!(user_id = user.id, role = %user.role, "Login successful");
        Ok(Session { token })
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        self.repository.list_users().await
    }

    #[instrument(skip(self, payload), fields(user_name = %payload.user_name))]
    async fn create(&self, payload: NewUser) -> Result<User> {
        let password = self.hash(&payload.password).await?;
        let now = Utc::now();
        let user = User {
            id: self.repository.next_id().await?,
            first_name: payload.first_name,
            last_name: payload.last_name,
            user_name: payload.user_name,
            password,
            mail: payload.mail,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        debug!(user_id = user.id, "Saving user to repository");
        self.store(user.clone()).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self, payload), fields(user_id = payload.id, role = %payload.role))]
    async fn update(&self, payload: UserUpdate) -> Result<User> {
        let mut user = self.require_user(payload.id).await?;

        if let Some(password) = &payload.password {
            user.password = self.hash(password).await?;
        }
        if let Some(first_name) = payload.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = payload.last_name {
            user.last_name = last_name;
        }
        if let Some(user_name) = payload.user_name {
            user.user_name = user_name;
        }
        if payload.mail.is_some() {
            user.mail = payload.mail;
        }
        user.role = payload.role;
        user.updated_at = Utc::now();

        self.store(user.clone()).await?;
        info!(user_id = user.id, "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_user_by_id(&self, id: i64) -> Result<()> {
        if !self.repository.delete_user(id).await? {
            warn!(user_id = id, "User not found for deletion");
            return Err(DomainError::NotFound(format!("User not found: {}", id)).into());
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }

    async fn get_all_favorites(&self, id_user: i64) -> Result<Vec<Favorite>> {
        self.repository.list_favorites(id_user).await
    }

    #[instrument(skip(self))]
    async fn add_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite> {
        self.require_user(id_user).await?;

        let favorite = Favorite { id_user, id_movie };
        if !self.repository.insert_favorite(favorite).await? {
            warn!("Movie already in favorites");
            return Err(DomainError::Validation(format!(
                "Movie {} is already a favorite",
                id_movie
            ))
            .into());
        }
        info!("Favorite added");
        Ok(favorite)
    }

    #[instrument(skip(self))]
    async fn remove_favorite(&self, id_user: i64, id_movie: i64) -> Result<Favorite> {
        let favorite = Favorite { id_user, id_movie };
        if !self.repository.delete_favorite(favorite).await? {
            warn!("Favorite not found");
            return Err(DomainError::NotFound(format!(
                "Movie {} is not a favorite",
                id_movie
            ))
            .into());
        }
        info!("Favorite removed");
        Ok(favorite)
    }
}
