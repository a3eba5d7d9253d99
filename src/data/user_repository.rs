use crate::domain::favorite::Favorite;
use crate::domain::repository::{FavoriteRepository, UserRepository};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct Storage {
    users: HashMap<i64, User>,
    favorites: BTreeSet<Favorite>,
}

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<Storage>>,
    sequence: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(Storage::default())),
            sequence: Arc::new(AtomicI64::new(0)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> Result<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn save_user(&self, user: User) -> Result<()> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        debug!(user_id = user.id, user_name = %user.user_name, "User saved to memory storage");
        storage.users.insert(user.id, user);
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn save_user_if_mail_free(&self, user: User) -> Result<bool> {
        let mut storage = self.storage.write().await;
        if let Some(mail) = user.mail.as_deref() {
            let taken = storage
                .users
                .values()
                .any(|u| u.id != user.id && u.mail.as_deref() == Some(mail));
            if taken {
                trace!("Mail owned by another user");
                return Ok(false);
            }
        }
        debug!(user_id = user.id, user_name = %user.user_name, "User saved to memory storage");
        storage.users.insert(user.id, user);
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn find_user_by_mail(&self, mail: &str) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage
            .users
            .values()
            .find(|u| u.mail.as_deref() == Some(mail))
            .cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, "User found in storage"),
            None => trace!("User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        Ok(storage.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let storage = self.storage.read().await;
        let mut users: Vec<User> = storage.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<bool> {
        let mut storage = self.storage.write().await;
        if storage.users.remove(&id).is_none() {
            trace!("User not found in storage");
            return Ok(false);
        }
        storage.favorites.retain(|f| f.id_user != id);
        debug!(user_id = id, "User and favorites removed from memory storage");
        Ok(true)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn insert_favorite(&self, favorite: Favorite) -> Result<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.favorites.insert(favorite))
    }

    #[instrument(skip(self))]
    async fn delete_favorite(&self, favorite: Favorite) -> Result<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.favorites.remove(&favorite))
    }

    async fn list_favorites(&self, id_user: i64) -> Result<Vec<Favorite>> {
        let storage = self.storage.read().await;
        let start = Favorite {
            id_user,
            id_movie: i64::MIN,
        };
        let end = Favorite {
            id_user,
            id_movie: i64::MAX,
        };
        Ok(storage.favorites.range(start..=end).copied().collect())
    }
}
