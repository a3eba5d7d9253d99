use crate::domain::favorite::Favorite;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Reserves the next user id.
    async fn next_id(&self) -> Result<i64>;
    async fn save_user(&self, user: User) -> Result<()>;
    /// Saves the user unless another user already owns its mail, checking
    /// and writing under one lock. Returns false when the mail is taken.
    async fn save_user_if_mail_free(&self, user: User) -> Result<bool>;
    async fn find_user_by_mail(&self, mail: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Removes the user and every favorite it owns. Returns false if absent.
    async fn delete_user(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Returns false when the link already existed.
    async fn insert_favorite(&self, favorite: Favorite) -> Result<bool>;
    /// Returns false when there was no such link.
    async fn delete_favorite(&self, favorite: Favorite) -> Result<bool>;
    async fn list_favorites(&self, id_user: i64) -> Result<Vec<Favorite>>;
}
