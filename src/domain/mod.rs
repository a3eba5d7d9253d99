pub mod error;
pub mod favorite;
pub mod repository;
pub mod user;
pub mod validation;
