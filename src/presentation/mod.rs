pub mod auth;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod validation;
