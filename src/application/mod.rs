pub mod mail_service;
pub mod user_service;
