pub mod auth;
pub mod budget;
pub mod chat;
pub mod server;
pub mod user;
