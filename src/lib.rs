//! REST backend for the Iwo news site: account signup, email verification,
//! login and password change, plus news-article CRUD.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod mail;
pub mod news;
pub mod state;
