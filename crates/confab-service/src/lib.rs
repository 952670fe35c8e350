pub mod auth;
pub mod availability;
pub mod context;
pub mod error;
pub mod meeting;
pub mod user;
