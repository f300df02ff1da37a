pub mod activity;
pub mod auth;
pub mod boards;
pub mod cards;
pub mod comments;
pub mod error;
pub mod lists;
pub mod middleware;
