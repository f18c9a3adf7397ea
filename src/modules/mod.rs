pub mod auth;
pub mod disciplines;
pub mod invites;
pub mod registration;
pub mod schools;
pub mod users;
