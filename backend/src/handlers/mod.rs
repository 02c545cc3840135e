pub mod admin;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod dashboard;
pub mod home;
pub mod listings;
