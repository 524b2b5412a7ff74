pub mod auth;
pub mod exercise;
pub mod profile;
pub mod report;
pub mod workout;
