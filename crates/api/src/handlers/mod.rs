pub mod assistant;
pub mod auth;
pub mod projects;
pub mod users;
