pub mod api;
pub mod input;
pub mod models;
