pub mod board;
pub mod models;
