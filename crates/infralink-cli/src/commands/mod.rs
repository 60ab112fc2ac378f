pub mod check;
pub mod config;
pub mod list;
pub mod provision;
