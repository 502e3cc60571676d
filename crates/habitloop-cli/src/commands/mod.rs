pub mod account;
pub mod config;
pub mod data;
pub mod habit;
pub mod helpers;
pub mod profile;
pub mod remind;
pub mod settings;
