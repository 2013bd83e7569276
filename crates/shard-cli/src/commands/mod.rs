pub mod config;
pub mod inspect;
