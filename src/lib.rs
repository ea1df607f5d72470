pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod db;
pub mod qr;
pub mod session;

pub use self::config::Config;
