pub mod capture;
pub mod config;
pub mod error;
pub mod source;
pub mod state;
pub mod view;
