pub mod app;
pub mod config;
pub mod consumption;
pub mod extractors;
pub mod foods;
pub mod nutrients;
pub mod search;
pub mod state;
