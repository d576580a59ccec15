pub mod config;
pub mod confirm;
pub mod detail;
pub mod form;
pub mod list;
pub mod render;
