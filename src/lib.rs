pub mod api;
pub mod config;
pub mod controller;
pub mod input;
pub mod session;
pub mod ui;
