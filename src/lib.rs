pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod synth;
pub mod tools;
pub mod utils;
pub mod view;
