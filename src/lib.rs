//! Client for the weekly direct labor (MOD) service: typed transport and
//! record operations, week validation, aggregation and terminal rendering.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod import;
pub mod models;
pub mod render;
pub mod service;
pub mod weeks;
