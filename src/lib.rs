// src/lib.rs
pub mod api;
pub mod banner;
pub mod config;
pub mod errors;
pub mod image;
pub mod models;
pub mod normalizer;
pub mod payments;
pub mod providers;
pub mod resolver;
pub mod scan;
pub mod shutdown;
