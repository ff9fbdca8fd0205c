// src/api/handlers/mod.rs
mod aura;
mod checkout;
mod debug;
mod health;

pub use aura::analyze_aura;
pub use checkout::{client_config, create_checkout};
pub use debug::debug_gemini;
pub use health::health_check;
