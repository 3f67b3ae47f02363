// src/services/mod.rs
pub mod allocation;
pub mod export;
pub mod forecast;
pub mod registry;
pub mod simulation;
