// src/lib.rs

//! Search-engine index publisher library

pub mod clients;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
