/// State management module
///
/// This module handles all persistent state, including:
/// - The JSON metadata store (store.rs)
/// - The validated record type it holds (data.rs)
/// - Application configuration (config.rs)

pub mod config;
pub mod data;
pub mod store;
