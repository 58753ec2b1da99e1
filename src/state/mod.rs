/// State management module
///
/// This module handles all application state, including:
/// - The storage interface and its errors (store.rs)
/// - The SQLite catalog (library.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod library;
pub mod store;
