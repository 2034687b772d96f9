/// State management module
///
/// This module handles all application state, including:
/// - Catalog connections and queries (library.rs)
/// - Shared data structures (data.rs)
/// - Status history projection for display (history.rs)
/// - The user's session (session.rs)

pub mod data;
pub mod history;
pub mod library;
pub mod session;
