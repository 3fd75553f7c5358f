/// State management module
///
/// This module handles all application state, including:
/// - The JSON catalog and managed storage (library.rs)
/// - Shared data structures (data.rs)
/// - Sort/filter queries and card reconciliation (gallery.rs)
/// - Tag text parsing for the tag editor (tags.rs)

pub mod data;
pub mod gallery;
pub mod library;
pub mod tags;
