//! Glossary core: language registry, wide term view, default data and
//! entry reconciliation.

pub mod languages;
pub mod models;
pub mod reconcile;
pub mod seed;
pub mod store;

pub use languages::{list_languages, register_language};
pub use models::{Language, OperationResult, RawTermId, TranslationInput, WideTerm};
pub use reconcile::{EntryChanges, delete_entry, insert_entry, update_entry};
pub use seed::seed_if_empty;
pub use store::{filter_wide, list_wide};
