pub mod api;
pub mod page;
pub mod responses;
pub mod router;
pub mod state;
pub mod templates;

pub use state::AppState;
