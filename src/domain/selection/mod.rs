//! Selected-text snapshot cached across page loads.

mod snapshot;

pub use snapshot::{SelectionSnapshot, DEFAULT_SELECTION_TTL};
