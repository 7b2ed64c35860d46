//! Application wiring: shared state and the HTTP server

pub mod server;
pub mod state;

pub use server::{handle_rejection, routes, run};
pub use state::{with_state, AppState};
