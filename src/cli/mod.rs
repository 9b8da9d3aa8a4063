//! # CLI Module
//!
//! The user-facing command layer. Each command is a thin coordinator: it
//! builds on the session and search modules, drives them, and renders the
//! results with tables, spinners, and the colored output macros. No
//! session or query state lives here.
//!
//! ## Commands
//!
//! - [`auth`] - runs the full OAuth PKCE login: starts the local callback
//!   server, opens the authorization URL in the browser, and waits for the
//!   callback to resolve the login one way or the other.
//! - [`logout`] - idempotent local-first logout; local credentials are
//!   cleared unconditionally.
//! - [`status`] - the startup probe: validates any persisted credential,
//!   refreshing at most once, and prints the cached profile.
//! - [`search`] - one-shot catalog search, or an interactive loop that
//!   feeds stdin lines through the debounced query pipeline.

mod auth;
mod search;
mod status;

pub use auth::auth;
pub use auth::logout;
pub use search::search;
pub use status::status;
