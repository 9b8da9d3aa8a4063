//! # API Module
//!
//! HTTP endpoints for the local callback server that completes the OAuth
//! flow. Two routes exist:
//!
//! - [`callback`] - receives the redirect from Spotify's authorization
//!   server and hands the code (or the user's denial) to the session for
//!   the PKCE exchange.
//! - [`health`] - a status and version probe.
//!
//! The handlers are plain [Axum](https://docs.rs/axum) async functions; the
//! session travels alongside them as an `Extension` layer. The server only
//! lives for the duration of a login.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
