//! # Session Module
//!
//! Owns the OAuth credential lifecycle for the client process. Three pieces
//! live here:
//!
//! - [`TokenStore`] - durable persistence of the current credential, with a
//!   file-backed implementation for the CLI and an in-memory one for tests.
//! - [`AuthSession`] - the session state machine. It is the only component
//!   that mutates the credential, and it guarantees at most one token
//!   refresh is ever in flight; concurrent refresh requesters attach to the
//!   same outcome instead of racing each other with competing round trips.
//! - [`AuthenticatedTransport`] - wraps outbound API calls, injecting the
//!   bearer token and retrying exactly once after a transparent refresh when
//!   the server rejects the credential.
//!
//! Everything else in the crate treats the credential as read-only.

mod auth;
mod store;
mod transport;

pub use auth::AuthSession;
pub use store::FileTokenStore;
pub use store::MemoryTokenStore;
pub use store::TokenStore;
pub use transport::AuthenticatedTransport;
