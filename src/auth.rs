//! Client-credentials authentication: token records, redacted secrets, and the session that
//! owns the bearer token lifecycle.

pub mod secret;
pub mod session;
pub mod token;

pub use secret::*;
pub use session::*;
pub use token::*;
