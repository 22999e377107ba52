//! Auth-domain identifiers, redacted secrets, client credentials, passwords, and sessions.

pub mod credentials;
pub mod id;
pub mod password;
pub mod secret;
pub mod session;

pub use credentials::*;
pub use id::*;
pub use password::*;
pub use secret::*;
pub use session::*;
