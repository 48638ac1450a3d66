pub mod access;
mod middleware;
mod password;
mod session;

pub use middleware::CurrentUser;
pub use password::CredentialHasher;
pub use session::{SessionClaims, SessionSigner};
