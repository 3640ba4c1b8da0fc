//! JWT grant authentication: assertion signing, token exchange, and cached access tokens.

pub mod assertion;
pub mod manager;
pub mod secret;

pub use assertion::*;
pub use manager::*;
pub use secret::*;
