//! Session state machine toggled by external login/logout calls
//! (`spec.md` §4.6).

pub mod controller;
pub mod error;

pub use controller::SessionController;
pub use error::SessionError;
