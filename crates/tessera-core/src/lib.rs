//! # Tessera Core
//!
//! Core types, traits, and error definitions for Tessera.
//! Every other crate in the workspace builds on the error type and the
//! `User` entity defined here.

pub mod error;
pub mod result;
pub mod traits;
pub mod user;
pub mod validation;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use user::*;
pub use validation::*;
