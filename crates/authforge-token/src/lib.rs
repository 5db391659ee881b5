//! Proof-of-intent tokens for Authforge.
//!
//! This crate issues and verifies the two short-lived token classes used by
//! account flows:
//!
//! - **Signup tokens** ([`SignupClaim`]) — carried in the activation link
//!   mailed after registration. Valid for one hour.
//! - **Reset tokens** ([`ResetClaim`]) — carried in the password-reset link.
//!   Valid for fifteen minutes.
//!
//! Each class is signed with its own [`SigningKey`], so a reset token can
//! never be replayed as a signup token (and vice versa).
//!
//! # Where it sits
//!
//! ```text
//! Account flows (register / activate / reset)
//!     ↕
//! Token layer (this crate)  ← no storage, no network, just HMAC + JSON
//! ```
//!
//! Verification distinguishes two failure kinds on purpose:
//! [`TokenError::Malformed`] means the token was tampered with or corrupted,
//! while [`TokenError::Expired`] means it was genuine but arrived too late.
//! Callers render those very differently.

mod claims;
mod codec;
mod config;
mod error;
mod jwt;

pub use claims::{ResetClaim, SignupClaim};
pub use codec::{Clock, TokenCodec};
pub use config::{SigningKey, TokenConfig};
pub use error::TokenError;
