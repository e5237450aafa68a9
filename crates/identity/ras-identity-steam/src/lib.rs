//! Steam sign-in through OpenID 2.0.
//!
//! [`SteamSignIn`] builds the URL that sends a user to Steam for login, and
//! verifies the callback Steam redirects them back with. Verification checks
//! the callback locally (mode, signed fields, realm, claimed id) before
//! asking Steam to confirm the assertion, and yields the user's [`SteamId`].
//!
//! The confirmation request goes through a [`ConfirmationTransport`], so the
//! verification flow can run against a stub instead of the network.

mod client;
mod config;
mod error;
mod params;
mod provider;
mod realm;
mod steam_id;


pub use client::{ConfirmationResponse, ConfirmationTransport, HttpConfirmationTransport};
pub use config::{STEAM_LOGIN_ENDPOINT, SteamSignInConfig};
pub use error::{SteamAuthError, SteamAuthResult};
pub use params::{CallbackParameters, OPENID_NS, SignedParameterSet};
pub use provider::SteamSignIn;
pub use realm::Realm;
pub use steam_id::{AccountType, SteamId, Universe};
