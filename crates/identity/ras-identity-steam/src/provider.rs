//! Steam OpenID 2.0 sign-in.

use crate::client::{ConfirmationTransport, HttpConfirmationTransport};
use crate::config::SteamSignInConfig;
use crate::error::{SteamAuthError, SteamAuthResult};
use crate::params::{CallbackParameters, OPENID_NS, SignedParameterSet};
use crate::realm::Realm;
use crate::steam_id::SteamId;
use std::sync::Arc;
use tracing::{debug, info};
use url::form_urlencoded;

/// Claimed id and identity sent when the user has not picked an identity yet.
const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Builds Steam login redirects and verifies the callbacks that come back.
///
/// Holds only immutable state, so a single instance can serve any number of
/// concurrent logins.
#[derive(Clone)]
pub struct SteamSignIn {
    realm: Realm,
    config: SteamSignInConfig,
    transport: Arc<dyn ConfirmationTransport>,
}

impl SteamSignIn {
    /// Create a verifier for `realm`, e.g. `"https://example.com"`, confirming
    /// logins with Steam over HTTPS.
    pub fn new(realm: &str) -> SteamAuthResult<Self> {
        Self::with_config(realm, SteamSignInConfig::default())
    }

    pub fn with_config(realm: &str, config: SteamSignInConfig) -> SteamAuthResult<Self> {
        let transport = Arc::new(HttpConfirmationTransport::new(config.http_timeout_seconds)?);
        Self::with_transport(realm, config, transport)
    }

    /// Create a verifier that confirms logins through `transport`.
    pub fn with_transport(
        realm: &str,
        config: SteamSignInConfig,
        transport: Arc<dyn ConfirmationTransport>,
    ) -> SteamAuthResult<Self> {
        Ok(Self {
            realm: Realm::parse(realm)?,
            config,
            transport,
        })
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// URL to redirect the user to for login.
    ///
    /// `return_url` is where Steam sends the user afterwards. It is passed
    /// through unchanged and must belong to this verifier's realm.
    pub fn auth_url(&self, return_url: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("openid.claimed_id", IDENTIFIER_SELECT)
            .append_pair("openid.identity", IDENTIFIER_SELECT)
            .append_pair("openid.mode", "checkid_setup")
            .append_pair("openid.ns", OPENID_NS)
            .append_pair("openid.realm", self.realm.as_str())
            .append_pair("openid.return_to", return_url)
            .finish();

        debug!(realm = %self.realm, "Generated Steam login URL");

        format!("{}?{}", self.config.login_endpoint, query)
    }

    /// Verify a login callback with Steam and return the user's SteamID.
    ///
    /// `callback_url` is the full URL the user was sent back to, or just its
    /// path and query. Exactly one request is made to Steam, and only after
    /// every local check has passed. Nonces are not tracked here; replay
    /// protection relies on Steam rejecting a reused `response_nonce`.
    #[tracing::instrument(
        name = "SteamSignIn::verify_login",
        skip_all,
        fields(realm = %self.realm)
    )]
    pub async fn verify_login(&self, callback_url: &str) -> SteamAuthResult<SteamId> {
        let (signed_set, steam_id) = self.check_callback(callback_url).inspect_err(|e| {
            debug!("Rejected Steam callback: {}", e);
        })?;

        self.confirm(&signed_set).await?;

        info!(steam_id = %steam_id, "Steam login verified");
        Ok(steam_id)
    }

    /// Local checks, in order. Returns the set to confirm and the provisional
    /// SteamID.
    fn check_callback(
        &self,
        callback_url: &str,
    ) -> SteamAuthResult<(SignedParameterSet, SteamId)> {
        let params = CallbackParameters::from_callback_url(callback_url)?;
        params.ensure_assertion_mode()?;

        let signed_set = params.into_signed_set()?;

        let return_realm = Realm::parse(signed_set.return_to()?)?;
        if return_realm != self.realm {
            return Err(SteamAuthError::RealmMismatch {
                expected: self.realm.to_string(),
                actual: return_realm.to_string(),
            });
        }

        let steam_id = SteamId::from_claimed_id(signed_set.claimed_id().unwrap_or_default())?;

        Ok((signed_set, steam_id))
    }

    async fn confirm(&self, signed_set: &SignedParameterSet) -> SteamAuthResult<()> {
        self.transport
            .post_form(&self.config.login_endpoint, signed_set.to_form_body())
            .await?
            .into_result()
    }
}
