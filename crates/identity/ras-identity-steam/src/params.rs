//! Callback parameter extraction and signed-set enforcement.

use crate::error::{SteamAuthError, SteamAuthResult};
use std::collections::{BTreeMap, HashMap};
use url::Url;
use url::form_urlencoded;

/// OpenID 2.0 namespace URI.
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Only used to give path-only callbacks something to parse against.
const PLACEHOLDER_AUTHORITY: &str = "http://localhost";

/// Fields that are always sent back for confirmation.
const PASSTHROUGH_FIELDS: [&str; 3] = ["assoc_handle", "signed", "sig"];

/// Fields that must be covered by the provider's signature.
const VITAL_FIELDS: [&str; 3] = ["claimed_id", "return_to", "response_nonce"];

const ASSERTION_MODE: &str = "id_res";
const CHECK_AUTHENTICATION_MODE: &str = "check_authentication";

fn openid_key(field: &str) -> String {
    format!("openid.{}", field)
}

/// Query parameters of an untrusted callback URL.
#[derive(Debug, Clone, Default)]
pub struct CallbackParameters {
    params: HashMap<String, String>,
}

impl CallbackParameters {
    /// Parse the query string of `callback_url`, which may be absolute or a
    /// path starting with `/`. When a name repeats, its first value is kept.
    pub fn from_callback_url(callback_url: &str) -> SteamAuthResult<Self> {
        let url = if callback_url.starts_with('/') {
            Url::parse(&format!("{}{}", PLACEHOLDER_AUTHORITY, callback_url))?
        } else {
            Url::parse(callback_url)?
        };

        let mut params = HashMap::new();
        for (key, value) in url.query_pairs() {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        Ok(Self { params })
    }

    /// Look up `openid.<field>`.
    pub fn openid(&self, field: &str) -> Option<&str> {
        self.params.get(&openid_key(field)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The callback must carry `openid.mode=id_res`.
    pub fn ensure_assertion_mode(&self) -> SteamAuthResult<()> {
        let mode = self.openid("mode").unwrap_or_default();
        if mode != ASSERTION_MODE {
            return Err(SteamAuthError::ModeMismatch {
                actual: mode.to_string(),
            });
        }
        Ok(())
    }

    fn require(&self, field: &str) -> SteamAuthResult<&str> {
        self.openid(field)
            .ok_or_else(|| SteamAuthError::MissingParameter(openid_key(field)))
    }

    /// Collect the passthrough fields and every field named in
    /// `openid.signed`, check the vital fields are signed, and force the
    /// confirmation namespace and mode.
    pub fn into_signed_set(self) -> SteamAuthResult<SignedParameterSet> {
        let mut fields = BTreeMap::new();

        for field in PASSTHROUGH_FIELDS {
            let value = self.require(field)?;
            fields.insert(openid_key(field), value.to_string());
        }

        let signed: Vec<String> = self
            .require("signed")?
            .split(',')
            .map(str::to_string)
            .collect();

        for field in &signed {
            let value = self.require(field)?;
            fields.insert(openid_key(field), value.to_string());
        }

        if let Some(unsigned) = VITAL_FIELDS
            .iter()
            .find(|vital| !signed.iter().any(|field| field == *vital))
        {
            return Err(SteamAuthError::UnsignedVitalParameter(openid_key(unsigned)));
        }

        // Overwrite whatever the callback carried for these two.
        fields.insert(openid_key("ns"), OPENID_NS.to_string());
        fields.insert(openid_key("mode"), CHECK_AUTHENTICATION_MODE.to_string());

        Ok(SignedParameterSet { fields, signed })
    }
}

/// The parameters the provider signed, plus the passthrough fields, ready to
/// be sent back in a `check_authentication` request.
#[derive(Debug, Clone)]
pub struct SignedParameterSet {
    fields: BTreeMap<String, String>,
    signed: Vec<String>,
}

impl SignedParameterSet {
    /// Look up `openid.<field>`.
    pub fn openid(&self, field: &str) -> Option<&str> {
        self.fields.get(&openid_key(field)).map(String::as_str)
    }

    /// Field names listed in `openid.signed`, without the `openid.` prefix.
    pub fn signed_fields(&self) -> &[String] {
        &self.signed
    }

    /// `openid.return_to`, treating an empty value as absent.
    pub fn return_to(&self) -> SteamAuthResult<&str> {
        self.openid("return_to")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SteamAuthError::MissingParameter(openid_key("return_to")))
    }

    pub fn claimed_id(&self) -> Option<&str> {
        self.openid("claimed_id")
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Encode as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAIMED_ID: &str = "https://steamcommunity.com/openid/id/76561197960287930";

    fn callback(pairs: &[(&str, &str)]) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter().copied())
            .finish();
        format!("/auth/steam/callback?{}", query)
    }

    fn valid_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("openid.ns", OPENID_NS),
            ("openid.mode", "id_res"),
            ("openid.op_endpoint", "https://steamcommunity.com/openid/login"),
            ("openid.claimed_id", CLAIMED_ID),
            ("openid.identity", CLAIMED_ID),
            ("openid.return_to", "http://good.example/auth/steam/callback"),
            ("openid.response_nonce", "2024-01-01T00:00:00ZaBcDeF"),
            ("openid.assoc_handle", "1234567890"),
            (
                "openid.signed",
                "signed,op_endpoint,claimed_id,identity,return_to,response_nonce,assoc_handle",
            ),
            ("openid.sig", "c2lnbmF0dXJl"),
        ]
    }

    #[test]
    fn test_parses_path_only_and_absolute_callbacks() {
        let path = callback(&valid_pairs());
        let relative = CallbackParameters::from_callback_url(&path).unwrap();
        let absolute =
            CallbackParameters::from_callback_url(&format!("https://good.example{}", path))
                .unwrap();

        assert_eq!(relative.len(), valid_pairs().len());
        assert_eq!(relative.openid("claimed_id"), Some(CLAIMED_ID));
        assert_eq!(absolute.openid("claimed_id"), Some(CLAIMED_ID));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let params = CallbackParameters::from_callback_url(
            "/cb?openid.mode=id_res&openid.mode=cancel",
        )
        .unwrap();
        assert_eq!(params.openid("mode"), Some("id_res"));
        assert!(params.ensure_assertion_mode().is_ok());
    }

    #[test]
    fn test_unparseable_callback() {
        let result = CallbackParameters::from_callback_url("not a url");
        assert!(matches!(result, Err(SteamAuthError::InvalidCallbackUrl(_))));
    }

    #[test]
    fn test_mode_mismatch() {
        let params = CallbackParameters::from_callback_url("/cb?openid.mode=cancel").unwrap();
        match params.ensure_assertion_mode() {
            Err(SteamAuthError::ModeMismatch { actual }) => assert_eq!(actual, "cancel"),
            other => panic!("Expected ModeMismatch, got {:?}", other),
        }

        let params = CallbackParameters::from_callback_url("/cb").unwrap();
        match params.ensure_assertion_mode() {
            Err(SteamAuthError::ModeMismatch { actual }) => assert!(actual.is_empty()),
            other => panic!("Expected ModeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_passthrough_field() {
        let pairs: Vec<_> = valid_pairs()
            .into_iter()
            .filter(|(key, _)| *key != "openid.sig")
            .collect();
        let params = CallbackParameters::from_callback_url(&callback(&pairs)).unwrap();

        match params.into_signed_set() {
            Err(SteamAuthError::MissingParameter(name)) => assert_eq!(name, "openid.sig"),
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_signed_field() {
        let pairs: Vec<_> = valid_pairs()
            .into_iter()
            .filter(|(key, _)| *key != "openid.op_endpoint")
            .collect();
        let params = CallbackParameters::from_callback_url(&callback(&pairs)).unwrap();

        match params.into_signed_set() {
            Err(SteamAuthError::MissingParameter(name)) => assert_eq!(name, "openid.op_endpoint"),
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_vital_field_present_but_unsigned() {
        let mut pairs = valid_pairs();
        for pair in pairs.iter_mut() {
            if pair.0 == "openid.signed" {
                pair.1 = "assoc_handle,return_to";
            }
        }
        let params = CallbackParameters::from_callback_url(&callback(&pairs)).unwrap();
        assert_eq!(params.openid("claimed_id"), Some(CLAIMED_ID));

        match params.into_signed_set() {
            Err(SteamAuthError::UnsignedVitalParameter(name)) => {
                assert_eq!(name, "openid.claimed_id")
            }
            other => panic!("Expected UnsignedVitalParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_set_overrides_namespace_and_mode() {
        let mut pairs = valid_pairs();
        pairs[0] = ("openid.ns", "http://evil.example/ns");
        pairs.push(("openid.unsigned_extra", "dropped"));
        let params = CallbackParameters::from_callback_url(&callback(&pairs)).unwrap();

        let set = params.into_signed_set().unwrap();
        assert_eq!(set.openid("ns"), Some(OPENID_NS));
        assert_eq!(set.openid("mode"), Some("check_authentication"));
        assert_eq!(set.openid("sig"), Some("c2lnbmF0dXJl"));
        assert_eq!(set.openid("unsigned_extra"), None);
        assert_eq!(set.claimed_id(), Some(CLAIMED_ID));
        assert_eq!(set.signed_fields().len(), 7);
        // 7 signed fields (including `signed` and `assoc_handle`), sig, ns and mode
        assert_eq!(set.pairs().count(), 10);

        let body = set.to_form_body();
        assert!(body.contains("openid.mode=check_authentication"));
        assert!(body.contains("openid.sig=c2lnbmF0dXJl"));
        assert!(!body.contains("evil.example"));
    }

    #[test]
    fn test_empty_return_to_is_missing() {
        let mut pairs = valid_pairs();
        for pair in pairs.iter_mut() {
            if pair.0 == "openid.return_to" {
                pair.1 = "";
            }
        }
        let set = CallbackParameters::from_callback_url(&callback(&pairs))
            .unwrap()
            .into_signed_set()
            .unwrap();

        match set.return_to() {
            Err(SteamAuthError::MissingParameter(name)) => assert_eq!(name, "openid.return_to"),
            other => panic!("Expected MissingParameter, got {:?}", other),
        }
    }
}
