//! The verified Steam identity.
//!
//! A SteamID is a packed 64-bit value:
//!
//! | bits  | field      |
//! |-------|------------|
//! | 0-31  | account id |
//! | 32-51 | instance   |
//! | 52-55 | type       |
//! | 56-63 | universe   |

use crate::error::{SteamAuthError, SteamAuthResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

static CLAIMED_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://steamcommunity\.com/openid/id/([0-9]+)/?$")
        .expect("claimed id pattern is valid")
});

const DESKTOP_INSTANCE: u32 = 1;

/// Steam universe an account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Universe {
    Invalid,
    Public,
    Beta,
    Internal,
    Dev,
    Unknown(u8),
}

impl Universe {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Universe::Invalid,
            1 => Universe::Public,
            2 => Universe::Beta,
            3 => Universe::Internal,
            4 => Universe::Dev,
            other => Universe::Unknown(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Universe::Invalid => 0,
            Universe::Public => 1,
            Universe::Beta => 2,
            Universe::Internal => 3,
            Universe::Dev => 4,
            Universe::Unknown(bits) => *bits,
        }
    }
}

/// Kind of account a SteamID refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Invalid,
    Individual,
    Multiseat,
    GameServer,
    AnonGameServer,
    Pending,
    ContentServer,
    Clan,
    Chat,
    P2PSuperSeeder,
    AnonUser,
    Unknown(u8),
}

impl AccountType {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => AccountType::Invalid,
            1 => AccountType::Individual,
            2 => AccountType::Multiseat,
            3 => AccountType::GameServer,
            4 => AccountType::AnonGameServer,
            5 => AccountType::Pending,
            6 => AccountType::ContentServer,
            7 => AccountType::Clan,
            8 => AccountType::Chat,
            9 => AccountType::P2PSuperSeeder,
            10 => AccountType::AnonUser,
            other => AccountType::Unknown(other),
        }
    }

    /// Letter used in the steam3 rendering.
    fn steam3_char(&self) -> char {
        match self {
            AccountType::Invalid => 'I',
            AccountType::Individual => 'U',
            AccountType::Multiseat => 'M',
            AccountType::GameServer => 'G',
            AccountType::AnonGameServer => 'A',
            AccountType::Pending => 'P',
            AccountType::ContentServer => 'C',
            AccountType::Clan => 'g',
            AccountType::Chat => 'T',
            AccountType::AnonUser => 'a',
            AccountType::P2PSuperSeeder | AccountType::Unknown(_) => 'i',
        }
    }
}

/// A 64-bit Steam account identifier.
///
/// Serialized as a decimal string, since the full value does not fit in a
/// JSON-safe integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId(u64);

impl SteamId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Build the SteamID of a regular user account in the public universe.
    pub fn from_individual_account_id(account_id: u32) -> Self {
        Self(
            (1u64 << 56)
                | (1u64 << 52)
                | (u64::from(DESKTOP_INSTANCE) << 32)
                | u64::from(account_id),
        )
    }

    /// Extract the SteamID from a verified `openid.claimed_id` URL of the form
    /// `https://steamcommunity.com/openid/id/<digits>`.
    pub fn from_claimed_id(claimed_id: &str) -> SteamAuthResult<Self> {
        CLAIMED_ID
            .captures(claimed_id)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<u64>().ok())
            .map(Self)
            .ok_or(SteamAuthError::MalformedClaimedId)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn account_id(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn instance(&self) -> u32 {
        ((self.0 >> 32) & 0xF_FFFF) as u32
    }

    pub fn account_type(&self) -> AccountType {
        AccountType::from_bits(((self.0 >> 52) & 0xF) as u8)
    }

    pub fn universe(&self) -> Universe {
        Universe::from_bits((self.0 >> 56) as u8)
    }

    /// True for a desktop user account in the public universe.
    pub fn is_valid_individual(&self) -> bool {
        self.universe() == Universe::Public
            && self.account_type() == AccountType::Individual
            && self.instance() == DESKTOP_INSTANCE
            && self.account_id() != 0
    }

    /// Render as `STEAM_X:Y:Z`.
    ///
    /// Only individual accounts have a steam2 form. The public universe is
    /// written as `0` unless `newer_format` is set.
    pub fn steam2(&self, newer_format: bool) -> Option<String> {
        if self.account_type() != AccountType::Individual {
            return None;
        }

        let universe = match self.universe() {
            Universe::Public if !newer_format => 0,
            other => other.as_u8(),
        };
        let account_id = self.account_id();

        Some(format!(
            "STEAM_{}:{}:{}",
            universe,
            account_id & 1,
            account_id >> 1
        ))
    }

    /// Render as `[U:1:123]`.
    pub fn steam3(&self) -> String {
        let account_type = self.account_type();
        let render_instance = match account_type {
            AccountType::AnonGameServer | AccountType::Multiseat => true,
            AccountType::Individual => self.instance() != DESKTOP_INSTANCE,
            _ => false,
        };

        let mut rendered = format!(
            "[{}:{}:{}",
            account_type.steam3_char(),
            self.universe().as_u8(),
            self.account_id()
        );
        if render_instance {
            rendered.push_str(&format!(":{}", self.instance()));
        }
        rendered.push(']');
        rendered
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for SteamId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SteamId> for u64 {
    fn from(id: SteamId) -> Self {
        id.0
    }
}

impl TryFrom<String> for SteamId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SteamId> for String {
    fn from(id: SteamId) -> Self {
        id.to_string()
    }
}
