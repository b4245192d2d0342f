use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainParseError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(Fid);
id_newtype!(NetworkId);

impl NetworkId {
    pub const BASE: NetworkId = NetworkId(8453);
    pub const BASE_SEPOLIA: NetworkId = NetworkId(84532);
}

pub const ANONYMOUS_FID: Fid = Fid(0);
pub const ANONYMOUS_USERNAME: &str = "anonymous";
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Host-authenticated user, or the anonymous sentinel when the host supplied no user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub fid: Fid,
    pub username: String,
    pub display_name: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            fid: ANONYMOUS_FID,
            username: ANONYMOUS_USERNAME.to_string(),
            display_name: ANONYMOUS_DISPLAY_NAME.to_string(),
        }
    }

    /// Builds an identity from possibly sparse host fields.
    pub fn resolve(fid: Fid, username: Option<&str>, display_name: Option<&str>) -> Self {
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| username.clone())
            .unwrap_or_else(|| format!("User {fid}"));

        Self {
            fid,
            username: username.unwrap_or_else(|| ANONYMOUS_USERNAME.to_string()),
            display_name,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.fid == ANONYMOUS_FID
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Mint,
    Donate,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Mint, ActionKind::Donate];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Mint => "mint",
            ActionKind::Donate => "donate",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mint" => Ok(ActionKind::Mint),
            "donate" => Ok(ActionKind::Donate),
            other => Err(DomainParseError::UnknownActionKind(other.to_string())),
        }
    }
}

fn is_hex_body(body: &str) -> bool {
    !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// `0x`-prefixed, 20-byte account or contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x") {
            Some(body) if body.len() == 40 && is_hex_body(body) => Ok(Self(s.to_string())),
            _ => Err(DomainParseError::InvalidAddress(s.to_string())),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = DomainParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `0x`-prefixed transaction hash, stored lowercase so repeated notifications compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x") {
            Some(body) if body.len() == 64 && is_hex_body(body) => {
                Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
            }
            _ => Err(DomainParseError::InvalidTxHash(s.to_string())),
        }
    }
}

impl TryFrom<String> for TxHash {
    type Error = DomainParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const WEI_DECIMALS: usize = 18;

/// Native-token amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(pub u128);

impl Wei {
    /// Parses a decimal ether amount such as `"0.0001"` without going through floats.
    pub fn parse_ether(raw: &str) -> Result<Self, DomainParseError> {
        let invalid = || DomainParseError::InvalidAmount(raw.to_string());
        let raw_trimmed = raw.trim();
        let (whole, fraction) = match raw_trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw_trimmed, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > WEI_DECIMALS
        {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let padded = format!("{fraction:0<width$}", width = WEI_DECIMALS);
        let fraction: u128 = padded.parse().map_err(|_| invalid())?;

        whole
            .checked_mul(10u128.pow(WEI_DECIMALS as u32))
            .and_then(|w| w.checked_add(fraction))
            .map(Wei)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
