//! Licence codes, statuses and the validation verdict.
//!
//! A licence code is eight characters from `A-Z0-9` split in two groups of
//! four (`ABCD-1234`). Users paste it into the extension prefixed with the
//! `@#` marker, so [`normalize_code`] accepts both forms.

use rand::Rng;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Characters a generated code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random characters in a code (the dash is not counted).
pub const CODE_LENGTH: usize = 8;

/// Marker the extension expects in front of a licence code.
pub const LICENCE_MARKER: &str = "@#";

/// Marker the extension expects in front of the MeuDanfe API key.
pub const API_KEY_MARKER: &str = "@@";

/// Default validity of a freshly issued licence, in days.
pub const DEFAULT_LICENCE_DAYS: u32 = 30;

/// Plan recorded when the issuer does not name one.
pub const DEFAULT_PLAN: &str = "mensal";

/// Payment origin recorded for every issued licence.
pub const DEFAULT_PAYMENT_ORIGIN: &str = "pagbank";

/// Rejection reasons returned in the `motivo` field.
pub mod reasons {
    pub const NOT_FOUND: &str = "LICENCA_INEXISTENTE";
    pub const EXPIRED: &str = "LICENCA_EXPIRADA";
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// Generate a new random licence code in `XXXX-XXXX` form.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    let base: String = (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    let (head, tail) = base.split_at(CODE_LENGTH / 2);
    format!("{head}-{tail}")
}

/// Canonicalise a user-supplied code.
///
/// Trims and uppercases, then strips a leading `@#` marker and trims again,
/// so `" @# abcd-1234 "` becomes `"ABCD-1234"`.
pub fn normalize_code(raw: &str) -> String {
    let code = raw.trim().to_uppercase();
    match code.strip_prefix(LICENCE_MARKER) {
        Some(rest) => rest.trim().to_uppercase(),
        None => code,
    }
}

/// The line a user types into the extension to register a licence.
pub fn licence_marker(code: &str) -> String {
    format!("{LICENCE_MARKER}{code}")
}

/// The line carrying the MeuDanfe API key in the licence e-mail.
pub fn api_key_marker(api_key: &str) -> String {
    format!("{API_KEY_MARKER}{api_key}")
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a licence, stored as a lowercase word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenceStatus {
    Active,
    Expired,
    Cancelled,
    /// Any other word written to the store by hand.
    Other(String),
}

impl LicenceStatus {
    pub const ACTIVE: &'static str = "ativo";
    pub const EXPIRED: &'static str = "expirado";
    pub const CANCELLED: &'static str = "cancelado";

    /// Parse the stored representation. Unknown words are preserved.
    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::ACTIVE => Self::Active,
            Self::EXPIRED => Self::Expired,
            Self::CANCELLED => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => Self::ACTIVE,
            Self::Expired => Self::EXPIRED,
            Self::Cancelled => Self::CANCELLED,
            Self::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// `motivo` reported when a licence in this status is presented.
    pub fn rejection_reason(&self) -> String {
        format!("LICENCA_{}", self.as_str().to_uppercase())
    }
}

impl std::fmt::Display for LicenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Expiry and verdict
// ---------------------------------------------------------------------------

/// Expiry instant of a licence bought at `purchased_at`.
pub fn expiry_from(purchased_at: Timestamp, days: u32) -> Timestamp {
    purchased_at + chrono::Duration::days(i64::from(days))
}

/// Outcome of checking a stored licence against the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenceVerdict {
    /// The licence is usable. `expires_at` is `None` for perpetual licences.
    Valid { expires_at: Option<Timestamp> },
    /// Active in storage but past its expiry; the caller persists `expirado`.
    Expired { expires_at: Timestamp },
    /// Not active (expired earlier, cancelled, ...).
    Rejected { reason: String },
}

impl LicenceVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Valid { .. } => None,
            Self::Expired { .. } => Some(reasons::EXPIRED.to_string()),
            Self::Rejected { reason } => Some(reason.clone()),
        }
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        match self {
            Self::Valid { expires_at } => *expires_at,
            Self::Expired { expires_at } => Some(*expires_at),
            Self::Rejected { .. } => None,
        }
    }
}

/// Decide whether a licence is usable at `now`.
///
/// The status check comes first: a cancelled licence is reported as
/// cancelled even when it is also past its expiry.
pub fn evaluate(
    status: &LicenceStatus,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> LicenceVerdict {
    if !status.is_active() {
        return LicenceVerdict::Rejected {
            reason: status.rejection_reason(),
        };
    }

    match expires_at {
        Some(expires_at) if expires_at < now => LicenceVerdict::Expired { expires_at },
        expires_at => LicenceVerdict::Valid { expires_at },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
