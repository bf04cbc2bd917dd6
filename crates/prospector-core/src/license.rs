//! License domain vocabulary.
//!
//! Enumerations shared by the access evaluator and the storage layer.
//! Rows persist these as lowercase strings; `as_str`/`parse` are the single
//! source of truth for the wire spelling.

use serde::{Deserialize, Serialize};

/// Seconds in one day, used for expiry arithmetic on license dates.
pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular seller account.
    #[default]
    User,
    /// Administrative operator.
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the persisted spelling. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// License lifecycle status. `Blocked` overrides every other field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Created at sign-up, awaiting activation.
    #[default]
    Pending,
    /// Access governed by plan and expiry dates.
    Active,
    /// Access unconditionally denied.
    Blocked,
}

impl LicenseStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    /// Parse the persisted spelling. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Commercial plan tier. Not itself gating; expiry dates are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Trial,
    Basic,
    Standard,
    Premium,
}

impl PlanType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    /// Parse the persisted spelling. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(Self::Trial),
            "basic" => Some(Self::Basic),
            "standard" => Some(Self::Standard),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// Billing-side subscription status. Informational for administrators;
/// never consulted by the access evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Pastdue,
    Cancelled,
}

impl SubscriptionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pastdue => "pastdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the persisted spelling. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "pastdue" => Some(Self::Pastdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Settlement method recorded on a payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Card,
    Transfer,
    Cash,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Cash => "cash",
        }
    }

    /// Parse the persisted spelling. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pix" => Some(Self::Pix),
            "card" => Some(Self::Card),
            "transfer" => Some(Self::Transfer),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),+) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        })+
    };
}

impl_display!(Role, LicenseStatus, PlanType, SubscriptionStatus, PaymentMethod);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_persisted_spelling() {
        for status in [
            LicenseStatus::Pending,
            LicenseStatus::Active,
            LicenseStatus::Blocked,
        ] {
            assert_eq!(LicenseStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_spellings_are_rejected() {
        assert_eq!(LicenseStatus::parse("suspended"), None);
        assert_eq!(PaymentMethod::parse("cheque"), None);
        assert_eq!(PlanType::parse(""), None);
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Pix).unwrap();
        assert_eq!(json, "\"pix\"");
        let back: PaymentMethod = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(back, PaymentMethod::Transfer);
    }
}
