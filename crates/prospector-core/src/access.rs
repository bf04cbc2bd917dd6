//! Access evaluation for authenticated sessions.
//!
//! Pure decision logic: given the session fact from the identity provider,
//! a snapshot of the user's license, and the current time, produce an
//! [`AccessDecision`]. Checks run in a fixed order, first match wins.
//! Time is injected so the evaluation is deterministic under test.

use serde::{Deserialize, Serialize};

use crate::license::LicenseStatus;

/// Per-request fact supplied by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionFact {
    /// Stable account identifier, when a session exists.
    pub user_id: Option<String>,
    /// Account email, when a session exists.
    pub email: Option<String>,
    /// Whether the identity provider vouches for this session.
    pub is_authenticated: bool,
}

impl SessionFact {
    /// An authenticated session for the given account.
    pub fn authenticated(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
            is_authenticated: true,
        }
    }

    /// An anonymous (or timed-out) session.
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            email: None,
            is_authenticated: false,
        }
    }
}

/// The license fields the evaluator reads. Built from a stored
/// `LicenseRecord`; dates are Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseSnapshot {
    pub status: LicenseStatus,
    pub license_expires_at: Option<i64>,
    pub grace_period_expires_at: Option<i64>,
}

/// Why access was denied. Callers must branch on this to pick the
/// user-facing redirect; collapsing the reasons is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No active session.
    NotAuthenticated,
    /// License status is `blocked`.
    Blocked,
    /// License status is `pending`; activation has not happened yet.
    PendingActivation,
    /// License (and any grace period) has lapsed.
    Expired,
}

/// Non-blocking warning attached to an `Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessWarning {
    /// The license has expired but the grace period is still open.
    InGracePeriod {
        /// When the grace period (and therefore access) ends.
        expires_at: i64,
    },
}

/// Result of evaluating a session against a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum AccessDecision {
    /// Access granted, possibly with a warning to surface.
    Allow { warning: Option<AccessWarning> },
    /// Access denied for the given reason.
    Deny { reason: DenyReason },
}

impl AccessDecision {
    /// Plain allow with no warning.
    pub const ALLOW: Self = Self::Allow { warning: None };

    pub const fn deny(reason: DenyReason) -> Self {
        Self::Deny { reason }
    }

    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Evaluates license snapshots into access decisions.
///
/// The designated super-admin email is injected at construction so it is
/// swappable per deployment and mockable in tests. An empty string disables
/// the bypass entirely.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    super_admin_email: String,
}

impl AccessEvaluator {
    /// Create an evaluator with the given designated super-admin email.
    pub fn new(super_admin_email: impl Into<String>) -> Self {
        Self {
            super_admin_email: super_admin_email.into(),
        }
    }

    /// Whether the session belongs to the designated super-admin.
    ///
    /// The bypass exists so the product's primary operator can never be
    /// locked out by a stale or slow-to-sync license record. It applies
    /// only to authenticated sessions.
    pub fn is_super_admin(&self, session: &SessionFact) -> bool {
        if !session.is_authenticated || self.super_admin_email.is_empty() {
            return false;
        }
        session
            .email
            .as_deref()
            .is_some_and(|email| email == self.super_admin_email)
    }

    /// Evaluate a session against a license snapshot at time `now`.
    ///
    /// Ordered checks, first match wins:
    /// 1. super-admin bypass (authenticated sessions only)
    /// 2. not authenticated
    /// 3. status blocked
    /// 4. status pending
    /// 5. expiry, with grace-period window
    pub fn evaluate(
        &self,
        session: &SessionFact,
        license: &LicenseSnapshot,
        now: i64,
    ) -> AccessDecision {
        if self.is_super_admin(session) {
            return AccessDecision::ALLOW;
        }

        if !session.is_authenticated {
            return AccessDecision::deny(DenyReason::NotAuthenticated);
        }

        match license.status {
            LicenseStatus::Blocked => return AccessDecision::deny(DenyReason::Blocked),
            LicenseStatus::Pending => return AccessDecision::deny(DenyReason::PendingActivation),
            LicenseStatus::Active => {}
        }

        // Absent expiry means a perpetual license.
        if let Some(expires_at) = license.license_expires_at {
            if now > expires_at {
                if let Some(grace_until) = license.grace_period_expires_at {
                    if now <= grace_until {
                        return AccessDecision::Allow {
                            warning: Some(AccessWarning::InGracePeriod {
                                expires_at: grace_until,
                            }),
                        };
                    }
                }
                return AccessDecision::deny(DenyReason::Expired);
            }
        }

        AccessDecision::ALLOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPER_ADMIN: &str = "ops@prospector.app";
    const DAY: i64 = 24 * 60 * 60;

    fn evaluator() -> AccessEvaluator {
        AccessEvaluator::new(SUPER_ADMIN)
    }

    fn seller() -> SessionFact {
        SessionFact::authenticated("u-1", "seller@example.com")
    }

    fn active(expires_at: Option<i64>, grace_until: Option<i64>) -> LicenseSnapshot {
        LicenseSnapshot {
            status: LicenseStatus::Active,
            license_expires_at: expires_at,
            grace_period_expires_at: grace_until,
        }
    }

    #[test]
    fn expired_without_grace_is_denied() {
        // expiry day 10, evaluated on day 15
        let decision = evaluator().evaluate(&seller(), &active(Some(10 * DAY), None), 15 * DAY);
        assert_eq!(decision, AccessDecision::deny(DenyReason::Expired));
    }

    #[test]
    fn expired_inside_grace_window_allows_with_warning() {
        let license = active(Some(10 * DAY), Some(20 * DAY));
        let decision = evaluator().evaluate(&seller(), &license, 15 * DAY);
        assert_eq!(
            decision,
            AccessDecision::Allow {
                warning: Some(AccessWarning::InGracePeriod {
                    expires_at: 20 * DAY
                }),
            }
        );
    }

    #[test]
    fn grace_upper_bound_is_inclusive() {
        let license = active(Some(10 * DAY), Some(20 * DAY));
        let at_bound = evaluator().evaluate(&seller(), &license, 20 * DAY);
        assert!(at_bound.is_allowed());

        let past_bound = evaluator().evaluate(&seller(), &license, 20 * DAY + 1);
        assert_eq!(past_bound, AccessDecision::deny(DenyReason::Expired));
    }

    #[test]
    fn pending_is_denied_regardless_of_dates() {
        let license = LicenseSnapshot {
            status: LicenseStatus::Pending,
            license_expires_at: Some(1_000 * DAY),
            grace_period_expires_at: Some(2_000 * DAY),
        };
        let decision = evaluator().evaluate(&seller(), &license, 0);
        assert_eq!(decision, AccessDecision::deny(DenyReason::PendingActivation));
    }

    #[test]
    fn blocked_overrides_everything() {
        let license = LicenseSnapshot {
            status: LicenseStatus::Blocked,
            license_expires_at: None,
            grace_period_expires_at: None,
        };
        for now in [0, 10 * DAY, i64::MAX] {
            let decision = evaluator().evaluate(&seller(), &license, now);
            assert_eq!(decision, AccessDecision::deny(DenyReason::Blocked));
        }
    }

    #[test]
    fn perpetual_license_never_expires() {
        for now in [0, 10_000 * DAY, i64::MAX] {
            let decision = evaluator().evaluate(&seller(), &active(None, None), now);
            assert_eq!(decision, AccessDecision::ALLOW);
        }
    }

    #[test]
    fn super_admin_bypasses_blocked_license() {
        let session = SessionFact::authenticated("u-ops", SUPER_ADMIN);
        let license = LicenseSnapshot {
            status: LicenseStatus::Blocked,
            license_expires_at: Some(0),
            grace_period_expires_at: None,
        };
        let decision = evaluator().evaluate(&session, &license, 10 * DAY);
        assert_eq!(decision, AccessDecision::ALLOW);
    }

    #[test]
    fn super_admin_email_does_not_bypass_authentication() {
        let session = SessionFact {
            user_id: None,
            email: Some(SUPER_ADMIN.to_string()),
            is_authenticated: false,
        };
        let decision = evaluator().evaluate(&session, &active(None, None), 0);
        assert_eq!(decision, AccessDecision::deny(DenyReason::NotAuthenticated));
    }

    #[test]
    fn anonymous_session_is_denied() {
        let decision = evaluator().evaluate(&SessionFact::anonymous(), &active(None, None), 0);
        assert_eq!(decision, AccessDecision::deny(DenyReason::NotAuthenticated));
    }

    #[test]
    fn empty_super_admin_config_disables_bypass() {
        let evaluator = AccessEvaluator::new("");
        let session = SessionFact {
            user_id: Some("u-1".to_string()),
            email: Some(String::new()),
            is_authenticated: true,
        };
        let license = LicenseSnapshot {
            status: LicenseStatus::Blocked,
            license_expires_at: None,
            grace_period_expires_at: None,
        };
        let decision = evaluator.evaluate(&session, &license, 0);
        assert_eq!(decision, AccessDecision::deny(DenyReason::Blocked));
    }

    #[test]
    fn unexpired_license_ignores_grace_field() {
        let license = active(Some(10 * DAY), Some(20 * DAY));
        let decision = evaluator().evaluate(&seller(), &license, 5 * DAY);
        assert_eq!(decision, AccessDecision::ALLOW);
    }
}
