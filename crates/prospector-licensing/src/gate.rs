//! Session-boundary access gate.
//!
//! Invoked at every protected-surface entry point. Renders one of three UI
//! states from the session fact and the state of the in-flight license
//! fetch. This path only reads; no writes ever happen here.

use prospector_core::access::{
    AccessDecision, AccessEvaluator, AccessWarning, DenyReason, LicenseSnapshot, SessionFact,
};

/// State of the license fetch at render time.
#[derive(Debug, Clone, Copy)]
pub enum LicenseFetch<'a> {
    /// The store lookup has not resolved yet.
    Pending,
    /// The record arrived.
    Loaded(&'a LicenseSnapshot),
    /// The store reported no record for this user.
    Missing,
}

/// UI state produced by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Hold rendering until the license resolves.
    Loading,
    /// Let the route transition through, surfacing the warning if present.
    Allow { warning: Option<AccessWarning> },
    /// Redirect to the reason-specific screen.
    Deny { reason: DenyReason },
}

/// Guard for protected routes.
#[derive(Debug, Clone)]
pub struct AccessGate {
    evaluator: AccessEvaluator,
}

impl AccessGate {
    pub const fn new(evaluator: AccessEvaluator) -> Self {
        Self { evaluator }
    }

    /// Render the gate state for one route transition.
    ///
    /// `session` is `None` when the identity check was cancelled or timed
    /// out; that is treated as not authenticated, never as an allow. The
    /// designated super-admin is decided before the license resolves so the
    /// operator is never held on the loading screen; everyone else waits
    /// for the record.
    pub fn render(
        &self,
        session: Option<&SessionFact>,
        license: LicenseFetch<'_>,
        now: i64,
    ) -> GateState {
        let Some(session) = session else {
            return GateState::Deny {
                reason: DenyReason::NotAuthenticated,
            };
        };

        if self.evaluator.is_super_admin(session) {
            return GateState::Allow { warning: None };
        }

        if !session.is_authenticated {
            return GateState::Deny {
                reason: DenyReason::NotAuthenticated,
            };
        }

        let snapshot = match license {
            LicenseFetch::Pending => return GateState::Loading,
            LicenseFetch::Missing => {
                return GateState::Deny {
                    reason: DenyReason::PendingActivation,
                };
            }
            LicenseFetch::Loaded(snapshot) => snapshot,
        };

        match self.evaluator.evaluate(session, snapshot, now) {
            AccessDecision::Allow { warning } => GateState::Allow { warning },
            AccessDecision::Deny { reason } => GateState::Deny { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_core::license::LicenseStatus;

    const SUPER_ADMIN: &str = "ops@prospector.app";

    fn gate() -> AccessGate {
        AccessGate::new(AccessEvaluator::new(SUPER_ADMIN))
    }

    fn active_license() -> LicenseSnapshot {
        LicenseSnapshot {
            status: LicenseStatus::Active,
            license_expires_at: None,
            grace_period_expires_at: None,
        }
    }

    #[test]
    fn regular_user_waits_for_license() {
        let session = SessionFact::authenticated("u-1", "seller@example.com");
        let state = gate().render(Some(&session), LicenseFetch::Pending, 0);
        assert_eq!(state, GateState::Loading);
    }

    #[test]
    fn super_admin_never_sees_loading() {
        let session = SessionFact::authenticated("u-ops", SUPER_ADMIN);
        let state = gate().render(Some(&session), LicenseFetch::Pending, 0);
        assert_eq!(state, GateState::Allow { warning: None });
    }

    #[test]
    fn cancelled_identity_check_is_not_authenticated() {
        let state = gate().render(None, LicenseFetch::Pending, 0);
        assert_eq!(
            state,
            GateState::Deny {
                reason: DenyReason::NotAuthenticated
            }
        );
    }

    #[test]
    fn anonymous_session_is_denied_without_waiting() {
        let session = SessionFact::anonymous();
        let state = gate().render(Some(&session), LicenseFetch::Pending, 0);
        assert_eq!(
            state,
            GateState::Deny {
                reason: DenyReason::NotAuthenticated
            }
        );
    }

    #[test]
    fn loaded_license_is_evaluated() {
        let session = SessionFact::authenticated("u-1", "seller@example.com");
        let license = active_license();
        let state = gate().render(Some(&session), LicenseFetch::Loaded(&license), 0);
        assert_eq!(state, GateState::Allow { warning: None });
    }

    #[test]
    fn missing_record_is_denied_as_pending() {
        let session = SessionFact::authenticated("u-1", "seller@example.com");
        let state = gate().render(Some(&session), LicenseFetch::Missing, 0);
        assert_eq!(
            state,
            GateState::Deny {
                reason: DenyReason::PendingActivation
            }
        );
    }

    #[test]
    fn grace_warning_flows_through_to_the_ui_state() {
        let session = SessionFact::authenticated("u-1", "seller@example.com");
        let license = LicenseSnapshot {
            status: LicenseStatus::Active,
            license_expires_at: Some(100),
            grace_period_expires_at: Some(200),
        };
        let state = gate().render(Some(&session), LicenseFetch::Loaded(&license), 150);
        assert_eq!(
            state,
            GateState::Allow {
                warning: Some(AccessWarning::InGracePeriod { expires_at: 200 })
            }
        );
    }
}
