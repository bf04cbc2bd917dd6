//! Administrative license governance.
//!
//! The only component that composes the license table and the payment
//! ledger into multi-step operations. Everything here is invoked
//! synchronously from an administrator action or a route transition.

use tracing::{debug, info, warn};

use prospector_core::access::{AccessDecision, AccessEvaluator, DenyReason, SessionFact};
use prospector_core::config::Config;
use prospector_core::db::unix_timestamp;
use prospector_core::error::{Error, Result};
use prospector_core::license::{DAY_SECS, LicenseStatus, PlanType};

use crate::storage::{Database, LicenseRecord, LicenseUpdate, NewPayment, PaymentEvent};

/// Administrative mutation API over license records and the payment ledger.
pub struct LicenseGovernanceService {
    db: Database,
    evaluator: AccessEvaluator,
    trial_days: i64,
}

impl LicenseGovernanceService {
    /// Create a service over the given database, configured with the
    /// designated super-admin email and trial length.
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            evaluator: AccessEvaluator::new(config.access.super_admin_email.clone()),
            trial_days: config.licensing.trial_days,
        }
    }

    /// The evaluator this service decides access with. Shared with the
    /// [`crate::gate::AccessGate`] so both apply the same super-admin rule.
    pub const fn evaluator(&self) -> &AccessEvaluator {
        &self.evaluator
    }

    /// License records for the admin screen, optionally filtered by email.
    pub async fn list_users(&self, email_filter: Option<&str>) -> Result<Vec<LicenseRecord>> {
        self.db.list_licenses(email_filter).await
    }

    /// Direct administrative edit of the mutable license fields.
    /// `InvalidLicenseState` from the store surfaces unmodified.
    pub async fn update_license_fields(
        &self,
        user_id: &str,
        update: &LicenseUpdate,
    ) -> Result<LicenseRecord> {
        let record = self.db.update_license(user_id, update).await?;
        info!(user_id, "License fields updated");
        Ok(record)
    }

    /// Grant a trial: `plan_type=trial`, `status=active`, expiry after the
    /// configured number of days.
    pub async fn grant_quick_trial(&self, user_id: &str) -> Result<LicenseRecord> {
        self.grant_quick_trial_at(user_id, unix_timestamp()).await
    }

    /// Trial grant with an explicit clock, for deterministic callers.
    ///
    /// Any leftover grace period is cleared; the fresh expiry supersedes it
    /// and a stale grace date would otherwise fail the ordering invariant.
    pub async fn grant_quick_trial_at(&self, user_id: &str, now: i64) -> Result<LicenseRecord> {
        let update = LicenseUpdate {
            plan_type: Some(PlanType::Trial),
            status: Some(LicenseStatus::Active),
            license_expires_at: Some(Some(now + self.trial_days * DAY_SECS)),
            grace_period_expires_at: Some(None),
            ..LicenseUpdate::default()
        };
        let record = self.db.update_license(user_id, &update).await?;
        info!(
            user_id,
            expires_at = ?record.license_expires_at,
            "Quick trial granted"
        );
        Ok(record)
    }

    /// Flip the license status: blocked becomes active, anything else
    /// becomes blocked. Unconditional once invoked; confirmation is a UI
    /// concern.
    pub async fn toggle_blocked(&self, user_id: &str) -> Result<LicenseRecord> {
        let current = self.db.get_license(user_id).await?;
        let next = if LicenseStatus::parse(&current.status) == Some(LicenseStatus::Blocked) {
            LicenseStatus::Active
        } else {
            LicenseStatus::Blocked
        };

        let record = self.db.set_license_status(user_id, next).await?;
        info!(user_id, status = %next, "License status toggled");
        Ok(record)
    }

    /// Register a settled payment and renew the linked license.
    ///
    /// The ledger append and the license update happen in one transaction;
    /// a partial failure is compensated and surfaces as a single
    /// `RenewalFailed`. The effect on the expiry is idempotent: the new
    /// expiry is the payment's `periodo_fim`, not an accumulation.
    pub async fn register_payment(
        &self,
        user_id: &str,
        payment: &NewPayment,
    ) -> Result<PaymentEvent> {
        let (event, record) = self.db.renew_license_with_payment(user_id, payment).await?;
        info!(
            user_id,
            payment_id = %event.id,
            expires_at = ?record.license_expires_at,
            "Payment registered, license renewed"
        );
        Ok(event)
    }

    /// Remove a ledger row as an administrative correction. The license it
    /// previously renewed keeps its expiry and subscription status.
    pub async fn delete_payment(&self, id: &str) -> Result<bool> {
        let deleted = self.db.delete_payment(id).await?;
        if deleted {
            warn!(payment_id = id, "Payment deleted; linked license left unchanged");
        }
        Ok(deleted)
    }

    /// A user's payment events, newest first.
    pub async fn list_payment_history(&self, user_id: &str) -> Result<Vec<PaymentEvent>> {
        self.db.list_payments_by_user(user_id).await
    }

    /// Evaluate access for the current session, loading the license record.
    pub async fn evaluate_access(&self, session: &SessionFact) -> Result<AccessDecision> {
        self.evaluate_access_at(session, unix_timestamp()).await
    }

    /// Access evaluation with an explicit clock, for deterministic callers.
    ///
    /// The super-admin and unauthenticated cases never wait on storage. An
    /// authenticated user without a license row is denied as pending:
    /// sign-up creates the row, so its absence means activation has not
    /// completed.
    pub async fn evaluate_access_at(
        &self,
        session: &SessionFact,
        now: i64,
    ) -> Result<AccessDecision> {
        if self.evaluator.is_super_admin(session) {
            return Ok(AccessDecision::ALLOW);
        }
        if !session.is_authenticated {
            return Ok(AccessDecision::deny(DenyReason::NotAuthenticated));
        }
        let Some(user_id) = session.user_id.as_deref() else {
            return Ok(AccessDecision::deny(DenyReason::NotAuthenticated));
        };

        let snapshot = match self.db.get_license(user_id).await {
            Ok(record) => record.snapshot(),
            Err(Error::NotFound(_)) => {
                debug!(user_id, "No license record; denying as pending activation");
                return Ok(AccessDecision::deny(DenyReason::PendingActivation));
            }
            Err(e) => return Err(e),
        };

        Ok(self.evaluator.evaluate(session, &snapshot, now))
    }
}
