//! Database models and typed mutation payloads.

use serde::{Deserialize, Serialize};

use prospector_core::access::LicenseSnapshot;
use prospector_core::error::{Error, Result};
use prospector_core::license::{LicenseStatus, PaymentMethod, PlanType, Role, SubscriptionStatus};

/// License record from the database. One row per user account.
///
/// Enum-valued columns are persisted as their lowercase spellings; use the
/// vocabulary types in `prospector_core::license` when writing them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LicenseRecord {
    pub user_id: String,
    /// Denormalized from the identity provider for admin search.
    pub email: String,
    pub role: String,
    pub status: String,
    pub plan_type: String,
    pub license_expires_at: Option<i64>,
    pub grace_period_expires_at: Option<i64>,
    pub subscription_status: String,
    pub created_at: i64,
}

impl LicenseRecord {
    /// The fields the access evaluator reads.
    ///
    /// An unrecognized status spelling is treated as `pending`, which denies
    /// access until an administrator repairs the row.
    pub fn snapshot(&self) -> LicenseSnapshot {
        LicenseSnapshot {
            status: LicenseStatus::parse(&self.status).unwrap_or(LicenseStatus::Pending),
            license_expires_at: self.license_expires_at,
            grace_period_expires_at: self.grace_period_expires_at,
        }
    }
}

/// Payment event from the ledger. Immutable once appended, apart from
/// administrative metadata corrections.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentEvent {
    pub id: String,
    pub user_id: String,
    pub plan_type: String,
    pub valor_pago: f64,
    pub metodo_pagamento: String,
    pub periodo_inicio: i64,
    pub periodo_fim: i64,
    pub observacoes: Option<String>,
    /// Set at insert, never edited.
    pub data_pagamento: i64,
}

/// Typed partial update for the mutable license fields.
///
/// `None` leaves a field unchanged. For the nullable dates the inner option
/// distinguishes "set to this timestamp" from "clear".
#[derive(Debug, Clone, Default)]
pub struct LicenseUpdate {
    pub role: Option<Role>,
    pub status: Option<LicenseStatus>,
    pub plan_type: Option<PlanType>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub license_expires_at: Option<Option<i64>>,
    pub grace_period_expires_at: Option<Option<i64>>,
}

/// A settled payment to append to the ledger. Payments arrive here as
/// already-settled facts; nothing is charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub plan_type: PlanType,
    pub valor_pago: f64,
    pub metodo_pagamento: PaymentMethod,
    /// Start of the period the payment covers (Unix seconds).
    pub periodo_inicio: i64,
    /// End of the period the payment covers; becomes the new license expiry.
    pub periodo_fim: i64,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl NewPayment {
    /// Validate before any write occurs.
    pub fn validate(&self) -> Result<()> {
        if self.valor_pago < 0.0 {
            return Err(Error::InvalidPaymentEvent(format!(
                "negative amount: {}",
                self.valor_pago
            )));
        }
        if self.periodo_inicio > self.periodo_fim {
            return Err(Error::InvalidPaymentEvent(format!(
                "period starts at {} but ends at {}",
                self.periodo_inicio, self.periodo_fim
            )));
        }
        Ok(())
    }
}

/// Administrative correction of payment metadata. The creation timestamp and
/// the covered period are not correctable; delete and re-register instead.
#[derive(Debug, Clone, Default)]
pub struct PaymentCorrection {
    pub valor_pago: Option<f64>,
    pub metodo_pagamento: Option<PaymentMethod>,
    pub observacoes: Option<Option<String>>,
}

impl PaymentCorrection {
    /// Validate before any write occurs.
    pub fn validate(&self) -> Result<()> {
        if let Some(valor) = self.valor_pago {
            if valor < 0.0 {
                return Err(Error::InvalidPaymentEvent(format!(
                    "negative amount: {valor}"
                )));
            }
        }
        Ok(())
    }
}
