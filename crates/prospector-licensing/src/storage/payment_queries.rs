//! Payment ledger queries, including the transactional renewal.

use prospector_core::db::unix_timestamp;
use prospector_core::error::{Error, RenewalStage, Result};
use prospector_core::license::SubscriptionStatus;
use uuid::Uuid;

use super::db::Database;
use super::models::{LicenseRecord, NewPayment, PaymentCorrection, PaymentEvent};

impl Database {
    /// Append a settled payment to the ledger.
    ///
    /// Validates the payload before any write. `data_pagamento` is set here
    /// and never changes afterwards.
    pub async fn append_payment(
        &self,
        user_id: &str,
        payment: &NewPayment,
    ) -> Result<PaymentEvent> {
        payment.validate()?;

        let id = Uuid::new_v4().to_string();
        insert_payment_row(self.pool(), &id, user_id, payment, unix_timestamp()).await?;

        self.get_payment(&id).await
    }

    /// Get a payment event by id.
    pub async fn get_payment(&self, id: &str) -> Result<PaymentEvent> {
        sqlx::query_as::<_, PaymentEvent>("SELECT * FROM payment_events WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| Error::NotFound(format!("Payment {id}")))
    }

    /// List a user's payment events, newest first.
    pub async fn list_payments_by_user(&self, user_id: &str) -> Result<Vec<PaymentEvent>> {
        let events = sqlx::query_as::<_, PaymentEvent>(
            "SELECT * FROM payment_events WHERE user_id = ? ORDER BY data_pagamento DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(events)
    }

    /// Delete a ledger row. Returns whether a row was removed. The license
    /// record the payment renewed is not touched.
    pub async fn delete_payment(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payment_events WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Administrative metadata correction. `data_pagamento` and the covered
    /// period are never editable.
    pub async fn edit_payment(
        &self,
        id: &str,
        correction: &PaymentCorrection,
    ) -> Result<PaymentEvent> {
        correction.validate()?;

        let current = self.get_payment(id).await?;

        let valor_pago = correction.valor_pago.unwrap_or(current.valor_pago);
        let metodo_pagamento = correction.metodo_pagamento.map_or_else(
            || current.metodo_pagamento.clone(),
            |m| m.as_str().to_string(),
        );
        let observacoes = correction
            .observacoes
            .clone()
            .unwrap_or(current.observacoes);

        sqlx::query(
            "UPDATE payment_events SET valor_pago = ?, metodo_pagamento = ?, observacoes = ? WHERE id = ?",
        )
        .bind(valor_pago)
        .bind(&metodo_pagamento)
        .bind(&observacoes)
        .bind(id)
        .execute(self.pool())
        .await?;

        self.get_payment(id).await
    }

    /// Append a payment and renew the linked license in one `SQLite`
    /// transaction.
    ///
    /// The ledger append is ordered before the license update so a failed
    /// update can be compensated; dropping the transaction rolls the append
    /// back, which is why every post-validation failure reports
    /// `compensated: true`. A ledger entry without the matching renewal is
    /// never observable.
    pub async fn renew_license_with_payment(
        &self,
        user_id: &str,
        payment: &NewPayment,
    ) -> Result<(PaymentEvent, LicenseRecord)> {
        payment.validate()?;
        // Fail with NotFound before anything is written.
        self.get_license(user_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = unix_timestamp();

        let mut tx = self.pool().begin().await?;

        insert_payment_row(&mut *tx, &id, user_id, payment, now)
            .await
            .map_err(|e| renewal_failed(RenewalStage::LedgerAppend, &e))?;

        sqlx::query(
            r"
            UPDATE license_records
            SET license_expires_at = ?, subscription_status = ?, grace_period_expires_at = NULL
            WHERE user_id = ?
            ",
        )
        .bind(payment.periodo_fim)
        .bind(SubscriptionStatus::Active.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| renewal_failed(RenewalStage::LicenseUpdate, &e))?;

        tx.commit()
            .await
            .map_err(|e| renewal_failed(RenewalStage::Commit, &e))?;

        let event = self.get_payment(&id).await?;
        let license = self.get_license(user_id).await?;
        Ok((event, license))
    }
}

async fn insert_payment_row<'e, E>(
    executor: E,
    id: &str,
    user_id: &str,
    payment: &NewPayment,
    data_pagamento: i64,
) -> std::result::Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO payment_events
            (id, user_id, plan_type, valor_pago, metodo_pagamento,
             periodo_inicio, periodo_fim, observacoes, data_pagamento)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(id)
    .bind(user_id)
    .bind(payment.plan_type.as_str())
    .bind(payment.valor_pago)
    .bind(payment.metodo_pagamento.as_str())
    .bind(payment.periodo_inicio)
    .bind(payment.periodo_fim)
    .bind(payment.observacoes.as_deref())
    .bind(data_pagamento)
    .execute(executor)
    .await?;

    Ok(())
}

fn renewal_failed(stage: RenewalStage, e: &sqlx::Error) -> Error {
    Error::RenewalFailed {
        stage,
        detail: e.to_string(),
        compensated: true,
    }
}
