//! License record queries.

use prospector_core::db::unix_timestamp;
use prospector_core::error::{Error, Result};
use prospector_core::license::LicenseStatus;

use super::db::Database;
use super::models::{LicenseRecord, LicenseUpdate};

impl Database {
    /// Insert the license row for a newly signed-up account with the default
    /// state (`status=pending`, `role=user`).
    ///
    /// Invoked by the external sign-up collaborator, never by governance
    /// operations; exactly one row exists per account.
    pub async fn insert_license(&self, user_id: &str, email: &str) -> Result<LicenseRecord> {
        let now = unix_timestamp();

        sqlx::query(
            r"
            INSERT INTO license_records (user_id, email, created_at)
            VALUES (?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(email)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_license(user_id).await
    }

    /// Get a license record by user id.
    pub async fn get_license(&self, user_id: &str) -> Result<LicenseRecord> {
        sqlx::query_as::<_, LicenseRecord>("SELECT * FROM license_records WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| Error::NotFound(format!("License {user_id}")))
    }

    /// List license records, optionally filtered by email substring.
    pub async fn list_licenses(&self, email_filter: Option<&str>) -> Result<Vec<LicenseRecord>> {
        let records = if let Some(email) = email_filter {
            sqlx::query_as::<_, LicenseRecord>(
                "SELECT * FROM license_records WHERE email LIKE ? ORDER BY created_at DESC",
            )
            .bind(format!("%{email}%"))
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, LicenseRecord>(
                "SELECT * FROM license_records ORDER BY created_at DESC",
            )
            .fetch_all(self.pool())
            .await?
        };

        Ok(records)
    }

    /// Apply a typed partial update as a single atomic UPDATE.
    ///
    /// The merged record is validated before anything is written: a grace
    /// period that would end before the license expiry is rejected with
    /// `InvalidLicenseState` and the row is left unchanged.
    pub async fn update_license(
        &self,
        user_id: &str,
        update: &LicenseUpdate,
    ) -> Result<LicenseRecord> {
        let current = self.get_license(user_id).await?;

        let role = update
            .role
            .map_or_else(|| current.role.clone(), |r| r.as_str().to_string());
        let status = update
            .status
            .map_or_else(|| current.status.clone(), |s| s.as_str().to_string());
        let plan_type = update
            .plan_type
            .map_or_else(|| current.plan_type.clone(), |p| p.as_str().to_string());
        let subscription_status = update.subscription_status.map_or_else(
            || current.subscription_status.clone(),
            |s| s.as_str().to_string(),
        );
        let license_expires_at = update
            .license_expires_at
            .unwrap_or(current.license_expires_at);
        let grace_period_expires_at = update
            .grace_period_expires_at
            .unwrap_or(current.grace_period_expires_at);

        if let (Some(expires_at), Some(grace_until)) = (license_expires_at, grace_period_expires_at)
        {
            if grace_until < expires_at {
                return Err(Error::InvalidLicenseState(format!(
                    "grace period ends at {grace_until}, before license expiry at {expires_at}"
                )));
            }
        }

        sqlx::query(
            r"
            UPDATE license_records
            SET role = ?, status = ?, plan_type = ?, subscription_status = ?,
                license_expires_at = ?, grace_period_expires_at = ?
            WHERE user_id = ?
            ",
        )
        .bind(&role)
        .bind(&status)
        .bind(&plan_type)
        .bind(&subscription_status)
        .bind(license_expires_at)
        .bind(grace_period_expires_at)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        self.get_license(user_id).await
    }

    /// Set only the status column. Convenience path for block/unblock.
    pub async fn set_license_status(
        &self,
        user_id: &str,
        status: LicenseStatus,
    ) -> Result<LicenseRecord> {
        sqlx::query("UPDATE license_records SET status = ? WHERE user_id = ?")
            .bind(status.as_str())
            .bind(user_id)
            .execute(self.pool())
            .await?;

        self.get_license(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prospector_core::license::{PlanType, Role, SubscriptionStatus};

    #[tokio::test]
    async fn insert_and_get_license() {
        let db = Database::open_in_memory().await.unwrap();

        let record = db.insert_license("u-1", "seller@example.com").await.unwrap();

        assert_eq!(record.user_id, "u-1");
        assert_eq!(record.email, "seller@example.com");
        assert_eq!(record.status, "pending");
        assert_eq!(record.role, "user");
        assert_eq!(record.plan_type, "trial");
        assert!(record.license_expires_at.is_none());
    }

    #[tokio::test]
    async fn get_missing_license_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(matches!(
            db.get_license("nope").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "seller@example.com").await.unwrap();

        let record = db
            .update_license(
                "u-1",
                &LicenseUpdate {
                    status: Some(LicenseStatus::Active),
                    plan_type: Some(PlanType::Premium),
                    license_expires_at: Some(Some(1_000)),
                    ..LicenseUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(record.status, "active");
        assert_eq!(record.plan_type, "premium");
        assert_eq!(record.license_expires_at, Some(1_000));
        // untouched fields keep their values
        assert_eq!(record.role, "user");
        assert_eq!(record.subscription_status, "active");
    }

    #[tokio::test]
    async fn update_can_clear_dates() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "seller@example.com").await.unwrap();
        db.update_license(
            "u-1",
            &LicenseUpdate {
                license_expires_at: Some(Some(1_000)),
                grace_period_expires_at: Some(Some(2_000)),
                ..LicenseUpdate::default()
            },
        )
        .await
        .unwrap();

        let record = db
            .update_license(
                "u-1",
                &LicenseUpdate {
                    license_expires_at: Some(None),
                    grace_period_expires_at: Some(None),
                    ..LicenseUpdate::default()
                },
            )
            .await
            .unwrap();

        assert!(record.license_expires_at.is_none());
        assert!(record.grace_period_expires_at.is_none());
    }

    #[tokio::test]
    async fn grace_before_expiry_is_rejected_and_row_unchanged() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "seller@example.com").await.unwrap();
        db.update_license(
            "u-1",
            &LicenseUpdate {
                license_expires_at: Some(Some(5_000)),
                ..LicenseUpdate::default()
            },
        )
        .await
        .unwrap();

        let result = db
            .update_license(
                "u-1",
                &LicenseUpdate {
                    grace_period_expires_at: Some(Some(4_000)),
                    ..LicenseUpdate::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidLicenseState(_))));

        let record = db.get_license("u-1").await.unwrap();
        assert_eq!(record.license_expires_at, Some(5_000));
        assert!(record.grace_period_expires_at.is_none());
    }

    #[tokio::test]
    async fn grace_equal_to_expiry_is_accepted() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "seller@example.com").await.unwrap();

        let record = db
            .update_license(
                "u-1",
                &LicenseUpdate {
                    license_expires_at: Some(Some(5_000)),
                    grace_period_expires_at: Some(Some(5_000)),
                    ..LicenseUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(record.grace_period_expires_at, Some(5_000));
    }

    #[tokio::test]
    async fn set_status_touches_only_status() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "seller@example.com").await.unwrap();
        db.update_license(
            "u-1",
            &LicenseUpdate {
                role: Some(Role::Admin),
                subscription_status: Some(SubscriptionStatus::Pastdue),
                ..LicenseUpdate::default()
            },
        )
        .await
        .unwrap();

        let record = db
            .set_license_status("u-1", LicenseStatus::Blocked)
            .await
            .unwrap();

        assert_eq!(record.status, "blocked");
        assert_eq!(record.role, "admin");
        assert_eq!(record.subscription_status, "pastdue");
    }

    #[tokio::test]
    async fn list_licenses_filters_by_email() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_license("u-1", "ana@lojadonorte.com").await.unwrap();
        db.insert_license("u-2", "bruno@vendasul.com").await.unwrap();
        db.insert_license("u-3", "carla@lojadonorte.com").await.unwrap();

        assert_eq!(db.list_licenses(None).await.unwrap().len(), 3);
        assert_eq!(
            db.list_licenses(Some("lojadonorte")).await.unwrap().len(),
            2
        );
        assert_eq!(db.list_licenses(Some("bruno@")).await.unwrap().len(), 1);
    }
}
