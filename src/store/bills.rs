//! Bill persistence

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::bill::{Bill, BillChanges, BillSummary, Frequency, NewBill};
use crate::error::AppResult;

/// Raw row shape; frequency is stored as text and mapped on read.
#[derive(Debug, FromRow)]
struct BillRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    amount: Decimal,
    due_date: NaiveDate,
    frequency: String,
    category: Option<String>,
    notes: Option<String>,
    is_paid: bool,
    paid_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BillRow> for Bill {
    fn from(row: BillRow) -> Self {
        Bill {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            amount: row.amount,
            due_date: row.due_date,
            frequency: Frequency::parse(&row.frequency).unwrap_or_default(),
            category: row.category,
            notes: row.notes,
            is_paid: row.is_paid,
            paid_date: row.paid_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SQL access to the bills table, always scoped by owning user
#[derive(Debug, Clone)]
pub struct BillStore {
    pool: PgPool,
}

impl BillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user_id: Uuid, bill: NewBill) -> AppResult<Bill> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            INSERT INTO bills (id, user_id, name, amount, due_date, frequency, category, notes, is_paid, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, NOW(), NOW())
            RETURNING id, user_id, name, amount, due_date, frequency, category, notes, is_paid, paid_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&bill.name)
        .bind(bill.amount.value())
        .bind(bill.due_date)
        .bind(bill.frequency.as_str())
        .bind(&bill.category)
        .bind(&bill.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// All bills for a user, soonest due first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Bill>> {
        let rows = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT id, user_id, name, amount, due_date, frequency, category, notes, is_paid, paid_date, created_at, updated_at
            FROM bills
            WHERE user_id = $1
            ORDER BY due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find(&self, bill_id: Uuid, user_id: Uuid) -> AppResult<Option<Bill>> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT id, user_id, name, amount, due_date, frequency, category, notes, is_paid, paid_date, created_at, updated_at
            FROM bills
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(bill_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Apply a validated partial update in a single statement, so a
    /// concurrent writer can never observe a half-applied change.
    pub async fn update(
        &self,
        bill_id: Uuid,
        user_id: Uuid,
        changes: BillChanges,
    ) -> AppResult<Option<Bill>> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            UPDATE bills
            SET
                name = COALESCE($3, name),
                amount = COALESCE($4, amount),
                due_date = COALESCE($5, due_date),
                frequency = COALESCE($6, frequency),
                category = COALESCE($7, category),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, amount, due_date, frequency, category, notes, is_paid, paid_date, created_at, updated_at
            "#,
        )
        .bind(bill_id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(changes.amount.map(|a| a.value()))
        .bind(changes.due_date)
        .bind(changes.frequency.map(|f| f.as_str()))
        .bind(&changes.category)
        .bind(&changes.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, bill_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1 AND user_id = $2")
            .bind(bill_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a bill paid as of `paid_on`. Re-paying an already paid bill just
    /// refreshes the paid date.
    pub async fn mark_paid(
        &self,
        bill_id: Uuid,
        user_id: Uuid,
        paid_on: NaiveDate,
    ) -> AppResult<Option<Bill>> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            UPDATE bills
            SET is_paid = TRUE, paid_date = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, amount, due_date, frequency, category, notes, is_paid, paid_date, created_at, updated_at
            "#,
        )
        .bind(bill_id)
        .bind(user_id)
        .bind(paid_on)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Aggregate counts and totals for a user's bills in one query.
    /// Overdue means unpaid with a due date strictly before `today`.
    pub async fn summary_for_user(&self, user_id: Uuid, today: NaiveDate) -> AppResult<BillSummary> {
        let (total_bills, unpaid_count, overdue_count, mut total_due, mut total_overdue): (
            i64,
            i64,
            i64,
            Decimal,
            Decimal,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE NOT is_paid),
                COUNT(*) FILTER (WHERE NOT is_paid AND due_date < $2),
                COALESCE(SUM(amount) FILTER (WHERE NOT is_paid), 0),
                COALESCE(SUM(amount) FILTER (WHERE NOT is_paid AND due_date < $2), 0)
            FROM bills
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        // The zero fallbacks come back with scale 0; keep totals at cents
        total_due.rescale(2);
        total_overdue.rescale(2);

        Ok(BillSummary {
            total_bills,
            unpaid_count,
            overdue_count,
            total_due,
            total_overdue,
        })
    }
}
