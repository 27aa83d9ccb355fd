//! Scheduled jobs
//!
//! Background maintenance. Currently the only task is pruning old rate
//! limit windows so the counter table does not grow without bound.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;

// =========================================================================
// Rate limit window cleanup
// =========================================================================

/// Delete rate limit windows older than 2 minutes. Counters only matter
/// for the current minute, so anything older is garbage.
pub async fn cleanup_rate_limit_windows(pool: &PgPool) -> Result<u64, JobError> {
    let result = sqlx::query(
        r#"
        DELETE FROM rate_limit_windows
        WHERE window_start < NOW() - INTERVAL '2 minutes'
        "#,
    )
    .execute(pool)
    .await?;

    let rows_deleted = result.rows_affected();

    if rows_deleted > 0 {
        tracing::info!(
            rows_deleted = rows_deleted,
            "Cleaned up expired rate limit windows"
        );
    }

    Ok(rows_deleted)
}

// =========================================================================
// Job scheduler
// =========================================================================

/// Runs periodic maintenance tasks until the process exits.
pub struct JobScheduler {
    pool: PgPool,
    cleanup_interval: Duration,
}

impl JobScheduler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cleanup_interval: Duration::from_secs(60),
        }
    }

    /// Start the scheduler in the background. The returned handle can be
    /// used to abort it.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!("Job scheduler started");

        let mut cleanup = interval(self.cleanup_interval);

        loop {
            cleanup.tick().await;
            if let Err(e) = cleanup_rate_limit_windows(&self.pool).await {
                tracing::error!(error = %e, "Rate limit cleanup failed");
            }
        }
    }
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
