//! Durable job queue for the thumbnail pipeline.
//!
//! A FIFO channel between the upload service (producer) and the thumbnail
//! worker (single consumer), backed by the `jobs` table so enqueued work
//! survives restarts. `enqueue` returns only once the row is committed,
//! which also guarantees the metadata record it references is already
//! durable when both writes go through the same database.
//!
//! Delivery semantics: jobs are handed out in enqueue order; a job whose
//! processing fails is marked `failed` and never redelivered (at-most-once
//! effective delivery, a documented limitation). Jobs caught mid-flight by
//! a crash are flipped back to `pending` by `recover` at startup, which is
//! safe because thumbnail regeneration is idempotent.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::{DepotError, Result};

/// Fallback polling interval for the blocking dequeue.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Payload of one unit of thumbnail work.
///
/// Carries just enough identity to resolve its target; any future field
/// must tolerate being ignored by old consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailJob {
    /// Target file record ID.
    pub file_id: i64,
    /// Owner the job acts on behalf of.
    pub user_id: i64,
}

/// A claimed job, including its queue row id for ack/fail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueuedJob {
    /// Queue row ID.
    pub id: i64,
    /// Target file record ID.
    pub file_id: i64,
    /// Owner the job acts on behalf of.
    pub user_id: i64,
}

impl QueuedJob {
    /// The payload carried by this queue entry.
    pub fn job(&self) -> ThumbnailJob {
        ThumbnailJob {
            file_id: self.file_id,
            user_id: self.user_id,
        }
    }
}

/// Durable FIFO work queue with a single blocking consumer.
#[derive(Debug, Clone)]
pub struct JobQueue {
    pool: SqlitePool,
    notify: Arc<Notify>,
}

impl JobQueue {
    /// Create a queue over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Append a job, returning once it is durably accepted.
    pub async fn enqueue(&self, job: ThumbnailJob) -> Result<()> {
        sqlx::query("INSERT INTO jobs (file_id, user_id) VALUES (?, ?)")
            .bind(job.file_id)
            .bind(job.user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        debug!(file_id = job.file_id, user_id = job.user_id, "Enqueued thumbnail job");
        self.notify.notify_one();
        Ok(())
    }

    /// Block until a job is available, then claim it.
    ///
    /// The oldest pending job is marked `running` and handed to the
    /// caller. Single-consumer topology, so claims never contend.
    pub async fn dequeue(&self) -> Result<QueuedJob> {
        loop {
            let notified = self.notify.notified();

            if let Some(job) = self.try_claim().await? {
                return Ok(job);
            }

            // Wake on enqueue; the poll fallback covers jobs inserted
            // outside this process lifetime.
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    }

    /// Claim the oldest pending job if one exists.
    async fn try_claim(&self) -> Result<Option<QueuedJob>> {
        let candidate = sqlx::query_as::<_, QueuedJob>(
            "SELECT id, file_id, user_id FROM jobs
             WHERE status = 'pending' ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        let Some(job) = candidate else {
            return Ok(None);
        };

        let result = sqlx::query("UPDATE jobs SET status = 'running' WHERE id = ? AND status = 'pending'")
            .bind(job.id)
            .execute(&self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        if result.rows_affected() == 1 {
            Ok(Some(job))
        } else {
            Ok(None)
        }
    }

    /// Acknowledge a completed job, removing it from the queue.
    pub async fn complete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mark a job as permanently failed.
    ///
    /// Failed jobs stay in the table for diagnostics but are never
    /// redelivered.
    pub async fn fail(&self, id: i64, error: &str) -> Result<()> {
        sqlx::query("UPDATE jobs SET status = 'failed', error = ? WHERE id = ?")
            .bind(error)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(())
    }

    /// Return jobs stranded in `running` by a crash to `pending`.
    ///
    /// Call once at startup, before the worker begins consuming.
    pub async fn recover(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE jobs SET status = 'pending' WHERE status = 'running'")
            .execute(&self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        let recovered = result.rows_affected();
        if recovered > 0 {
            warn!(recovered, "Recovered in-flight jobs from a previous run");
        }
        Ok(recovered)
    }

    /// Number of pending jobs.
    pub async fn pending_count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DepotError::Database(e.to_string()))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tokio::time::timeout;

    async fn setup_queue() -> (Database, JobQueue) {
        let db = Database::open_in_memory().await.unwrap();
        let queue = JobQueue::new(db.pool().clone());
        (db, queue)
    }

    #[tokio::test]
    async fn test_enqueue_dequeue_order() {
        let (_db, queue) = setup_queue().await;

        queue
            .enqueue(ThumbnailJob { file_id: 1, user_id: 10 })
            .await
            .unwrap();
        queue
            .enqueue(ThumbnailJob { file_id: 2, user_id: 10 })
            .await
            .unwrap();
        queue
            .enqueue(ThumbnailJob { file_id: 3, user_id: 11 })
            .await
            .unwrap();

        let first = queue.dequeue().await.unwrap();
        let second = queue.dequeue().await.unwrap();
        let third = queue.dequeue().await.unwrap();

        assert_eq!(first.file_id, 1);
        assert_eq!(second.file_id, 2);
        assert_eq!(third.file_id, 3);
        assert_eq!(third.user_id, 11);
    }

    #[tokio::test]
    async fn test_complete_removes_job() {
        let (_db, queue) = setup_queue().await;

        queue
            .enqueue(ThumbnailJob { file_id: 1, user_id: 1 })
            .await
            .unwrap();
        let job = queue.dequeue().await.unwrap();
        queue.complete(job.id).await.unwrap();

        assert_eq!(queue.pending_count().await.unwrap(), 0);

        // Nothing left to claim
        assert!(queue.try_claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_job_is_not_redelivered() {
        let (_db, queue) = setup_queue().await;

        queue
            .enqueue(ThumbnailJob { file_id: 1, user_id: 1 })
            .await
            .unwrap();
        let job = queue.dequeue().await.unwrap();
        queue.fail(job.id, "boom").await.unwrap();

        assert_eq!(queue.pending_count().await.unwrap(), 0);
        assert!(queue.try_claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recover_returns_running_jobs() {
        let (_db, queue) = setup_queue().await;

        queue
            .enqueue(ThumbnailJob { file_id: 1, user_id: 1 })
            .await
            .unwrap();
        let job = queue.dequeue().await.unwrap();
        assert_eq!(queue.pending_count().await.unwrap(), 0);

        // Simulates a crash between claim and completion
        let recovered = queue.recover().await.unwrap();
        assert_eq!(recovered, 1);
        assert_eq!(queue.pending_count().await.unwrap(), 1);

        let again = queue.dequeue().await.unwrap();
        assert_eq!(again.id, job.id);
    }

    #[tokio::test]
    async fn test_dequeue_blocks_until_enqueue() {
        let (_db, queue) = setup_queue().await;

        // Nothing pending: dequeue must not return yet
        let early = timeout(Duration::from_millis(50), queue.dequeue()).await;
        assert!(early.is_err());

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue().await.unwrap() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue
            .enqueue(ThumbnailJob { file_id: 7, user_id: 3 })
            .await
            .unwrap();

        let job = timeout(Duration::from_secs(2), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.job(), ThumbnailJob { file_id: 7, user_id: 3 });
    }
}
