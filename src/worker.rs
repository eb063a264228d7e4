//! Thumbnail worker for depot.
//!
//! A single long-running consumer: blocking dequeue, process, acknowledge.
//! One job gets one attempt; failures are terminal for that job and never
//! reach the upload caller. Per job the worker is `Idle -> Processing ->
//! Idle` and nothing else.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::file::{BlobStore, FileRepository, THUMBNAIL_WIDTHS};
use crate::queue::{JobQueue, QueuedJob, ThumbnailJob};

/// Errors that permanently fail a thumbnail job.
#[derive(Error, Debug)]
pub enum JobError {
    /// The job payload is missing a required field.
    #[error("missing {0} in job payload")]
    MissingField(&'static str),

    /// No record matches (file_id, user_id).
    ///
    /// Also covers records owned by someone else, so a forged job cannot
    /// act across tenants.
    #[error("file not found")]
    FileNotFound,

    /// The original blob could not be read or a derivative written.
    #[error("blob error: {0}")]
    Blob(String),

    /// The original bytes did not decode or re-encode as an image.
    #[error("image error: {0}")]
    Image(String),

    /// Metadata lookup failed.
    #[error("database error: {0}")]
    Database(String),
}

/// Background consumer that turns queued jobs into derived blobs.
pub struct ThumbnailWorker {
    pool: SqlitePool,
    blobs: BlobStore,
    queue: JobQueue,
}

impl ThumbnailWorker {
    /// Create a new worker over explicit store handles.
    pub fn new(pool: SqlitePool, blobs: BlobStore, queue: JobQueue) -> Self {
        Self { pool, blobs, queue }
    }

    /// Run the worker loop forever.
    pub async fn run(self) {
        info!("Thumbnail worker started");

        loop {
            match self.queue.dequeue().await {
                Ok(queued) => self.handle(queued).await,
                Err(e) => {
                    error!(error = %e, "Failed to dequeue job");
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Process one claimed job and settle it in the queue.
    async fn handle(&self, queued: QueuedJob) {
        match self.process(queued.job()).await {
            Ok(generated) => {
                info!(
                    job_id = queued.id,
                    file_id = queued.file_id,
                    generated,
                    "Thumbnail job completed"
                );
                if let Err(e) = self.queue.complete(queued.id).await {
                    error!(job_id = queued.id, error = %e, "Failed to acknowledge job");
                }
            }
            Err(e) => {
                error!(
                    job_id = queued.id,
                    file_id = queued.file_id,
                    error = %e,
                    "Thumbnail job failed permanently"
                );
                if let Err(ack) = self.queue.fail(queued.id, &e.to_string()).await {
                    error!(job_id = queued.id, error = %ack, "Failed to mark job failed");
                }
            }
        }
    }

    /// Generate every configured thumbnail width for one job.
    ///
    /// Widths run in descending order; the first per-size failure aborts
    /// the remaining sizes, leaving whatever derivatives were already
    /// written (partial output is an accepted terminal state).
    /// Regeneration overwrites deterministically, so re-running the same
    /// job yields byte-identical derivatives.
    pub async fn process(&self, job: ThumbnailJob) -> Result<usize, JobError> {
        if job.file_id <= 0 {
            return Err(JobError::MissingField("fileId"));
        }
        if job.user_id <= 0 {
            return Err(JobError::MissingField("userId"));
        }

        let record = FileRepository::new(&self.pool)
            .get_by_id_for_owner(job.file_id, job.user_id)
            .await
            .map_err(|e| JobError::Database(e.to_string()))?
            .ok_or(JobError::FileNotFound)?;

        let original = self
            .blobs
            .read(&record.storage_path)
            .map_err(|e| JobError::Blob(e.to_string()))?;

        // Derivatives keep the original's encoding
        let format = image::guess_format(&original).unwrap_or(ImageFormat::Png);
        let img =
            image::load_from_memory(&original).map_err(|e| JobError::Image(e.to_string()))?;

        for width in THUMBNAIL_WIDTHS {
            let thumb = scale_to_width(&img, width);

            let mut encoded = Vec::new();
            thumb
                .write_to(&mut Cursor::new(&mut encoded), format)
                .map_err(|e| JobError::Image(e.to_string()))?;

            self.blobs
                .write_derived(&record.storage_path, width, &encoded)
                .map_err(|e| JobError::Blob(e.to_string()))?;

            debug!(file_id = job.file_id, width, "Wrote derived blob");
        }

        Ok(THUMBNAIL_WIDTHS.len())
    }
}

/// Resize to an exact target width, preserving the aspect ratio.
fn scale_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let height = ((u64::from(width) * u64::from(img.height())) / u64::from(img.width())).max(1);
    img.resize_exact(width, height as u32, FilterType::CatmullRom)
}
