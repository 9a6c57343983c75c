//! Bounded worker pool.
//!
//! Jobs are queued on a channel that a fixed number of workers drain. Each
//! job runs as its own task, so a panicking job only fails itself.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinError, JoinSet};

/// Runs futures with at most `concurrency` of them in flight.
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool; a concurrency of 0 is treated as 1.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every job and wait until all of them have settled.
    ///
    /// Jobs start in submission order; completion order is unspecified.
    /// Results are returned in submission order, paired with the job index.
    pub async fn run<I, F, T>(&self, jobs: I) -> Vec<(usize, Result<T, JoinError>)>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut queued = 0;
        for job in jobs {
            // The receiver is alive until the workers finish.
            let _ = tx.send((queued, job));
            queued += 1;
        }
        drop(tx);

        let rx = Arc::new(Mutex::new(rx));
        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency.min(queued) {
            let rx = Arc::clone(&rx);
            workers.spawn(async move {
                let mut settled = Vec::new();
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some((index, job)) = next else {
                        break;
                    };
                    settled.push((index, tokio::spawn(job).await));
                }
                settled
            });
        }

        let mut results = Vec::with_capacity(queued);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(settled) => results.extend(settled),
                Err(e) => tracing::error!(error = %e, "Worker stopped unexpectedly"),
            }
        }
        results.sort_by_key(|(index, _)| *index);
        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_results_in_submission_order() {
        let pool = WorkerPool::new(3);
        let jobs = (0..10u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(10 - i)).await;
            i * 2
        });

        let results: Vec<_> = pool
            .run(jobs)
            .await
            .into_iter()
            .map(|(index, result)| (index, result.unwrap()))
            .collect();
        let expected: Vec<_> = (0..10u64).map(|i| (usize::try_from(i).unwrap(), i * 2)).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..8).map(|_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        });

        let results = pool.run(jobs).await;
        assert_eq!(results.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let pool = WorkerPool::new(1);
        let jobs = (0..3).map(|i| async move {
            assert!(i != 1, "job {i} failed");
            i
        });

        let results = pool.run(jobs).await;
        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].1.as_ref().unwrap(), 0);
        assert!(results[1].1.as_ref().unwrap_err().is_panic());
        assert_eq!(*results[2].1.as_ref().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let pool = WorkerPool::new(4);
        let results = pool.run(Vec::<std::future::Ready<()>>::new()).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_concurrency_is_one() {
        assert_eq!(WorkerPool::new(0).concurrency(), 1);
    }
}
