use super::{DatasetInfo, IndexingStatus, Publisher};
use crate::Result;
use crate::progress::Progress;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use humantime_serde::re::humantime::format_duration;
use ohno::bail;
use std::sync::Arc;
use tokio::time::Instant;

/// Default total time to wait for indexing.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Default pause between refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bounds on how long to wait for the sink to index an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    /// Check that the interval is non-zero and fits inside the timeout.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }

        if self.interval > self.timeout {
            bail!(
                "poll interval ({}) must not exceed poll timeout ({})",
                format_duration(self.interval),
                format_duration(self.timeout)
            );
        }

        Ok(())
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Refresh `dataset` until the sink reports its columns or `settings.timeout` elapses.
///
/// Refresh failures are logged and polling continues. Running out of time is not an
/// error: the last known state comes back as [`IndexingStatus::Pending`].
pub async fn await_indexing<P: Publisher>(
    publisher: &P,
    dataset: DatasetInfo,
    settings: PollSettings,
    progress: &dyn Progress,
) -> IndexingStatus {
    if dataset.is_indexed() {
        log::info!("dataset {} already indexed", dataset.id);
        return IndexingStatus::Ready(dataset);
    }

    let start = Instant::now();
    let id = dataset.id.clone();
    let mut latest = dataset;
    let checks = Arc::new(AtomicU64::new(0));

    progress.set_phase("Indexing");
    progress.set_determinate({
        let checks = Arc::clone(&checks);
        let id = id.clone();
        let total_ms = u64::try_from(settings.timeout.as_millis()).unwrap_or(u64::MAX);
        Box::new(move || {
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let checks = checks.load(Ordering::Relaxed);
            (total_ms, elapsed_ms.min(total_ms), format!("dataset {id}, {checks} checks"))
        })
    });

    while start.elapsed() < settings.timeout {
        let _ = checks.fetch_add(1, Ordering::Relaxed);

        match publisher.refresh(&id).await {
            Ok(info) => {
                log::debug!("dataset {id}: rows={:?} columns={:?}", info.row_count, info.column_count);
                if info.is_indexed() {
                    log::info!("dataset {id} indexed after {:.1}s", start.elapsed().as_secs_f64());
                    return IndexingStatus::Ready(info);
                }
                latest = info;
            }
            Err(e) => log::debug!("unable to refresh dataset {id}: {e}"),
        }

        tokio::time::sleep(settings.interval).await;
    }

    log::info!("dataset {id} not indexed within {:.0}s", settings.timeout.as_secs_f64());
    IndexingStatus::Pending(latest)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;
    use ohno::app_err;

    /// Progress sink that discards everything.
    #[derive(Debug)]
    pub(crate) struct SilentProgress;

    impl Progress for SilentProgress {
        fn set_phase(&self, _phase: &str) {}
        fn set_determinate(&self, _callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {}
        fn set_indeterminate(&self, _callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {}
        fn done(&self) {}
    }

    /// Publisher whose refresh reports columns after a fixed number of calls.
    #[derive(Debug)]
    pub(crate) struct ScriptedPublisher {
        pub indexed_after: Option<usize>,
        pub failing_refreshes: usize,
        pub fail_rename: bool,
        pub refreshes: AtomicUsize,
    }

    impl ScriptedPublisher {
        pub(crate) const fn new(indexed_after: Option<usize>) -> Self {
            Self {
                indexed_after,
                failing_refreshes: 0,
                fail_rename: false,
                refreshes: AtomicUsize::new(0),
            }
        }
    }

    impl Publisher for ScriptedPublisher {
        async fn upload(&self, csv: Vec<u8>, _file_name: &str) -> Result<DatasetInfo> {
            assert!(!csv.is_empty());
            Ok(DatasetInfo::new("ds-1"))
        }

        async fn rename(&self, id: &str, name: &str) -> Result<DatasetInfo> {
            if self.fail_rename {
                return Err(app_err!("HTTP 403 Forbidden"));
            }

            Ok(DatasetInfo {
                name: Some(name.to_string()),
                ..DatasetInfo::new(id)
            })
        }

        async fn refresh(&self, id: &str) -> Result<DatasetInfo> {
            let call = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failing_refreshes {
                return Err(app_err!("connection reset"));
            }

            let indexed = self.indexed_after.is_some_and(|n| call >= n);
            Ok(DatasetInfo {
                name: Some("AF".to_string()),
                row_count: Some(3),
                column_count: indexed.then_some(10),
                ..DatasetInfo::new(id)
            })
        }
    }

    fn settings(timeout_secs: u64, interval_secs: u64) -> PollSettings {
        PollSettings {
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(interval_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_once_columns_appear() {
        let publisher = ScriptedPublisher::new(Some(3));
        let status = await_indexing(&publisher, DatasetInfo::new("ds-1"), settings(60, 2), &SilentProgress).await;

        assert!(status.is_ready());
        assert_eq!(status.dataset().column_count, Some(10));
        assert_eq!(publisher.refreshes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_indexed_dataset_skips_polling() {
        let publisher = ScriptedPublisher::new(None);
        let indexed = DatasetInfo {
            row_count: Some(6),
            column_count: Some(10),
            ..DatasetInfo::new("ds-1")
        };
        let status = await_indexing(&publisher, indexed.clone(), settings(10, 2), &SilentProgress).await;

        assert_eq!(status, IndexingStatus::Ready(indexed));
        assert_eq!(publisher.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_after_timeout() {
        let publisher = ScriptedPublisher::new(None);
        let status = await_indexing(&publisher, DatasetInfo::new("ds-1"), settings(10, 2), &SilentProgress).await;

        assert!(!status.is_ready());
        assert_eq!(status.dataset().row_count, Some(3));
        assert_eq!(status.dataset().column_count, None);
        assert_eq!(publisher.refreshes.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failures_do_not_stop_polling() {
        let publisher = ScriptedPublisher {
            failing_refreshes: 2,
            ..ScriptedPublisher::new(Some(1))
        };
        let status = await_indexing(&publisher, DatasetInfo::new("ds-1"), settings(60, 2), &SilentProgress).await;

        assert!(status.is_ready());
        assert_eq!(publisher.refreshes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_refreshes_failing_keeps_initial_state() {
        let publisher = ScriptedPublisher {
            failing_refreshes: usize::MAX,
            ..ScriptedPublisher::new(Some(1))
        };
        let initial = DatasetInfo {
            name: Some("original".to_string()),
            ..DatasetInfo::new("ds-1")
        };
        let status = await_indexing(&publisher, initial.clone(), settings(4, 2), &SilentProgress).await;

        assert_eq!(status, IndexingStatus::Pending(initial));
    }

    #[test]
    fn test_validate_settings() {
        settings(60, 2).validate().unwrap();
        settings(5, 5).validate().unwrap();

        let err = settings(1, 10).validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed poll timeout"), "{err}");

        let zero = PollSettings {
            timeout: Duration::from_secs(5),
            interval: Duration::ZERO,
        };
        assert!(zero.validate().unwrap_err().to_string().contains("greater than zero"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_does_not_poll() {
        let publisher = ScriptedPublisher::new(Some(1));
        let status = await_indexing(&publisher, DatasetInfo::new("ds-1"), settings(0, 2), &SilentProgress).await;

        assert!(!status.is_ready());
        assert_eq!(publisher.refreshes.load(Ordering::SeqCst), 0);
    }
}
