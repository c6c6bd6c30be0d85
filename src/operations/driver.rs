// Cycle Driver
// Runs reconciliation on a fixed cadence until something fails

use std::convert::Infallible;
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::action_log::ActionLog;
use super::fingerprint::Fingerprinter;
use super::reconcile::{ReconcileOptions, Reconciler, SyncReport};
use crate::core::MirrorSettings;
use crate::error::Result;

/// Drives one source/replica pair through repeated cycles
#[derive(Debug, Clone)]
pub struct CycleDriver {
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    reconciler: Reconciler,
}

impl CycleDriver {
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        interval: Duration,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval,
            reconciler,
        }
    }

    /// Build a driver from validated settings
    pub fn from_settings(settings: &MirrorSettings) -> Self {
        let reconciler = Reconciler::new(
            Fingerprinter::new(settings.chunk_size),
            ReconcileOptions {
                continue_on_error: settings.continue_on_error,
            },
        );
        Self::new(
            settings.source.clone(),
            settings.replica.clone(),
            settings.interval,
            reconciler,
        )
    }

    /// Reconcile once, then log the summary and the cycle separator
    ///
    /// On error nothing further is logged for the cycle.
    pub fn run_cycle<D: Write, M: Write>(&self, log: &mut ActionLog<D, M>) -> Result<SyncReport> {
        let started = Instant::now();
        let report = self.reconciler.reconcile(&self.source, &self.replica, log)?;

        log.record(&report.summary())?;
        if !report.failures.is_empty() {
            log.record(&format!("Failed paths: {}.", report.failures.len()))?;
        }
        log.separator()?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            files_changed = report.files_changed,
            dirs_changed = report.dirs_changed,
            "cycle finished"
        );
        Ok(report)
    }

    /// Run `cycles` cycles, sleeping the interval between them
    pub fn run_cycles<D: Write, M: Write>(
        &self,
        log: &mut ActionLog<D, M>,
        cycles: usize,
    ) -> Result<Vec<SyncReport>> {
        let mut reports = Vec::with_capacity(cycles);
        for n in 0..cycles {
            if n > 0 {
                thread::sleep(self.interval);
            }
            reports.push(self.run_cycle(log)?);
        }
        Ok(reports)
    }

    /// Run cycles forever; returns only when a cycle fails
    pub fn run<D: Write, M: Write>(&self, log: &mut ActionLog<D, M>) -> Result<Infallible> {
        info!(
            source = %self.source.display(),
            replica = %self.replica.display(),
            interval_secs = self.interval.as_secs(),
            "mirroring started"
        );

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            debug!(cycle, "starting cycle");
            self.run_cycle(log)?;
            thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::fs;
    use tempfile::TempDir;

    fn driver_for(dir: &TempDir) -> CycleDriver {
        CycleDriver::new(
            dir.path().join("source"),
            dir.path().join("replica"),
            Duration::from_millis(5),
            Reconciler::default(),
        )
    }

    #[test]
    fn test_cycle_ends_with_summary_and_separator() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("source")).unwrap();
        fs::create_dir_all(dir.path().join("replica")).unwrap();
        let mut log = ActionLog::<_, Vec<u8>>::new("mem.log", Vec::new(), None);

        let report = driver_for(&dir).run_cycle(&mut log).unwrap();

        assert!(report.all_same);
        let text = String::from_utf8(log.into_parts().0).unwrap();
        assert!(text.ends_with("] All files are identical. No changes needed.\n\n"));
    }

    #[test]
    fn test_run_cycles_converges_then_settles() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("source")).unwrap();
        fs::write(dir.path().join("source/a.txt"), "hello").unwrap();
        let mut log = ActionLog::<_, Vec<u8>>::new("mem.log", Vec::new(), None);

        let reports = driver_for(&dir).run_cycles(&mut log, 2).unwrap();

        assert!(!reports[0].all_same);
        assert!(reports[1].all_same);
        let text = String::from_utf8(log.into_parts().0).unwrap();
        assert_eq!(text.matches("\n\n").count(), 2);
    }

    #[test]
    fn test_failed_cycle_writes_no_summary() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("source")).unwrap();
        fs::write(dir.path().join("source/a.txt"), "hello").unwrap();
        fs::write(dir.path().join("replica"), "in the way").unwrap();
        let mut log = ActionLog::<_, Vec<u8>>::new("mem.log", Vec::new(), None);

        let err = driver_for(&dir).run(&mut log).unwrap_err();

        assert!(matches!(err, SyncError::Conflict { .. }));
        assert!(log.into_parts().0.is_empty());
    }
}
