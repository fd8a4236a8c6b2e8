//! Execution configuration for the parallel kernels
//!
//! Configuration only decides scheduling: when a kernel hands work to
//! rayon. Results never depend on it.

use std::sync::RwLock;

/// Scheduling knobs for the algebra kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecConfig {
    /// Minimum amount of work (rows or stored entries) before a kernel
    /// switches from a sequential loop to rayon
    pub parallel_threshold: usize,
}

static GLOBAL: RwLock<ExecConfig> = RwLock::new(ExecConfig::DEFAULT);

impl ExecConfig {
    const DEFAULT: ExecConfig = ExecConfig {
        parallel_threshold: 4096,
    };

    /// Config with the given parallel threshold
    pub fn with_parallel_threshold(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// Force every kernel onto its sequential path
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
        }
    }

    /// Whether `work` units are enough to go parallel
    pub fn should_parallelize(&self, work: usize) -> bool {
        work >= self.parallel_threshold && rayon::current_num_threads() > 1
    }

    /// Process-wide configuration
    pub fn global() -> Self {
        match GLOBAL.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the process-wide configuration
    pub fn set_global(config: ExecConfig) {
        log::debug!("exec config: parallel_threshold={}", config.parallel_threshold);
        match GLOBAL.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Run `f` with `config` installed process-wide, restoring the previous
/// value afterwards. Callers are serialized so tests never observe each
/// other's settings.
#[cfg(test)]
pub(crate) fn with_global<R>(config: ExecConfig, f: impl FnOnce() -> R) -> R {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());

    struct Restore(ExecConfig);

    impl Drop for Restore {
        fn drop(&mut self) {
            ExecConfig::set_global(self.0);
        }
    }

    let _lock = match LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let _restore = Restore(ExecConfig::global());
    ExecConfig::set_global(config);
    f()
}
