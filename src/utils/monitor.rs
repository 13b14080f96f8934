#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StepStats {
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub step_time: Duration,
    pub elapsed_time: Duration,
}

/// 每個遷移步驟結束時記錄耗時與記憶體
#[cfg(feature = "cli")]
pub struct StepMonitor {
    system: System,
    pid: Option<Pid>,
    start_time: Instant,
    step_start: Instant,
    peak_memory_mb: u64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl StepMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };

        let now = Instant::now();
        Self {
            system: System::new(),
            pid,
            start_time: now,
            step_start: now,
            peak_memory_mb: 0,
            enabled,
        }
    }

    pub fn begin_step(&mut self) {
        self.step_start = Instant::now();
    }

    fn sample(&mut self) -> Option<StepStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let memory_mb = self.system.process(pid)?.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);

        Some(StepStats {
            memory_usage_mb: memory_mb,
            peak_memory_mb: self.peak_memory_mb,
            step_time: self.step_start.elapsed(),
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_step(&mut self, step: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - Memory: {}MB, Peak: {}MB, Step: {:?}, Total: {:?}",
                step,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.step_time,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&mut self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }
}

#[cfg(feature = "cli")]
impl Default for StepMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時不依賴 sysinfo
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct StepMonitor;

#[cfg(not(feature = "cli"))]
impl StepMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn begin_step(&mut self) {}

    pub fn log_step(&mut self, _step: &str) {}

    pub fn log_final_stats(&mut self) {}
}
