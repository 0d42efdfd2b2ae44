#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

/// Wall-clock time spent in each phase of [`FluidSimulator::step`](super::simulator::FluidSimulator::step).
#[derive(Default, Clone)]
pub struct TimingStats {
    pub compute_times: Vec<Duration>,
    pub commit_times: Vec<Duration>,
    pub mask_times: Vec<Duration>,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> usize {
        self.compute_times.len()
    }

    #[cfg(feature = "timing")]
    pub fn print_summary(&self) {
        if self.compute_times.is_empty() {
            return;
        }

        let total_compute: Duration = self.compute_times.iter().sum();
        let total_commit: Duration = self.commit_times.iter().sum();
        let total_mask: Duration = self.mask_times.iter().sum();
        let total = total_compute + total_commit + total_mask;
        let n = self.steps() as f64;

        println!("\n{}", "=".repeat(60));
        println!("{:^60}", "STEP TIMING SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Total step time:               {:.3}s", total.as_secs_f64());
        println!("{}", "-".repeat(60));
        println!("Phase breakdown:");
        println!(
            "  Stencil + kernel:          {:>9.3}ms  (avg: {:>9.3}ms)",
            total_compute.as_secs_f64() * 1000.0,
            total_compute.as_secs_f64() * 1000.0 / n
        );
        println!(
            "  Commit:                    {:>9.3}ms  (avg: {:>9.3}ms)",
            total_commit.as_secs_f64() * 1000.0,
            total_commit.as_secs_f64() * 1000.0 / n
        );
        println!(
            "  Obstacle mask:             {:>9.3}ms  (avg: {:>9.3}ms)",
            total_mask.as_secs_f64() * 1000.0,
            total_mask.as_secs_f64() * 1000.0 / n
        );
        println!("{}", "=".repeat(60));
        println!("Steps:                         {}\n", self.steps());
    }

    #[cfg(not(feature = "timing"))]
    pub fn print_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
fn record<F, R>(f: F, slot: fn(&mut TimingStats) -> &mut Vec<Duration>) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        slot(&mut stats.borrow_mut()).push(elapsed);
    });
    result
}

#[cfg(feature = "timing")]
pub fn record_compute<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    record(f, |s| &mut s.compute_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_compute<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn record_commit<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    record(f, |s| &mut s.commit_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_commit<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn record_mask<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    record(f, |s| &mut s.mask_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_mask<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing() -> TimingStats {
    TIMING_STATS.with(|stats| stats.borrow().clone())
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing() -> TimingStats {
    TimingStats::new()
}

pub fn finalize_and_print() {
    finalize_timing().print_summary();
}
