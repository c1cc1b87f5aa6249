//! Wall-clock breakdown of a run by phase of the Crank-Nicolson step.
//!
//! Collection only happens with the `timing` feature. Without it [`timed`]
//! is a plain call and no run statistics exist.

use std::fmt;
use std::time::Duration;

/// Part of a time step that is measured on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fourier number and conductivity correction.
    StepParameters,
    /// Arrhenius rate and heat release.
    Reaction,
    /// Matrix and right-hand side, reaction excluded.
    Assembly,
    LinearSolve,
    PropertyUpdate,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::StepParameters,
        Phase::Reaction,
        Phase::Assembly,
        Phase::LinearSolve,
        Phase::PropertyUpdate,
    ];

    fn label(self) -> &'static str {
        match self {
            Phase::StepParameters => "Fo / upsilon",
            Phase::Reaction => "pyrolysis",
            Phase::Assembly => "A and b",
            Phase::LinearSolve => "linear solve",
            Phase::PropertyUpdate => "properties",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TimingStats {
    totals: [Duration; 5],
    calls: [usize; 5],
    /// Time steps taken.
    pub steps: usize,
    /// Simulated seconds covered by those steps.
    pub simulated_time: f64,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn phase_total(&self, phase: Phase) -> Duration {
        self.totals[phase as usize]
    }

    pub fn phase_calls(&self, phase: Phase) -> usize {
        self.calls[phase as usize]
    }

    /// Run time not attributed to any phase.
    pub fn unmeasured(&self) -> Duration {
        self.total_time
            .saturating_sub(self.totals.iter().sum::<Duration>())
    }

    /// Wall-clock seconds per simulated second, `None` before any time has
    /// been simulated.
    pub fn cost_per_simulated_second(&self) -> Option<f64> {
        (self.simulated_time > 0.0).then(|| self.total_time.as_secs_f64() / self.simulated_time)
    }

    #[cfg_attr(not(feature = "timing"), allow(dead_code))]
    fn record(&mut self, phase: Phase, elapsed: Duration) {
        self.totals[phase as usize] += elapsed;
        self.calls[phase as usize] += 1;
    }
}

impl fmt::Display for TimingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_time.as_secs_f64().max(f64::MIN_POSITIVE);
        writeln!(
            f,
            "{} steps over {:.3} s simulated in {:.3} s",
            self.steps, self.simulated_time, self.total_time.as_secs_f64()
        )?;
        writeln!(f, "{:<14}{:>12}{:>14}{:>8}", "phase", "total ms", "per step us", "share")?;
        for phase in Phase::ALL {
            let seconds = self.phase_total(phase).as_secs_f64();
            writeln!(
                f,
                "{:<14}{:>12.3}{:>14.3}{:>7.1}%",
                phase.label(),
                seconds * 1e3,
                seconds * 1e6 / self.steps.max(1) as f64,
                100.0 * seconds / total
            )?;
        }
        write!(f, "{:<14}{:>12.3}", "other", self.unmeasured().as_secs_f64() * 1e3)?;
        if let Some(cost) = self.cost_per_simulated_second() {
            write!(f, "\nwall time per simulated second: {cost:.4e} s")?;
        }
        Ok(())
    }
}

#[cfg(feature = "timing")]
mod collect {
    use super::{Phase, TimingStats};
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    thread_local! {
        static RUN: RefCell<TimingStats> = RefCell::new(TimingStats::default());
    }

    pub fn start_run() {
        RUN.with(|run| *run.borrow_mut() = TimingStats::default());
    }

    pub fn timed<R>(phase: Phase, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        RUN.with(|run| run.borrow_mut().record(phase, elapsed));
        result
    }

    pub fn finish_run(total_time: Duration, simulated_time: f64, steps: usize) -> Option<TimingStats> {
        RUN.with(|run| {
            let mut run = run.borrow_mut();
            run.total_time = total_time;
            run.simulated_time = simulated_time;
            run.steps = steps;
            Some(run.clone())
        })
    }
}

#[cfg(not(feature = "timing"))]
mod collect {
    use super::{Phase, TimingStats};
    use std::time::Duration;

    pub fn start_run() {}

    pub fn timed<R>(_phase: Phase, f: impl FnOnce() -> R) -> R {
        f()
    }

    pub fn finish_run(_total_time: Duration, _simulated_time: f64, _steps: usize) -> Option<TimingStats> {
        None
    }
}

/// Clears the statistics of the current thread.
pub use collect::start_run;
/// Runs `f`, adding its duration to `phase`.
pub use collect::timed;
/// Closes the run and returns its statistics when the feature is on.
pub use collect::finish_run;
