//! Wall-clock timing of the slow pipeline steps (build, push).

use std::time::{Duration, Instant};

use crate::ui;

pub struct Timer {
    step: &'static str,
    started: Instant,
}

impl Timer {
    pub fn start(step: &'static str) -> Self {
        Self {
            step,
            started: Instant::now(),
        }
    }

    /// Report how long the step took. Returns the elapsed time.
    pub fn finish(self, quiet: bool) -> Duration {
        let elapsed = self.started.elapsed();
        tracing::debug!(step = self.step, ?elapsed, "step finished");
        ui::detail(quiet, &format!("{} took {}", self.step, human(elapsed)));
        elapsed
    }
}

fn human(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m {:02}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_short_and_long_steps() {
        assert_eq!(human(Duration::from_millis(1500)), "1.5s");
        assert_eq!(human(Duration::from_secs(125)), "2m 05s");
    }
}
