use std::time::Instant;

/// Accumulates wall-clock time for a sequence of named phases.
#[derive(Clone, Debug)]
pub struct PhaseTimer {
    phases: Vec<(&'static str, u128)>,
    current: Option<(&'static str, Instant)>,
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self { phases: Vec::new(), current: None }
    }
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing `phase`, closing the running phase if there is one.
    #[inline(always)]
    pub fn start(&mut self, phase: &'static str) {
        self.stop();
        self.current = Some((phase, Instant::now()));
    }

    /// Closes the running phase and returns its duration in nanoseconds.
    #[inline(always)]
    pub fn stop(&mut self) -> u128 {
        match self.current.take() {
            Some((phase, started)) => {
                let elapsed = started.elapsed().as_nanos();
                self.phases.push((phase, elapsed));
                elapsed
            }
            None => 0,
        }
    }

    /// Completed phases in the order they were started.
    pub fn phases(&self) -> &[(&'static str, u128)] {
        &self.phases
    }

    pub fn total(&self) -> u128 {
        self.phases.iter().map(|(_, nanos)| nanos).sum()
    }

    /// Sums every completed run of `phase`.
    pub fn get(&self, phase: &str) -> u128 {
        self.phases.iter().filter(|(name, _)| *name == phase).map(|(_, nanos)| nanos).sum()
    }
}

#[test]
fn test_timer_phases() {
    use std::{thread, time::Duration};

    let mut timer = PhaseTimer::new();
    assert_eq!(timer.stop(), 0);

    timer.start("scan");
    thread::sleep(Duration::from_millis(20));
    timer.start("encode");
    thread::sleep(Duration::from_millis(10));
    timer.stop();

    let names: Vec<_> = timer.phases().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, ["scan", "encode"]);
    assert!(timer.get("scan") >= 20_000_000);
    assert!(timer.get("encode") >= 10_000_000);
    assert_eq!(timer.total(), timer.get("scan") + timer.get("encode"));
    assert_eq!(timer.get("header"), 0);
}
