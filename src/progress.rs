/// Observational sink for phase/counter updates. Implementations must not
/// influence algorithmic outcomes.
pub trait Progress {
    /// Called once per processed unit of the phase named by `label`.
    fn tick(&mut self, label: &str);
    /// Called when processing ends; flushes the final count.
    fn finish(&mut self);
}

/// Discards all updates.
pub struct NullProgress;

impl Progress for NullProgress {
    fn tick(&mut self, _label: &str) {}
    fn finish(&mut self) {}
}

/// Human-readable progress on stderr: an in-place counter every 100 units
/// while the phase runs (only when stderr is a terminal), and a final
/// `label: n - done` line when the phase changes or processing ends.
pub struct StderrProgress {
    count: u64,
    last_label: Option<String>,
    interactive: bool,
}

impl StderrProgress {
    pub fn new() -> Self {
        StderrProgress {
            count: 0,
            last_label: None,
            interactive: atty::is(atty::Stream::Stderr),
        }
    }
}

impl Default for StderrProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for StderrProgress {
    fn tick(&mut self, label: &str) {
        match self.last_label.as_deref() {
            Some(last) if last == label => {
                self.count += 1;
                if self.interactive && self.count % 100 == 0 {
                    eprint!("\r{}: {}", label, self.count);
                }
            }
            Some(last) => {
                eprintln!("\r{}: {} - done", last, self.count);
                self.last_label = Some(label.to_string());
                self.count = 1;
            }
            None => {
                self.last_label = Some(label.to_string());
                self.count = 1;
            }
        }
    }

    fn finish(&mut self) {
        if let Some(last) = self.last_label.take() {
            eprintln!("\r{}: {} - done", last, self.count);
            self.count = 0;
        }
    }
}
