//! Progress bar display for convergence runs

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display over the steps of a plan
pub struct ProgressDisplay {
    step_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with the total step count
    pub fn new(total_steps: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let step_pb = ProgressBar::new(total_steps);
        step_pb.set_style(style);

        Self { step_pb }
    }

    /// Show the step about to run
    pub fn start_step(&self, summary: &str) {
        self.step_pb.set_message(summary.to_string());
    }

    /// Mark the current step as done
    pub fn inc(&self) {
        self.step_pb.inc(1);
    }

    /// Finish with a closing message
    pub fn finish(&self, message: &str) {
        self.step_pb.finish_with_message(message.to_string());
    }

    /// Abandon on error, leaving the bar where it stopped
    pub fn abandon(&self) {
        self.step_pb.abandon();
    }
}
