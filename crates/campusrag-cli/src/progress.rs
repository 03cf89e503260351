//! Progress reporting for long-running imports

use std::io::{self, IsTerminal, Write};

/// Single-line progress on stderr, silent when stderr is not a terminal
pub struct ProgressReporter {
    total: usize,
    processed: usize,
    interactive: bool,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            interactive: io::stderr().is_terminal(),
        }
    }

    pub fn set_message(&self, msg: &str) {
        if self.interactive {
            eprint!("\r[{}/{}] {:<50}", self.processed, self.total, msg);
            io::stderr().flush().ok();
        }
    }

    pub fn increment(&mut self) {
        self.processed += 1;
    }

    pub fn finish(&self) {
        if self.interactive {
            eprintln!("\rDone ({}/{})                                        ", self.processed, self.total);
        }
    }
}
