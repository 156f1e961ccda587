//! Ctrl-C handling
//!
//! The first Ctrl-C asks the run loop to stop once the current test has
//! finished. A second one exits immediately with status 130.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Exit status used when a second interrupt arrives
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What the listener does with one Ctrl-C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Finish the current test, then stop
    Stop,
    /// Leave now with this status
    Exit(i32),
}

/// Shared stop request, checked by the run loop between tests
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Returns true if a stop had already been requested
    fn escalate(&self) -> bool {
        self.requested.swap(true, Ordering::SeqCst)
    }

    fn on_ctrl_c(&self) -> Signal {
        if self.escalate() {
            Signal::Exit(INTERRUPTED_EXIT_CODE)
        } else {
            Signal::Stop
        }
    }

    /// Listen for Ctrl-C on a background thread
    pub fn install(&self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the Ctrl-C listener")?;
        let interrupt = self.clone();

        thread::Builder::new()
            .name("ctrl-c".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    loop {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            warn!(error = %e, "Ctrl-C listener stopped");
                            return;
                        }
                        // Exit first: stderr may be busy with a report write
                        match interrupt.on_ctrl_c() {
                            Signal::Exit(code) => std::process::exit(code),
                            Signal::Stop => eprintln!(
                                "\nInterrupted, stopping after the current test (Ctrl-C again to exit)"
                            ),
                        }
                    }
                })
            })
            .context("Failed to spawn the Ctrl-C listener")?;

        debug!("installed Ctrl-C handler");
        Ok(())
    }
}
