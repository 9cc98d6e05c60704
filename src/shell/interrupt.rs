//! Operator interrupt tracking.
//!
//! The child shares dotrun's foreground process group, so Ctrl+C reaches
//! it directly. dotrun itself only records that the interrupt happened
//! and keeps running so it can report the cancellation. An interrupt that
//! arrives while no child is running stays pending until the next launch,
//! which is then cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing::debug;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INSTALL: Once = Once::new();

/// Install the process-wide Ctrl+C handler (idempotent).
pub fn install_handler() {
    INSTALL.call_once(|| {
        let result = ctrlc::set_handler(|| {
            INTERRUPTED.store(true, Ordering::SeqCst);
        });
        if let Err(e) = result {
            debug!("Could not install interrupt handler: {}", e);
        }
    });
}

/// Whether an interrupt is recorded, without clearing it.
#[cfg(test)]
pub(crate) fn is_pending() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Return whether an interrupt was recorded, clearing it.
pub fn take() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
