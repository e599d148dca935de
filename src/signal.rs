//! Scoped suppression of keyboard interrupts.
//!
//! While a launched program runs in the foreground, Ctrl-C reaches both the
//! program and the launcher. The guard keeps the launcher alive so the
//! program alone decides how the interrupt ends the run. A handler that does
//! nothing is used instead of ignoring the signal, because ignored signals
//! stay ignored in spawned programs while handled ones reset to the default.

/// Suppresses `SIGINT` until dropped, then restores the previous handler.
#[derive(Debug)]
#[must_use = "interrupts are only suppressed while the guard is alive"]
pub struct InterruptGuard {
    #[cfg(unix)]
    previous: Option<libc::sighandler_t>,
}

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {}

impl InterruptGuard {
    /// Installs the guard.
    #[cfg(unix)]
    pub fn install() -> Self {
        let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: the handler is async-signal-safe; it does nothing.
        let previous = unsafe { libc::signal(libc::SIGINT, handler) };
        Self {
            previous: (previous != libc::SIG_ERR).then_some(previous),
        }
    }

    /// Installs the guard.
    #[cfg(not(unix))]
    pub fn install() -> Self {
        Self {}
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(previous) = self.previous {
            // SAFETY: `previous` was returned by `signal` for this signal.
            unsafe {
                libc::signal(libc::SIGINT, previous);
            }
        }
    }
}
