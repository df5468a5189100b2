//! Zombie reaper for helper children.
//!
//! Some deployments run CGI-style helper processes (Whitaker's Words, local
//! CGI wrappers) whose children can outlive their parents' interest in them.
//! The reaper thread wakes on SIGCHLD and drains `waitpid(-1, WNOHANG)` until
//! nothing is left, so defunct children never accumulate under the daemon.
//!
//! The query core never talks to this module; the daemon starts it at boot.

use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::Signals;

/// Handle to the running reaper thread.
pub struct Reaper {
    handle: Option<std::thread::JoinHandle<()>>,
    signals_handle: signal_hook::iterator::backend::Handle,
}

impl Reaper {
    /// Start the reaper thread. Returns `None` when signal registration
    /// fails (e.g. in restricted sandboxes); the system runs fine without
    /// it, children are just waited inline.
    pub fn spawn() -> Option<Self> {
        let mut signals = match Signals::new([SIGCHLD]) {
            Ok(signals) => signals,
            Err(err) => {
                tracing::warn!(error = %err, "could not register SIGCHLD, reaper disabled");
                return None;
            }
        };
        let signals_handle = signals.handle();
        let handle = std::thread::Builder::new()
            .name("reaper".into())
            .spawn(move || {
                for _ in signals.forever() {
                    let reaped = reap_all();
                    if reaped > 0 {
                        tracing::debug!(reaped, "harvested zombie children");
                    }
                }
            })
            .ok()?;
        Some(Self {
            handle: Some(handle),
            signals_handle,
        })
    }

    /// Stop the reaper thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.signals_handle.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.signals_handle.close();
    }
}

/// Drain every exited child. Returns how many were collected.
fn reap_all() -> usize {
    let mut reaped = 0;
    loop {
        let mut status: libc::c_int = 0;
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
        reaped += 1;
    }
    reaped
}
