//! Relays termination signals from the launcher to its child.
//!
//! [`ForwardGuard::install`] runs before the child is spawned. It blocks the
//! forwarded signals on the calling thread and installs the relay handlers, so a
//! signal that arrives while the child is being created stays pending instead of
//! killing the launcher. [`ForwardGuard::attach`] publishes the child's pid and
//! lifts the mask; anything held back is relayed at that point.
//!
//! On Linux, kernel-generated signals (`si_code > 0`, e.g. Ctrl-C or a terminal
//! hangup) are not relayed: the kernel already delivers them to the whole
//! foreground process group, child included. Signals sent with kill(2) are
//! relayed whether they named the launcher's pid or its process group. A child
//! sharing the launcher's group therefore sees `kill -TERM -- -$PGID` twice.

use std::sync::atomic::{AtomicI32, Ordering};

use nix::errno::Errno;
use nix::libc::{c_int, c_void, siginfo_t};
use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, kill, pthread_sigmask, sigaction,
};
use nix::unistd::Pid;

pub const FORWARDED_SIGNALS: [Signal; 4] = [
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGHUP,
    Signal::SIGQUIT,
];

static CHILD_PID: AtomicI32 = AtomicI32::new(0);
/// A signal caught before any child pid was published (another thread took it).
static PENDING: AtomicI32 = AtomicI32::new(0);

/// Keeps the relay handlers installed; restores the previous dispositions and mask on drop.
pub struct ForwardGuard {
    previous: Vec<(Signal, SigAction)>,
    /// Mask to go back to, while the forwarded signals are still blocked.
    saved_mask: Option<SigSet>,
}

impl ForwardGuard {
    /// Blocks the forwarded signals on this thread, then installs the relay handlers.
    pub fn install() -> nix::Result<Self> {
        let mut saved = SigSet::empty();
        pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&forwarded_set()), Some(&mut saved))?;
        PENDING.store(0, Ordering::SeqCst);

        let mut guard = ForwardGuard {
            previous: Vec::with_capacity(FORWARDED_SIGNALS.len()),
            saved_mask: Some(saved),
        };
        let action = SigAction::new(
            SigHandler::SigAction(relay),
            SaFlags::SA_SIGINFO | SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        for signal in FORWARDED_SIGNALS {
            // SAFETY: `relay` only touches atomics and calls kill(2), both async-signal-safe.
            let previous = unsafe { sigaction(signal, &action)? };
            guard.previous.push((signal, previous));
        }
        Ok(guard)
    }

    /// Points the handlers at `pid` and unblocks the forwarded signals.
    pub fn attach(&mut self, pid: u32) -> nix::Result<()> {
        let pid = i32::try_from(pid).map_err(|_| Errno::EINVAL)?;
        CHILD_PID.store(pid, Ordering::SeqCst);
        self.unblock()?;

        let missed = PENDING.swap(0, Ordering::SeqCst);
        if missed != 0 {
            kill(Pid::from_raw(pid), Signal::try_from(missed)?)?;
        }
        Ok(())
    }

    fn unblock(&mut self) -> nix::Result<()> {
        match self.saved_mask.take() {
            Some(mask) => pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&mask), None),
            None => Ok(()),
        }
    }
}

impl Drop for ForwardGuard {
    fn drop(&mut self) {
        CHILD_PID.store(0, Ordering::SeqCst);
        for (signal, previous) in self.previous.drain(..).rev() {
            // SAFETY: restores a disposition returned by an earlier sigaction(2).
            let _ = unsafe { sigaction(signal, &previous) };
        }
        // A signal still pending here meets the restored disposition.
        let _ = self.unblock();
    }
}

fn forwarded_set() -> SigSet {
    let mut set = SigSet::empty();
    for signal in FORWARDED_SIGNALS {
        set.add(signal);
    }
    set
}

extern "C" fn relay(signal: c_int, info: *mut siginfo_t, _context: *mut c_void) {
    // SAFETY: the kernel hands SA_SIGINFO handlers a valid siginfo_t or null.
    let si_code = unsafe { info.as_ref() }.map(|info| info.si_code);
    if !should_relay(si_code) {
        return;
    }

    let pid = CHILD_PID.load(Ordering::SeqCst);
    if pid <= 0 {
        PENDING.store(signal, Ordering::SeqCst);
        return;
    }
    if let Ok(signal) = Signal::try_from(signal) {
        let _ = kill(Pid::from_raw(pid), signal);
    }
}

// Linux marks kernel-generated signals with a positive si_code (SI_KERNEL);
// kill(2), sigqueue(3) and tgkill(2) use zero or negative codes.
#[cfg(target_os = "linux")]
fn should_relay(si_code: Option<c_int>) -> bool {
    si_code.is_none_or(|code| code <= 0)
}

#[cfg(not(target_os = "linux"))]
fn should_relay(_si_code: Option<c_int>) -> bool {
    true
}
