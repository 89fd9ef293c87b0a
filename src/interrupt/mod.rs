//! Deferred termination signals
//!
//! A termination request (Ctrl-C or SIGTERM) is recorded on a shared [`Interrupt`] handle
//! instead of killing the process. Durable writes run inside a [`CriticalSection`]; while
//! one is active the request stays pending, and it is handed to waiters as soon as the last
//! section ends. At most one request is kept: later ones are dropped.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

const NO_SIGNAL: u8 = 0;

/// Termination signals the crawler reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// SIGINT / Ctrl-C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl Signal {
    fn to_code(self) -> u8 {
        match self {
            Self::Interrupt => 1,
            Self::Terminate => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Interrupt),
            2 => Some(Self::Terminate),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicU8,
    blocked: AtomicUsize,
    notify: Notify,
}

/// Shared handle recording termination requests
///
/// Cloning is cheap; every clone observes the same pending request.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    /// Creates a handle with no pending request
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a termination request
    ///
    /// Only the first request is kept until the process exits.
    pub fn raise(&self, signal: Signal) {
        let recorded = self
            .inner
            .pending
            .compare_exchange(NO_SIGNAL, signal.to_code(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();

        if recorded {
            if self.is_blocked() {
                tracing::debug!("{} received inside a critical section, deferring", signal);
            } else {
                tracing::debug!("{} received", signal);
            }
            self.inner.notify.notify_waiters();
        } else {
            tracing::debug!("{} received while another request is pending, ignoring", signal);
        }
    }

    /// Returns the recorded request, whether or not it can be delivered yet
    pub fn pending(&self) -> Option<Signal> {
        Signal::from_code(self.inner.pending.load(Ordering::SeqCst))
    }

    /// Returns true while at least one critical section is active
    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.load(Ordering::SeqCst) > 0
    }

    /// Returns the recorded request if no critical section holds it back
    pub fn deliverable(&self) -> Option<Signal> {
        if self.is_blocked() {
            None
        } else {
            self.pending()
        }
    }

    /// Enters a critical section; the request is deferred until the guard drops
    pub fn block(&self) -> CriticalSection<'_> {
        self.inner.blocked.fetch_add(1, Ordering::SeqCst);
        CriticalSection { interrupt: self }
    }

    /// Waits until a request is recorded and no critical section holds it back
    pub async fn delivered(&self) -> Signal {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(signal) = self.deliverable() {
                return signal;
            }

            notified.await;
        }
    }

    /// Spawns a task that traps SIGINT (and SIGTERM on Unix) and records them here
    ///
    /// Must be called from within a tokio runtime. The task lives until the runtime shuts
    /// down; aborting the returned handle restores nothing, the default handlers stay replaced.
    pub fn listen(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            loop {
                match next_signal().await {
                    Ok(signal) => interrupt.raise(signal),
                    Err(e) => {
                        tracing::error!("Failed to listen for termination signals: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(unix)]
async fn next_signal() -> std::io::Result<Signal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| Signal::Interrupt),
        _ = terminate.recv() => Ok(Signal::Terminate),
    }
}

#[cfg(not(unix))]
async fn next_signal() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await.map(|()| Signal::Interrupt)
}

/// Guard for a write that must not be cut short by a termination request
///
/// Created by [`Interrupt::block`]. Dropping the last guard replays a deferred request.
#[must_use = "the critical section ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CriticalSection<'a> {
    interrupt: &'a Interrupt,
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        let inner = &self.interrupt.inner;
        let remaining = inner.blocked.fetch_sub(1, Ordering::SeqCst) - 1;

        if remaining == 0 {
            if let Some(signal) = self.interrupt.pending() {
                tracing::debug!("Critical section finished, replaying deferred {}", signal);
                inner.notify.notify_waiters();
            }
        }
    }
}
