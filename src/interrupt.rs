// Ctrl-C routing. A single listener lives for the whole process: while a
// generation run is registered the signal cancels that run, otherwise the
// process exits the way an unhandled SIGINT would.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Exit status used when Ctrl-C arrives outside a generation run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// A registered run was cancelled.
    Cancelled,
    /// Nothing to cancel; the process should stop.
    Exit,
}

#[derive(Debug, Clone, Default)]
pub struct InterruptRouter {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl InterruptRouter {
    pub fn new() -> Self {
        InterruptRouter::default()
    }

    /// Spawn the process-wide listener. Must be called from inside the
    /// runtime, once.
    pub fn install(&self) -> JoinHandle<()> {
        let router = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                    return;
                }
                if router.route() == Interrupt::Exit {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        })
    }

    /// Register a run. Interrupts cancel its token until the guard drops.
    pub fn begin_run(&self) -> RunGuard {
        let token = CancellationToken::new();
        *self.lock() = Some(token.clone());
        RunGuard {
            router: self.clone(),
            token,
        }
    }

    /// Decide what one interrupt does, cancelling the current run if any.
    pub fn route(&self) -> Interrupt {
        match self.lock().as_ref() {
            Some(token) => {
                debug!("interrupt cancels the current run");
                token.cancel();
                Interrupt::Cancelled
            }
            None => Interrupt::Exit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a run registered with the router.
#[derive(Debug)]
pub struct RunGuard {
    router: InterruptRouter,
    token: CancellationToken,
}

impl RunGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.router.lock().take();
    }
}
