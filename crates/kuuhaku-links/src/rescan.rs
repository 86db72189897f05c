//! Debounced re-scanning of a link surface.
//!
//! A rescanner runs one pass as soon as it starts, then waits for
//! [`ContentChanged`] signals. The first signal opens a debounce window;
//! signals arriving inside it are folded into the same pass.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::rewrite::{LinkRewriter, PassReport};
use crate::surface::LinkSurface;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Signal that the surface may hold new links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentChanged;

/// Progress published after every pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanStatus {
    /// Passes run so far, including the initial one.
    pub passes: u64,
    pub last: PassReport,
}

/// Handle to a running rescanner.
pub struct Rescanner {
    signals: mpsc::Sender<ContentChanged>,
    status: watch::Receiver<RescanStatus>,
    task: JoinHandle<()>,
}

impl Rescanner {
    /// Start rescanning `surface` with the default debounce.
    pub fn spawn<S>(rewriter: LinkRewriter, surface: Arc<Mutex<S>>) -> Self
    where
        S: LinkSurface + Send + 'static,
    {
        Self::spawn_with_debounce(rewriter, surface, DEFAULT_DEBOUNCE)
    }

    /// Start rescanning `surface` with a custom debounce window.
    pub fn spawn_with_debounce<S>(
        rewriter: LinkRewriter,
        surface: Arc<Mutex<S>>,
        debounce: Duration,
    ) -> Self
    where
        S: LinkSurface + Send + 'static,
    {
        let (signals, rx) = mpsc::channel(64);
        let (status_tx, status) = watch::channel(RescanStatus::default());
        let task = tokio::spawn(run(rewriter, surface, debounce, rx, status_tx));
        Self {
            signals,
            status,
            task,
        }
    }

    /// Report that content changed. Never blocks; a full queue already
    /// guarantees another pass.
    pub fn notify(&self) {
        let _ = self.signals.try_send(ContentChanged);
    }

    /// A sender that can be handed to content producers.
    pub fn signal_sender(&self) -> mpsc::Sender<ContentChanged> {
        self.signals.clone()
    }

    /// Latest status.
    pub fn status(&self) -> RescanStatus {
        *self.status.borrow()
    }

    /// Subscribe to status updates.
    pub fn subscribe(&self) -> watch::Receiver<RescanStatus> {
        self.status.clone()
    }

    /// Stop accepting signals and wait for pending work to finish.
    ///
    /// Clones from [`Rescanner::signal_sender`] keep the task alive until
    /// they are dropped too.
    pub async fn shutdown(self) {
        drop(self.signals);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "rescanner task ended abnormally");
        }
    }
}

async fn run<S>(
    rewriter: LinkRewriter,
    surface: Arc<Mutex<S>>,
    debounce: Duration,
    mut signals: mpsc::Receiver<ContentChanged>,
    status: watch::Sender<RescanStatus>,
) where
    S: LinkSurface + Send + 'static,
{
    let mut passes = 0u64;
    let pass = |passes: &mut u64| {
        let report = rewriter.apply(&mut *surface.lock());
        *passes += 1;
        status.send_replace(RescanStatus {
            passes: *passes,
            last: report,
        });
    };

    if rewriter.rule_count() == 0 {
        tracing::info!("no affiliate rules configured, rescanner idle");
    }
    pass(&mut passes);

    while signals.recv().await.is_some() {
        let deadline = Instant::now() + debounce;
        let mut closed = false;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                signal = signals.recv() => {
                    if signal.is_none() {
                        closed = true;
                        break;
                    }
                }
            }
        }
        pass(&mut passes);
        if closed {
            break;
        }
    }
    tracing::debug!(passes, "rescanner stopped");
}
