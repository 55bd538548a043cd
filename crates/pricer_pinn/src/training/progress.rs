//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver of training progress.
///
/// Called synchronously on the training thread. Implemented for every
/// `FnMut(f64, &str)` closure; closures passed directly need their argument
/// types spelled out.
///
/// # Examples
/// ```
/// use pricer_pinn::training::ProgressSink;
///
/// let mut seen = Vec::new();
/// let mut sink = |fraction: f64, _message: &str| seen.push(fraction);
/// sink.on_progress(0.5, "halfway");
/// assert!(!sink.is_cancelled());
/// assert_eq!(seen, vec![0.5]);
/// ```
pub trait ProgressSink {
    /// Reports `fraction` in `[0, 1]` of the run completed.
    fn on_progress(&mut self, fraction: f64, message: &str);

    /// Polled before every epoch; returning `true` stops training.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(f64, &str),
{
    fn on_progress(&mut self, fraction: f64, message: &str) {
        self(fraction, message)
    }
}

/// Sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _fraction: f64, _message: &str) {}
}

/// Shared flag for stopping a run from another thread.
///
/// # Examples
/// ```
/// use pricer_pinn::training::{CancellationToken, NoProgress, ProgressSink};
///
/// let token = CancellationToken::new();
/// let sink = token.attach(NoProgress);
/// assert!(!sink.is_cancelled());
/// token.clone().cancel();
/// assert!(sink.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// New, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect before the next epoch.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Wraps `sink` so that it also reports this token's state.
    pub fn attach<S: ProgressSink>(&self, sink: S) -> Cancellable<S> {
        Cancellable {
            sink,
            token: self.clone(),
        }
    }
}

/// A sink combined with a [`CancellationToken`].
#[derive(Debug)]
pub struct Cancellable<S> {
    sink: S,
    token: CancellationToken,
}

impl<S: ProgressSink> ProgressSink for Cancellable<S> {
    fn on_progress(&mut self, fraction: f64, message: &str) {
        self.sink.on_progress(fraction, message)
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.sink.is_cancelled()
    }
}
