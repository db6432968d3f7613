//! Severity-tagged pass-through to the native log sink

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::Severity;
use crate::bridge::SharedBridge;
use crate::config::{DeliveryMode, LoggingConfig};

/// `log` target used when mirroring script messages to the host logger
pub const SCRIPT_LOG_TARGET: &str = "era_scripting::script";

enum Envelope {
    Message(Severity, String),
    Flush(Sender<()>),
    Shutdown,
}

enum Sink {
    Immediate(SharedBridge),
    Background {
        sender: Sender<Envelope>,
        worker: Mutex<Option<JoinHandle<()>>>,
    },
}

struct Inner {
    min_severity: Severity,
    sink: Sink,
    dropped: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Sink::Background { sender, worker } = &self.sink {
            let _ = sender.send(Envelope::Shutdown);
            let handle = worker.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::error!("Script log worker panicked during shutdown");
                }
            }
        }
    }
}

/// Logging facade used by systems and components
///
/// Cloning is cheap; clones share the filter, the sink and the drop counter.
#[derive(Clone)]
pub struct ScriptLogger {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ScriptLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.inner.sink {
            Sink::Immediate(_) => DeliveryMode::Immediate,
            Sink::Background { .. } => DeliveryMode::Background,
        };
        f.debug_struct("ScriptLogger")
            .field("min_severity", &self.inner.min_severity)
            .field("delivery", &mode)
            .field("dropped", &self.dropped_messages())
            .finish()
    }
}

impl ScriptLogger {
    /// Logger that calls the bridge on the calling thread
    pub fn immediate(bridge: SharedBridge, min_severity: Severity) -> Self {
        Self {
            inner: Arc::new(Inner {
                min_severity,
                sink: Sink::Immediate(bridge),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Logger that hands messages to a worker thread
    ///
    /// Fails only if the worker thread cannot be spawned.
    pub fn background(bridge: SharedBridge, min_severity: Severity, capacity: usize) -> io::Result<Self> {
        let (sender, receiver) = bounded(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name("era-script-log".to_string())
            .spawn(move || run_worker(&bridge, &receiver))?;

        Ok(Self {
            inner: Arc::new(Inner {
                min_severity,
                sink: Sink::Background {
                    sender,
                    worker: Mutex::new(Some(worker)),
                },
                dropped: AtomicU64::new(0),
            }),
        })
    }

    /// Build a logger from configuration
    pub fn from_config(bridge: SharedBridge, config: &LoggingConfig) -> io::Result<Self> {
        match config.delivery {
            DeliveryMode::Immediate => Ok(Self::immediate(bridge, config.min_severity)),
            DeliveryMode::Background => {
                Self::background(bridge, config.min_severity, config.queue_capacity)
            }
        }
    }

    /// Minimum severity that reaches the bridge
    pub fn min_severity(&self) -> Severity {
        self.inner.min_severity
    }

    /// Whether a message of this severity would be delivered
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.inner.min_severity
    }

    /// Log an informational message
    pub fn log(&self, message: impl AsRef<str>) {
        self.log_with(Severity::Normal, message);
    }

    /// Log a warning
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log_with(Severity::Warning, message);
    }

    /// Log an error
    pub fn error(&self, message: impl AsRef<str>) {
        self.log_with(Severity::Error, message);
    }

    /// Log with an explicit severity
    pub fn log_with(&self, severity: Severity, message: impl AsRef<str>) {
        if !self.enabled(severity) {
            return;
        }
        let message = message.as_ref();
        log::log!(target: SCRIPT_LOG_TARGET, severity.as_log_level(), "{}", message);

        match &self.inner.sink {
            Sink::Immediate(bridge) => deliver(bridge, severity, message),
            Sink::Background { sender, .. } => {
                match sender.try_send(Envelope::Message(severity, message.to_string())) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                        log::error!("Script log worker is gone; message dropped");
                    }
                }
            }
        }
    }

    /// Messages discarded because the background queue was full
    pub fn dropped_messages(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Block until every queued message has reached the bridge
    ///
    /// Does nothing for immediate delivery. Never call this from inside a frame.
    pub fn flush(&self) {
        if let Sink::Background { sender, .. } = &self.inner.sink {
            let (ack_tx, ack_rx) = bounded(1);
            if sender.send(Envelope::Flush(ack_tx)).is_ok() && ack_rx.recv().is_err() {
                log::error!("Script log worker exited before acknowledging flush");
            }
        }
    }
}

fn deliver(bridge: &SharedBridge, severity: Severity, message: &str) {
    // Reported to the host logger only; routing this back through the facade would recurse.
    if let Err(err) = bridge.log_message(severity, message) {
        log::error!("Native log_message failed: {}", err);
    }
}

fn run_worker(bridge: &SharedBridge, receiver: &Receiver<Envelope>) {
    for envelope in receiver {
        match envelope {
            Envelope::Message(severity, message) => deliver(bridge, severity, &message),
            Envelope::Flush(ack) => {
                let _ = ack.send(());
            }
            Envelope::Shutdown => break,
        }
    }
}
