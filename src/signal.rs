//! Signals: synchronous, ordered publish/subscribe.
//!
//! A [`Signal`] is a typed channel. Subscribers run on the emitting thread, in the order they
//! connected. A subscriber failing with [`SignalError::Failed`] is logged and the value still
//! reaches the rest; [`SignalError::Fatal`] ends delivery and is returned to the emitter.
//!
//! Producers and consumers that should not know each other meet on a [`SignalBus`], which hands
//! out channels by name.

use crate::logger::{Diagnostics, Logger};
use core::any::{type_name, Any};
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by subscribers or by the bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The subscriber failed; delivery continues.
    #[error("subscriber failed: {0}")]
    Failed(String),

    /// The subscriber failed and no further subscriber should see the value.
    #[error("subscriber failed fatally: {0}")]
    Fatal(String),

    /// A subscriber was reached again while it was still handling an earlier value.
    #[error("subscriber is already running")]
    Reentrant,

    /// A bus channel was requested with a payload type other than the one it was created with.
    #[error("channel {name:?} carries {expected}, not {requested}")]
    ChannelType {
        name: String,
        expected: &'static str,
        requested: &'static str,
    },
}

/// Identifies one subscription of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection(u64);

type Callback<T> = Arc<Mutex<dyn FnMut(&T) -> Result<(), SignalError> + Send>>;

struct Inner<T> {
    subscribers: Mutex<Vec<(Connection, Callback<T>)>>,
    next_id: AtomicU64,
    diagnostics: Diagnostics,
}

/// A typed channel. Cloning yields another handle to the same channel.
pub struct Signal<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Signal::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Signal<T> {
        Signal::with_logger(None)
    }

    /// Creates a signal that logs subscriber failures.
    pub fn with_logger(logger: Option<Arc<dyn Logger>>) -> Signal<T> {
        Signal {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                diagnostics: Diagnostics::new(logger),
            }),
        }
    }

    /// Appends a subscriber.
    pub fn connect<F>(&self, mut subscriber: F) -> Connection
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.try_connect(move |value| {
            subscriber(value);
            Ok(())
        })
    }

    /// Appends a subscriber that may fail.
    pub fn try_connect<F>(&self, subscriber: F) -> Connection
    where
        F: FnMut(&T) -> Result<(), SignalError> + Send + 'static,
    {
        let connection = Connection(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback<T> = Arc::new(Mutex::new(subscriber));
        self.inner.subscribers.lock().push((connection, callback));
        connection
    }

    /// Removes a subscriber. Returns false if it was not connected.
    pub fn disconnect(&self, connection: Connection) -> bool {
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(c, _)| *c != connection);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Delivers a value to every subscriber in connection order.
    ///
    /// Returns how many subscribers accepted the value. Subscribers connected or disconnected by
    /// a subscriber take effect from the next emission.
    pub fn emit(&self, value: &T) -> Result<usize, SignalError> {
        let subscribers: Vec<_> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(c, callback)| (*c, Arc::clone(callback)))
            .collect();
        let diagnostics = &self.inner.diagnostics;

        let mut accepted = 0;
        for (connection, callback) in subscribers {
            let result = match callback.try_lock() {
                Some(mut callback) => (&mut *callback)(value),
                None => Err(SignalError::Reentrant),
            };
            match result {
                Ok(()) => accepted += 1,
                Err(SignalError::Fatal(msg)) => {
                    diagnostics.error(|| {
                        format!(
                            "{} subscriber {:?} failed fatally: {}",
                            type_name::<T>(),
                            connection,
                            msg
                        )
                    });
                    return Err(SignalError::Fatal(msg));
                }
                Err(err) => diagnostics.error(|| {
                    format!("{} subscriber {:?}: {}", type_name::<T>(), connection, err)
                }),
            }
        }
        Ok(accepted)
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signal")
            .field("type", &type_name::<T>())
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

struct Channel {
    type_name: &'static str,
    /// Always a `Signal<T>` of the channel's payload type.
    signal: Box<dyn Any + Send + Sync>,
}

/// Named, typed channels.
#[derive(Default)]
pub struct SignalBus {
    channels: Mutex<HashMap<String, Channel>>,
    logger: Option<Arc<dyn Logger>>,
}

impl SignalBus {
    pub fn new() -> SignalBus {
        SignalBus::default()
    }

    /// Creates a bus whose channels log subscriber failures.
    pub fn with_logger(logger: Option<Arc<dyn Logger>>) -> SignalBus {
        SignalBus {
            channels: Mutex::new(HashMap::new()),
            logger,
        }
    }

    /// Returns the channel with the given name, creating it on first use.
    ///
    /// Every later request must use the same payload type.
    pub fn channel<T: Send + 'static>(&self, name: &str) -> Result<Signal<T>, SignalError> {
        let mut channels = self.channels.lock();
        let channel = channels.entry(name.to_string()).or_insert_with(|| Channel {
            type_name: type_name::<T>(),
            signal: Box::new(Signal::<T>::with_logger(self.logger.clone())),
        });

        match channel.signal.downcast_ref::<Signal<T>>() {
            Some(signal) => Ok(signal.clone()),
            None => Err(SignalError::ChannelType {
                name: name.to_string(),
                expected: channel.type_name,
                requested: type_name::<T>(),
            }),
        }
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.lock().contains_key(name)
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let channels = self.channels.lock();
        let mut names: Vec<_> = channels.keys().collect();
        names.sort();
        f.debug_struct("SignalBus").field("channels", &names).finish()
    }
}
