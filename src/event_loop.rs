//! The event loop.
//!
//! [`EventLoop::start`] blocks the calling thread: it waits for native events from the display
//! service one at a time, translates them and hands each to the handler registered for the
//! event's surface. Handlers receive a [`LoopProxy`] through which they may register or replace
//! handlers and stop the loop. Stopping is cooperative; the flag is checked before waiting for the
//! next event, so the handler that requested it always runs to completion.

use crate::display::{Display, DisplayError, SurfaceId};
use crate::events::Event;
use crate::logger::{Diagnostics, Logger};
use crate::registry::{Registry, RegistryError};
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Event loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed but not started.
    Idle,
    /// Waiting for or processing native events.
    Running,
    /// Stopped; a loop cannot be restarted.
    Stopped,
}

/// Errors returned by [`EventLoop::start`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopError {
    #[error("event loop is already running")]
    AlreadyRunning,

    #[error("event loop has already stopped")]
    AlreadyStopped,

    /// The display service failed while the loop was waiting for events. The loop is stopped.
    #[error("display service failed: {0}")]
    Display(#[from] DisplayError),
}

/// Something that handles the events of one surface.
pub trait HandleEvent: Send {
    fn handle_event(&mut self, event: &Event, proxy: &LoopProxy);
}

struct FnHandler<F>(F);

impl<F> HandleEvent for FnHandler<F>
where
    F: FnMut(&Event, &LoopProxy) + Send,
{
    fn handle_event(&mut self, event: &Event, proxy: &LoopProxy) {
        (self.0)(event, proxy)
    }
}

/// A shared event handler.
///
/// Handlers own whatever they need (or share it through `Arc`s); the loop may keep them around
/// for as long as it runs.
pub struct EventHandler(Arc<Mutex<dyn HandleEvent>>);

impl Clone for EventHandler {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl EventHandler {
    pub fn new<H: HandleEvent + 'static>(handler: H) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    /// Creates a handler from a closure.
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: FnMut(&Event, &LoopProxy) + Send + 'static,
    {
        EventHandler::new(FnHandler(handler))
    }

    /// Wraps a handler that is also used elsewhere, such as a window the application keeps
    /// inspecting.
    pub fn shared<H: HandleEvent + 'static>(handler: Arc<Mutex<H>>) -> Self {
        EventHandler(handler)
    }

    /// Runs the handler for one event.
    pub fn handle(&self, event: &Event, proxy: &LoopProxy) {
        self.0.lock().handle_event(event, proxy);
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler")
    }
}

struct Shared {
    handlers: Mutex<HashMap<SurfaceId, EventHandler>>,
    state: Mutex<LoopState>,
    stop_requested: AtomicBool,
    diagnostics: Diagnostics,
}

/// A handle to a running (or not yet running) event loop.
#[derive(Clone)]
pub struct LoopProxy(Arc<Shared>);

impl LoopProxy {
    fn new(diagnostics: Diagnostics) -> LoopProxy {
        LoopProxy(Arc::new(Shared {
            handlers: Mutex::new(HashMap::new()),
            state: Mutex::new(LoopState::Idle),
            stop_requested: AtomicBool::new(false),
            diagnostics,
        }))
    }

    /// Sets the handler for a surface, returning the one it replaces.
    ///
    /// There is one handler per surface; the last registration wins.
    pub fn register_event_handler(
        &self,
        surface: SurfaceId,
        handler: EventHandler,
    ) -> Option<EventHandler> {
        let previous = self.0.handlers.lock().insert(surface, handler);
        if previous.is_some() {
            self.0
                .diagnostics
                .info(|| format!("replaced event handler for surface {:?}", surface));
        } else {
            self.0
                .diagnostics
                .debug(|| format!("registered event handler for surface {:?}", surface));
        }
        previous
    }

    pub fn unregister_event_handler(&self, surface: SurfaceId) -> Option<EventHandler> {
        self.0.handlers.lock().remove(&surface)
    }

    pub fn has_handler(&self, surface: SurfaceId) -> bool {
        self.0.handlers.lock().contains_key(&surface)
    }

    fn handler(&self, surface: SurfaceId) -> Option<EventHandler> {
        self.0.handlers.lock().get(&surface).cloned()
    }

    /// Asks the loop to stop before it waits for the next event.
    pub fn stop(&self) {
        self.0.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.stop_requested.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoopState {
        *self.0.state.lock()
    }

    fn set_state(&self, state: LoopState) {
        *self.0.state.lock() = state;
    }
}

impl fmt::Debug for LoopProxy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoopProxy")
            .field("state", &self.state())
            .field("handlers", &self.0.handlers.lock().len())
            .field("stop_requested", &self.is_stop_requested())
            .finish()
    }
}

/// Pulls native events from a display service and feeds them to per-surface handlers.
pub struct EventLoop {
    display: Arc<dyn Display>,
    proxy: LoopProxy,
}

impl EventLoop {
    pub fn new(display: Arc<dyn Display>, logger: Option<Arc<dyn Logger>>) -> EventLoop {
        EventLoop {
            display,
            proxy: LoopProxy::new(Diagnostics::new(logger)),
        }
    }

    /// Creates an event loop for the registered `dyn Display`, logging to the registered
    /// `dyn Logger` if there is one.
    pub fn from_registry(registry: &Registry) -> Result<EventLoop, RegistryError> {
        let display = registry.resolve::<dyn Display>()?;
        let logger = registry.try_resolve::<dyn Logger>();
        Ok(EventLoop::new(display, logger))
    }

    pub fn proxy(&self) -> LoopProxy {
        self.proxy.clone()
    }

    pub fn display(&self) -> &Arc<dyn Display> {
        &self.display
    }

    /// See [`LoopProxy::register_event_handler`].
    pub fn register_event_handler(
        &self,
        surface: SurfaceId,
        handler: EventHandler,
    ) -> Option<EventHandler> {
        self.proxy.register_event_handler(surface, handler)
    }

    pub fn state(&self) -> LoopState {
        self.proxy.state()
    }

    /// Runs the loop on the calling thread until a handler stops it.
    ///
    /// Events that fail to translate are logged and skipped. If the display service fails, the
    /// loop stops and the failure is returned.
    pub fn start(&self) -> Result<(), LoopError> {
        match self.proxy.state() {
            LoopState::Running => return Err(LoopError::AlreadyRunning),
            LoopState::Stopped => return Err(LoopError::AlreadyStopped),
            LoopState::Idle => self.proxy.set_state(LoopState::Running),
        }
        let diagnostics = &self.proxy.0.diagnostics;
        diagnostics.info(|| "event loop started".to_string());

        loop {
            if self.proxy.is_stop_requested() {
                self.proxy.set_state(LoopState::Stopped);
                diagnostics.info(|| "event loop stopped".to_string());
                return Ok(());
            }

            let raw = match self.display.wait_event() {
                Ok(raw) => raw,
                Err(err) => {
                    self.proxy.set_state(LoopState::Stopped);
                    diagnostics.error(|| format!("event loop stopped: {}", err));
                    return Err(err.into());
                }
            };

            let event = match raw.translate() {
                Ok(event) => event,
                Err(err) => {
                    diagnostics.error(|| format!("skipping native event {:?}: {}", raw, err));
                    continue;
                }
            };

            match self.proxy.handler(raw.surface) {
                Some(handler) => handler.handle(&event, &self.proxy),
                None => diagnostics.debug(|| {
                    format!("no handler for surface {:?}; dropping {:?}", raw.surface, event)
                }),
            }
        }
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("proxy", &self.proxy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyCode, KeyModifiers};
    use crate::headless::HeadlessDisplay;
    use crate::logger::RecordingLogger;
    use crate::raw_events::{RawEvent, RawEventType};
    use crate::rect::Rect;

    fn setup() -> (Arc<HeadlessDisplay>, SurfaceId, EventLoop, Arc<RecordingLogger>) {
        let display = Arc::new(HeadlessDisplay::new());
        let surface = display.create_surface(Rect::new(0, 0, 100, 100)).unwrap();
        let logger = Arc::new(RecordingLogger::default());
        let event_loop = EventLoop::new(display.clone(), Some(logger.clone()));
        (display, surface, event_loop, logger)
    }

    fn recorder(seen: &Arc<Mutex<Vec<Event>>>) -> EventHandler {
        let seen = Arc::clone(seen);
        EventHandler::from_fn(move |event, proxy| {
            seen.lock().push(*event);
            if *event == Event::Other {
                proxy.stop();
            }
        })
    }

    fn other(surface: SurfaceId) -> RawEvent {
        RawEvent {
            ty: 0,
            ..RawEvent::expose(surface)
        }
    }

    #[test]
    fn delivers_in_order_until_stopped() {
        let (display, surface, event_loop, _) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        event_loop.register_event_handler(surface, recorder(&seen));

        display.push(RawEvent::pointer(surface, RawEventType::PointerDown, 1, 2));
        display.push(RawEvent::expose(surface));
        display.push(other(surface));
        display.push(RawEvent::expose(surface));

        assert_eq!(event_loop.state(), LoopState::Idle);
        assert_eq!(event_loop.start(), Ok(()));
        assert_eq!(event_loop.state(), LoopState::Stopped);
        assert_eq!(
            *seen.lock(),
            vec![
                Event::PointerDown(cgmath::Point2::new(1, 2)),
                Event::Paint,
                Event::Other
            ],
            "nothing is handled after stop"
        );
        assert_eq!(event_loop.start(), Err(LoopError::AlreadyStopped));
    }

    #[test]
    fn bad_translation_and_missing_handler_are_skipped() {
        let (display, surface, event_loop, logger) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        event_loop.register_event_handler(surface, recorder(&seen));

        let bad_key = RawEvent {
            key: 0xEE,
            ..RawEvent::key_down(surface, KeyCode::A, KeyModifiers::default())
        };
        display.push(bad_key);
        display.push(RawEvent::expose(SurfaceId::new()));
        display.push(other(surface));

        assert_eq!(event_loop.start(), Ok(()));
        assert_eq!(*seen.lock(), vec![Event::Other]);
        assert!(logger.contains("error: skipping native event"));
        assert!(logger.contains("debug: no handler for surface"));
    }

    #[test]
    fn last_registration_wins() {
        let (display, surface, event_loop, logger) = setup();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        assert!(event_loop
            .register_event_handler(surface, recorder(&first))
            .is_none());
        let replaced = event_loop.register_event_handler(surface, recorder(&second));
        assert!(replaced.is_some());
        assert!(logger.contains("info: replaced event handler"));

        display.push(other(surface));
        event_loop.start().unwrap();
        assert!(first.lock().is_empty());
        assert_eq!(*second.lock(), vec![Event::Other]);
    }

    #[test]
    fn handlers_can_register_from_inside_the_loop() {
        let (display, surface, event_loop, _) = setup();
        let late = display.create_surface(Rect::new(0, 0, 10, 10)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let late_handler = recorder(&seen);
        event_loop.register_event_handler(
            surface,
            EventHandler::from_fn(move |_, proxy| {
                proxy.register_event_handler(late, late_handler.clone());
            }),
        );

        display.push(RawEvent::expose(late));
        display.push(RawEvent::expose(surface));
        display.push(other(late));

        event_loop.start().unwrap();
        assert_eq!(*seen.lock(), vec![Event::Other]);
    }

    #[test]
    fn disconnect_stops_with_an_error() {
        let (display, surface, event_loop, logger) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        event_loop.register_event_handler(surface, recorder(&seen));
        display.push(RawEvent::expose(surface));
        display.close();

        assert_eq!(
            event_loop.start(),
            Err(LoopError::Display(DisplayError::Disconnected))
        );
        assert_eq!(event_loop.state(), LoopState::Stopped);
        assert_eq!(*seen.lock(), vec![Event::Paint]);
        assert!(logger.contains("error: event loop stopped"));
    }

    #[test]
    fn stop_before_start_returns_immediately() {
        let (display, surface, event_loop, _) = setup();
        display.push(RawEvent::expose(surface));
        event_loop.proxy().stop();
        assert_eq!(event_loop.start(), Ok(()));
        assert_eq!(event_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn resolves_services_from_registry() {
        let registry = Registry::new();
        assert_eq!(
            EventLoop::from_registry(&registry).err(),
            Some(RegistryError::NotRegistered(core::any::type_name::<dyn Display>()))
        );

        let display: Arc<dyn Display> = Arc::new(HeadlessDisplay::new());
        registry.register(display).unwrap();
        let event_loop = EventLoop::from_registry(&registry).unwrap();
        assert_eq!(event_loop.state(), LoopState::Idle);
    }
}
