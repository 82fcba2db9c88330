//! Lists a directory and previews files as they are clicked, on a headless display.
//!
//! Usage: `cargo run --example file_viewer [DIR]`

use parking_lot::Mutex;
use roost::headless::HeadlessDisplay;
use roost::preview::Preview;
use roost::raw_events::{RawEvent, RawEventType};
use roost::widgets::{self, FileEntry, FileList, FileSelected, Label, Panel, TextView};
use roost::{
    Config, Display, Event, EventHandler, EventLoop, HandleEvent, KeyCode, KeyModifiers,
    LogFacade, Logger, Rect, Registry, SignalBus, Window,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::{env, process};

/// Prints `log` records to stderr.
struct StderrLog;

impl log::Log for StderrLog {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static STDERR_LOG: StderrLog = StderrLog;

const LIST_WIDTH: i32 = 200;

fn main() {
    let dir = PathBuf::from(env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    let entries = match widgets::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("cannot list {}: {}", dir.display(), err);
            vec![FileEntry::file(dir.join("Cargo.toml"))]
        }
    };

    if log::set_logger(&STDERR_LOG).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let display = Arc::new(HeadlessDisplay::new());
    let registry = Registry::new();
    let service: Arc<dyn Display> = display.clone();
    let logger: Arc<dyn Logger> = Arc::new(LogFacade);
    registry
        .register(service)
        .and_then(|_| registry.register(logger.clone()))
        .unwrap_or_else(|err| fail(&err));

    let config = Config::default();
    let bus = SignalBus::with_logger(Some(logger.clone()));
    let selections = bus
        .channel::<FileSelected>(widgets::FILE_SELECTED)
        .unwrap_or_else(|err| fail(&err));

    let mut window = Window::from_registry(&registry, Rect::new(0, 0, 640, 480), &config)
        .unwrap_or_else(|err| fail(&err));
    let root = window.set_content(Panel::default());
    let tree = window.tree_mut();
    let row_count = entries.len();
    tree.insert(root, Label::new(dir.display().to_string()), Rect::new(0, 0, 640, 24))
        .and_then(|_| {
            tree.insert(
                root,
                FileList::new(entries, selections.clone()),
                Rect::new(0, 24, LIST_WIDTH, 456),
            )
        })
        .unwrap_or_else(|err| fail(&err));

    let view = TextView::new("Select a file");
    let text = view.handle();
    let view_id = tree
        .insert(root, view, Rect::new(LIST_WIDTH, 24, 640 - LIST_WIDTH, 456))
        .unwrap_or_else(|err| fail(&err));
    if let Some(invalidator) = tree.invalidator(view_id) {
        Preview::new(&config, Some(logger.clone())).connect(&selections, text.clone(), invalidator);
    }

    window.render().unwrap_or_else(|err| fail(&err));

    let event_loop = EventLoop::from_registry(&registry).unwrap_or_else(|err| fail(&err));
    let surface = window.surface();
    let window = Arc::new(Mutex::new(window));
    let handler_window = Arc::clone(&window);
    event_loop.register_event_handler(
        surface,
        EventHandler::from_fn(move |event, proxy| match event {
            Event::KeyDown(key) if key.code == KeyCode::Escape => proxy.stop(),
            _ => handler_window.lock().handle_event(event, proxy),
        }),
    );

    // click every row, then scroll the preview a little and quit
    for row in 0..row_count.min(20) as i32 {
        let y = 24 + widgets::PADDING + row * widgets::LINE_HEIGHT + widgets::LINE_HEIGHT / 2;
        display.push(RawEvent::pointer(surface, RawEventType::PointerDown, 20, y));
        display.push(RawEvent::pointer(surface, RawEventType::PointerUp, 20, y));
    }
    display.push(RawEvent::pointer(surface, RawEventType::PointerDown, 300, 100));
    let none = KeyModifiers::default();
    display.push(RawEvent::key_down(surface, KeyCode::DownArrow, none));
    display.push(RawEvent::key_down(surface, KeyCode::Escape, none));

    if let Err(err) = event_loop.start() {
        fail(&err);
    }

    let window = window.lock();
    println!(
        "{} widgets, {} flushes, {} draw ops pending",
        window.tree().len(),
        display.flush_count(),
        display.take_ops(surface).len()
    );
    println!("--- preview ---");
    for line in text.text().lines().skip(text.scroll()).take(10) {
        println!("{}", line);
    }
}

fn fail(err: &dyn std::error::Error) -> ! {
    eprintln!("file_viewer: {}", err);
    process::exit(1);
}
