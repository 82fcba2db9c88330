use super::{fit_text, BACKGROUND, BORDER, FOCUS_RING, LINE_HEIGHT, PADDING, SELECTION, TEXT};
use crate::display::Canvas;
use crate::events::{Event, KeyCode};
use crate::rect::Rect;
use crate::signal::Signal;
use crate::widget::{EventCx, Handled, Widget};
use cgmath::Point2;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Name of the bus channel file selections are published on.
pub const FILE_SELECTED: &str = "file-selected";

/// Emitted when an entry of a [`FileList`] is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelected {
    pub path: PathBuf,
    pub is_directory: bool,
}

/// One row of a [`FileList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FileEntry {
    pub fn file(path: impl Into<PathBuf>) -> FileEntry {
        FileEntry::new(path, false)
    }

    pub fn directory(path: impl Into<PathBuf>) -> FileEntry {
        FileEntry::new(path, true)
    }

    fn new(path: impl Into<PathBuf>, is_directory: bool) -> FileEntry {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        FileEntry {
            name,
            path,
            is_directory,
        }
    }
}

/// Lists a directory, directories first, each group sorted by name.
pub fn read_dir(dir: &Path) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_directory = entry.file_type()?.is_dir();
        entries.push(FileEntry::new(entry.path(), is_directory));
    }
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

/// A list of files, one per line. Selecting a row emits [`FileSelected`].
#[derive(Debug)]
pub struct FileList {
    entries: Vec<FileEntry>,
    selected: Option<usize>,
    focused: bool,
    selections: Signal<FileSelected>,
}

impl FileList {
    /// Creates a list that publishes selections on `selections`, typically the bus channel named
    /// [`FILE_SELECTED`].
    pub fn new(entries: Vec<FileEntry>, selections: Signal<FileSelected>) -> FileList {
        FileList {
            entries,
            selected: None,
            focused: false,
            selections,
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&FileEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    /// Row rectangle of entry `index` inside `bounds`.
    fn row(bounds: Rect, index: usize) -> Rect {
        Rect::new(
            bounds.origin.x,
            bounds.origin.y + PADDING + index as i32 * LINE_HEIGHT,
            bounds.size.x,
            LINE_HEIGHT,
        )
    }

    fn select(&mut self, index: usize, cx: &mut EventCx) {
        let entry = match self.entries.get(index) {
            Some(entry) => entry,
            None => return,
        };
        let selection = FileSelected {
            path: entry.path.clone(),
            is_directory: entry.is_directory,
        };
        self.selected = Some(index);
        cx.mark_dirty();
        if let Err(err) = self.selections.emit(&selection) {
            cx.report(&err);
        }
    }
}

impl Widget for FileList {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.fill_rect(bounds, BACKGROUND);
        if self.focused {
            canvas.stroke_rect(bounds, 2, FOCUS_RING);
        } else {
            canvas.stroke_rect(bounds, 1, BORDER);
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let row = FileList::row(bounds, i);
            if row.max_y() > bounds.max_y() {
                break;
            }
            if self.selected == Some(i) {
                canvas.fill_rect(row, SELECTION);
            }
            let width = bounds.size.x - 2 * PADDING;
            let origin = Point2::new(row.origin.x + PADDING, row.origin.y);
            if entry.is_directory {
                let name = format!("{}/", entry.name);
                canvas.draw_text(origin, fit_text(&name, width), TEXT);
            } else {
                canvas.draw_text(origin, fit_text(&entry.name, width), TEXT);
            }
        }
    }

    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        match event {
            Event::PointerDown(point) => {
                let bounds = cx.bounds();
                let offset = point.y - bounds.origin.y - PADDING;
                if offset >= 0 {
                    let index = (offset / LINE_HEIGHT) as usize;
                    if index < self.entries.len() && self.selected != Some(index) {
                        self.select(index, cx);
                    }
                }
                Handled::Yes
            }
            Event::KeyDown(key) if cx.is_focused() => {
                let next = match (key.code, self.selected) {
                    (KeyCode::DownArrow, None) => 0,
                    (KeyCode::DownArrow, Some(i)) => i + 1,
                    (KeyCode::UpArrow, Some(i)) if i > 0 => i - 1,
                    (KeyCode::UpArrow, _) => return Handled::Yes,
                    _ => return Handled::No,
                };
                self.select(next, cx);
                Handled::Yes
            }
            _ => Handled::No,
        }
    }

    fn focusable(&self) -> bool {
        true
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) {
        self.focused = focused;
        cx.mark_dirty();
    }
}
