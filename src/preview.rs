//! Shows the contents of selected files in a text view.
//!
//! The file system is reached through a [`FileSource`]. Anything that goes wrong while loading a
//! file ends up as a short message in the view instead of the file's contents.

use crate::config::Config;
use crate::logger::{Diagnostics, Logger};
use crate::signal::{Connection, Signal};
use crate::tree::Invalidator;
use crate::widgets::{FileSelected, TextHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};
use thiserror::Error;

/// Read access to files.
pub trait FileSource: Send + Sync {
    /// Size of the file in bytes.
    fn len(&self, path: &Path) -> io::Result<u64>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Why a file could not be previewed.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("{path:?} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not UTF-8 text")]
    NotText { path: PathBuf },
}

impl PreviewError {
    /// The message shown in place of the file's contents.
    pub fn fallback_text(&self) -> String {
        match self {
            PreviewError::TooLarge { .. } => "File too large to display".to_string(),
            PreviewError::Read { source, .. } => format!("Unable to read file: {}", source),
            PreviewError::NotText { .. } => "Unable to decode file as text".to_string(),
        }
    }
}

/// Loads a file as text, refusing files over `limit` bytes.
pub fn load_preview(
    source: &dyn FileSource,
    path: &Path,
    limit: u64,
) -> Result<String, PreviewError> {
    let read_error = |source| PreviewError::Read {
        path: path.to_path_buf(),
        source,
    };
    let too_large = |size| PreviewError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit,
    };

    let size = source.len(path).map_err(read_error)?;
    if size > limit {
        return Err(too_large(size));
    }
    let bytes = source.read(path).map_err(read_error)?;
    // the file may have grown in between
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }
    String::from_utf8(bytes).map_err(|_| PreviewError::NotText {
        path: path.to_path_buf(),
    })
}

/// Loads selected files into a text view.
pub struct Preview {
    source: Arc<dyn FileSource>,
    limit: u64,
    diagnostics: Diagnostics,
}

impl Preview {
    pub fn new(config: &Config, logger: Option<Arc<dyn Logger>>) -> Preview {
        Preview {
            source: Arc::new(FsSource),
            limit: config.max_preview_bytes,
            diagnostics: Diagnostics::new(logger),
        }
    }

    /// Reads files from `source` instead of the file system.
    pub fn with_source(self, source: Arc<dyn FileSource>) -> Preview {
        Preview { source, ..self }
    }

    /// Loads the selection into `view`. Directories are ignored.
    ///
    /// Returns false if nothing changed.
    pub fn show(&self, selection: &FileSelected, view: &TextHandle) -> bool {
        if selection.is_directory {
            let path = &selection.path;
            self.diagnostics
                .debug(|| format!("not previewing directory {:?}", path));
            return false;
        }

        match load_preview(&*self.source, &selection.path, self.limit) {
            Ok(text) => {
                self.diagnostics
                    .debug(|| format!("previewing {:?}", selection.path));
                view.set_text(text);
            }
            Err(err) => {
                self.diagnostics.error(|| format!("preview failed: {}", err));
                view.set_text(err.fallback_text());
            }
        }
        true
    }

    /// Subscribes the view to file selections.
    ///
    /// The subscriber owns the view handle and an invalidator for the view's widget, so it keeps
    /// working however long the signal lives, and does nothing visible once the widget is gone.
    pub fn connect(
        self,
        selections: &Signal<FileSelected>,
        view: TextHandle,
        invalidator: Invalidator,
    ) -> Connection {
        selections.connect(move |selection| {
            if self.show(selection, &view) {
                invalidator.invalidate();
            }
        })
    }
}

impl core::fmt::Debug for Preview {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Preview")
            .field("limit", &self.limit)
            .finish()
    }
}
