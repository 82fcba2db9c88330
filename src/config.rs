use crate::router::FocusPolicy;

/// Toolkit configuration.
///
/// Override fields with struct update syntax:
///
/// ```
/// # use roost::{Config, FocusPolicy};
/// let config = Config {
///     focus_policy: FocusPolicy::PreserveOnMiss,
///     ..Config::default()
/// };
/// assert!(config.initial_render);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// What a pointer press on nothing focusable does to focus.
    pub focus_policy: FocusPolicy,

    /// Files larger than this are not previewed.
    pub max_preview_bytes: u64,

    /// Whether a window's first repaint pass paints every visible widget.
    pub initial_render: bool,
}

impl Config {
    pub const DEFAULT_MAX_PREVIEW_BYTES: u64 = 1024 * 1024;
}

impl Default for Config {
    fn default() -> Self {
        Config {
            focus_policy: FocusPolicy::default(),
            max_preview_bytes: Config::DEFAULT_MAX_PREVIEW_BYTES,
            initial_render: true,
        }
    }
}
