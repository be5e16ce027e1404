//! Editor configuration.

use std::time::Duration;

/// Options for [`Editor`](super::Editor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorOptions {
    /// Viewport width in pixels; also the wrap width.
    pub width: i32,
    /// Viewport height in pixels.
    pub height: i32,
    /// Keep the text on one paragraph; Enter calls the enter handler.
    pub single_line: bool,
    /// Ignore every command that would modify the document.
    pub read_only: bool,
    /// Pause between commands generated by the fuzz worker.
    pub fuzz_interval: Duration,
    /// Commands the fuzz worker may queue ahead of the editor.
    pub fuzz_queue: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            single_line: false,
            read_only: false,
            fuzz_interval: Duration::ZERO,
            fuzz_queue: 64,
        }
    }
}

impl EditorOptions {
    #[must_use]
    pub fn viewport(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn single_line(mut self, enabled: bool) -> Self {
        self.single_line = enabled;
        self
    }

    #[must_use]
    pub fn read_only(mut self, enabled: bool) -> Self {
        self.read_only = enabled;
        self
    }

    #[must_use]
    pub fn fuzz_interval(mut self, interval: Duration) -> Self {
        self.fuzz_interval = interval;
        self
    }

    #[must_use]
    pub fn fuzz_queue(mut self, capacity: usize) -> Self {
        self.fuzz_queue = capacity.max(1);
        self
    }
}
