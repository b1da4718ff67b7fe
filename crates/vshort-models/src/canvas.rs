//! Output canvas geometry.

use serde::{Deserialize, Serialize};

/// Portrait 1080x1920 at 30 fps.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1080;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1920;
pub const DEFAULT_CANVAS_FPS: u32 = 30;

/// Fixed-size output frame the main segment and filler are stacked onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            fps: DEFAULT_CANVAS_FPS,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }

    /// Height of the bottom filler panel: a third of the canvas, kept even.
    pub fn filler_height(&self) -> u32 {
        (self.height / 3) & !1
    }

    /// Height of the top panel holding the main segment.
    pub fn main_height(&self) -> u32 {
        self.height - self.filler_height()
    }
}
