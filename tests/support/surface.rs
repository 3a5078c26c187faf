use egui::{Color32, ColorImage};
use wavestrip::render::{DrawSurface, ImageSurface, PixelRect};

/// Drawing call seen by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCall {
    Bitmap { x: i32, y: i32, width: usize },
    Fill { rect: PixelRect, color: Color32 },
}

/// Image surface that also records every drawing call.
pub struct RecordingSurface {
    pub image: ImageSurface,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: ImageSurface::new(width, height, Color32::TRANSPARENT),
            calls: Vec::new(),
        }
    }

    pub fn bitmap_xs(&self) -> Vec<i32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Bitmap { x, .. } => Some(*x),
                DrawCall::Fill { .. } => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<PixelRect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Fill { rect, .. } => Some(*rect),
                DrawCall::Bitmap { .. } => None,
            })
            .collect()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        self.image.pixel(x, y)
    }
}

impl DrawSurface for RecordingSurface {
    fn draw_bitmap(&mut self, bitmap: &ColorImage, x: i32, y: i32) {
        self.calls.push(DrawCall::Bitmap {
            x,
            y,
            width: bitmap.size[0],
        });
        self.image.draw_bitmap(bitmap, x, y);
    }

    fn fill_rectangle(&mut self, rect: PixelRect, color: Color32) {
        self.calls.push(DrawCall::Fill { rect, color });
        self.image.fill_rectangle(rect, color);
    }

    fn clip(&self) -> Option<PixelRect> {
        self.image.clip()
    }

    fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.image.set_clip(clip);
    }
}
