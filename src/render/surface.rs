//! Drawing targets for composed audio strips.

use egui::{Color32, ColorImage};

/// Integer pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel rectangle; empty when either extent is not positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap of two rectangles, empty when they do not intersect.
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        PixelRect::new(x, y, (right - x).max(0), (bottom - y).max(0))
    }
}

/// Device-context-like sink that composed strips are drawn onto.
pub trait DrawSurface {
    /// Copy `bitmap` with its top-left corner at `(x, y)`, honouring the clip rectangle.
    fn draw_bitmap(&mut self, bitmap: &ColorImage, x: i32, y: i32);

    /// Fill `rect` with `color`, honouring the clip rectangle.
    fn fill_rectangle(&mut self, rect: PixelRect, color: Color32);

    /// Current clip rectangle, if any.
    fn clip(&self) -> Option<PixelRect>;

    /// Replace the clip rectangle.
    fn set_clip(&mut self, clip: Option<PixelRect>);
}

/// Restricts drawing to a rectangle and restores the previous clip when dropped.
pub struct ClipGuard<'a> {
    surface: &'a mut dyn DrawSurface,
    previous: Option<PixelRect>,
}

impl<'a> ClipGuard<'a> {
    pub fn new(surface: &'a mut dyn DrawSurface, rect: PixelRect) -> Self {
        let previous = surface.clip();
        let clip = match previous {
            Some(outer) => outer.intersect(&rect),
            None => rect,
        };
        surface.set_clip(Some(clip));
        Self { surface, previous }
    }
}

impl DrawSurface for ClipGuard<'_> {
    fn draw_bitmap(&mut self, bitmap: &ColorImage, x: i32, y: i32) {
        self.surface.draw_bitmap(bitmap, x, y);
    }

    fn fill_rectangle(&mut self, rect: PixelRect, color: Color32) {
        self.surface.fill_rectangle(rect, color);
    }

    fn clip(&self) -> Option<PixelRect> {
        self.surface.clip()
    }

    fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.surface.set_clip(clip);
    }
}

impl Drop for ClipGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_clip(self.previous);
    }
}

/// In-memory drawing surface backed by an egui image.
pub struct ImageSurface {
    image: ColorImage,
    clip: Option<PixelRect>,
}

impl ImageSurface {
    /// Create a surface of `width × height` pixels filled with `background`.
    pub fn new(width: usize, height: usize, background: Color32) -> Self {
        Self {
            image: blank_image(width, height, background),
            clip: None,
        }
    }

    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    pub fn into_image(self) -> ColorImage {
        self.image
    }

    /// Pixel at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        let [width, height] = self.image.size;
        if x >= width || y >= height {
            return None;
        }
        self.image.pixels.get(y * width + x).copied()
    }

    fn bounds(&self) -> PixelRect {
        let bounds = image_rect(&self.image);
        match self.clip {
            Some(clip) => bounds.intersect(&clip),
            None => bounds,
        }
    }
}

impl DrawSurface for ImageSurface {
    fn draw_bitmap(&mut self, bitmap: &ColorImage, x: i32, y: i32) {
        let bounds = self.bounds();
        blit_image(&mut self.image, bitmap, x, y, bounds);
    }

    fn fill_rectangle(&mut self, rect: PixelRect, color: Color32) {
        let rect = rect.intersect(&self.bounds());
        fill_image_rect(&mut self.image, rect, color);
    }

    fn clip(&self) -> Option<PixelRect> {
        self.clip
    }

    fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.clip = clip;
    }
}

/// Opaque image of `width × height` pixels filled with `color`.
pub(crate) fn blank_image(width: usize, height: usize, color: Color32) -> ColorImage {
    ColorImage::new([width, height], vec![color; width * height])
}

pub(crate) fn image_rect(image: &ColorImage) -> PixelRect {
    PixelRect::new(0, 0, image.size[0] as i32, image.size[1] as i32)
}

/// Fill the part of `rect` that lies inside `image`.
pub(crate) fn fill_image_rect(image: &mut ColorImage, rect: PixelRect, color: Color32) {
    let rect = rect.intersect(&image_rect(image));
    if rect.is_empty() {
        return;
    }
    let stride = image.size[0];
    for y in rect.y..rect.bottom() {
        let row = y as usize * stride;
        let start = row + rect.x as usize;
        let end = row + rect.right() as usize;
        image.pixels[start..end].fill(color);
    }
}

/// Copy `source` into `target` at `(x, y)`, limited to `bounds`.
fn blit_image(target: &mut ColorImage, source: &ColorImage, x: i32, y: i32, bounds: PixelRect) {
    let placed = PixelRect::new(x, y, source.size[0] as i32, source.size[1] as i32);
    let visible = placed.intersect(&bounds).intersect(&image_rect(target));
    if visible.is_empty() {
        return;
    }
    let len = visible.width as usize;
    let src_x = (visible.x - x) as usize;
    for dest_y in visible.y..visible.bottom() {
        let src_y = (dest_y - y) as usize;
        let src_offset = src_y * source.size[0] + src_x;
        let dest_offset = dest_y as usize * target.size[0] + visible.x as usize;
        if let (Some(dest), Some(src)) = (
            target.pixels.get_mut(dest_offset..dest_offset + len),
            source.pixels.get(src_offset..src_offset + len),
        ) {
            dest.copy_from_slice(src);
        }
    }
}
