use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Virtual canvas in logical pixels. Pieces, targets and physics all live in this space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Default vertical reel canvas.
    pub const VERTICAL: Canvas = Canvas {
        width: 1080,
        height: 2280,
    };

    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("canvas width and height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    pub fn aspect(self) -> f64 {
        self.w() / self.h().max(1.0)
    }

    pub fn area(self) -> f64 {
        self.w() * self.h()
    }

    pub fn center(self) -> Point {
        Point::new(self.w() * 0.5, self.h() * 0.5)
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.w(), self.h())
    }

    /// Uniform scale + offset that makes an image of `img_w`×`img_h` cover this canvas.
    ///
    /// Returns `None` for zero-sized images.
    pub fn cover_fit(self, img_w: u32, img_h: u32) -> Option<CoverFit> {
        if img_w == 0 || img_h == 0 {
            return None;
        }
        let iw = f64::from(img_w);
        let ih = f64::from(img_h);
        let scale = (self.w() / iw).max(self.h() / ih);
        Some(CoverFit {
            scale,
            offset: Vec2::new((self.w() - iw * scale) * 0.5, (self.h() - ih * scale) * 0.5),
        })
    }
}

/// Cover-fit mapping from source image space into canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub offset: Vec2,
}

impl CoverFit {
    pub fn to_canvas(self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    pub fn to_source(self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    pub fn rect_to_source(self, r: Rect) -> Rect {
        let a = self.to_source(Point::new(r.x0, r.y0));
        let b = self.to_source(Point::new(r.x1, r.y1));
        Rect::new(a.x, a.y, b.x, b.y)
    }

    /// Affine mapping source pixels to canvas coordinates.
    pub fn affine(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
