//! Axis-aligned rectangle primitives
//!
//! Every collision check in the simulation goes through these, and the
//! synchronization layer uses `mirror_y` to translate between the two
//! peers' coordinate frames (each peer renders its own paddle at the
//! bottom of its own viewport).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, top-left anchored, y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Overlap test on both axes. Touching edges do not count: strict
    /// inequality on every comparison.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether a point lies inside the rectangle (edges included)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Rectangle expanded by `margin` on all four sides
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2.0,
            h: self.h + margin * 2.0,
        }
    }

    /// Reflect the rectangle's vertical position across the board midline.
    ///
    /// Involution: `r.mirror_y(h).mirror_y(h) == r` (exact on whole-pixel
    /// coordinates)
    pub fn mirror_y(&self, board_height: f32) -> Rect {
        Rect {
            x: self.x,
            y: board_height - self.y - self.h,
            w: self.w,
            h: self.h,
        }
    }
}

/// Mirror a direction vector (vertical component flips, horizontal stays)
#[inline]
pub fn mirror_dir_y(dir: Vec2) -> Vec2 {
    Vec2::new(dir.x, -dir.y)
}
