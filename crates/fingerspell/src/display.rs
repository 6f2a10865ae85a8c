//! Screen-space presentation of hand landmarks.
//!
//! Everything in here is for drawing only. The classifier consumes landmarks exactly as the
//! detector produced them; feeding transformed points into it would change what the network sees.

use nalgebra::Point2;

use crate::landmark::{HandLandmarks, Landmark, CONNECTIVITY};

/// Maps normalized landmarks to pixel coordinates on a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    width: f32,
    height: f32,
    swap_axes: bool,
    mirror_x: bool,
    mirror_y: bool,
}

impl ScreenTransform {
    /// Scales landmarks to a `width` x `height` view without rotating or mirroring them.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            swap_axes: false,
            mirror_x: false,
            mirror_y: false,
        }
    }

    /// Transform for a portrait view showing a front camera whose sensor is rotated by 90°.
    ///
    /// A landmark at `(x, y)` is drawn at `((1 - y) * width, (1 - x) * height)`.
    pub fn front_camera(width: f32, height: f32) -> Self {
        Self::new(width, height)
            .swap_axes(true)
            .mirror_x(true)
            .mirror_y(true)
    }

    /// Swaps the normalized x and y coordinates before anything else.
    pub fn swap_axes(self, swap_axes: bool) -> Self {
        Self { swap_axes, ..self }
    }

    /// Flips the horizontal axis (after swapping, if enabled).
    pub fn mirror_x(self, mirror_x: bool) -> Self {
        Self { mirror_x, ..self }
    }

    /// Flips the vertical axis (after swapping, if enabled).
    pub fn mirror_y(self, mirror_y: bool) -> Self {
        Self { mirror_y, ..self }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Maps a landmark to view pixel coordinates.
    pub fn apply(&self, landmark: Landmark) -> Point2<f32> {
        let (mut u, mut v) = if self.swap_axes {
            (landmark.y(), landmark.x())
        } else {
            (landmark.x(), landmark.y())
        };
        if self.mirror_x {
            u = 1.0 - u;
        }
        if self.mirror_y {
            v = 1.0 - v;
        }
        Point2::new(u * self.width, v * self.height)
    }
}

/// The screen-space skeleton of at most one hand, ready to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    points: Vec<Point2<f32>>,
}

impl Overlay {
    /// An overlay that draws nothing, used to clear the view when no hand is visible.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Projects a hand into screen space.
    pub fn project(hand: &HandLandmarks, transform: &ScreenTransform) -> Self {
        Self::project_points(hand.as_slice(), transform)
    }

    /// Projects an arbitrary list of landmarks.
    ///
    /// Unlike classification, drawing works with any number of points; [`Overlay::segments`]
    /// skips bones whose endpoints are missing.
    pub fn project_points(points: &[Landmark], transform: &ScreenTransform) -> Self {
        Self {
            points: points.iter().map(|&lm| transform.apply(lm)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The projected keypoints, in detector order.
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    /// Line segments of the hand skeleton.
    pub fn segments(&self) -> impl Iterator<Item = (Point2<f32>, Point2<f32>)> + '_ {
        CONNECTIVITY.iter().filter_map(|&(a, b)| {
            let a = self.points.get(a as usize)?;
            let b = self.points.get(b as usize)?;
            Some((*a, *b))
        })
    }
}
