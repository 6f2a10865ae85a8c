//! Hand landmarks as produced by the external landmark detector.

use crate::{
    classifier::ClassifyError,
    features::{self, FeatureVector},
};

/// The number of landmarks per hand.
pub const NUM_LANDMARKS: usize = 21;

/// A single normalized 2D hand keypoint.
///
/// Both coordinates are conventionally in `[0, 1]`, relative to the detector's input image, but
/// this is not enforced: the detector may place keypoints slightly outside the image.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Landmark {
    x: f32,
    y: f32,
}

impl Landmark {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }
}

impl From<(f32, f32)> for Landmark {
    #[inline]
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for Landmark {
    #[inline]
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// The full set of [`NUM_LANDMARKS`] landmarks of one detected hand, in detector order.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; NUM_LANDMARKS],
}

impl HandLandmarks {
    /// Creates a [`HandLandmarks`] collection from a detector-provided point list.
    ///
    /// Fails with [`ClassifyError::InvalidInputShape`] unless `points` contains exactly
    /// [`NUM_LANDMARKS`] entries.
    pub fn from_points(points: &[Landmark]) -> Result<Self, ClassifyError> {
        let points: [Landmark; NUM_LANDMARKS] =
            points.try_into().map_err(|_| ClassifyError::InvalidInputShape {
                expected: NUM_LANDMARKS,
                actual: points.len(),
            })?;
        Ok(Self { points })
    }

    /// Returns the landmarks in detector order.
    #[inline]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.points
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Landmark> + '_ {
        self.points.iter().copied()
    }

    #[inline]
    pub fn get(&self, index: LandmarkIdx) -> Landmark {
        self.points[index as usize]
    }

    /// Encodes the landmarks as classifier input.
    ///
    /// This cannot fail, since a [`HandLandmarks`] always holds the right number of points.
    pub fn features(&self) -> FeatureVector {
        features::encode_array(&self.points)
    }
}

impl From<[Landmark; NUM_LANDMARKS]> for HandLandmarks {
    fn from(points: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { points }
    }
}

/// Names for the hand landmarks, in detector order.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Bones of the hand skeleton, as pairs of landmarks to connect when drawing.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Thumb:
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (Wrist, MiddleFingerMcp),
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (Wrist, RingFingerMcp),
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
        // Knuckles:
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
    ]
};
