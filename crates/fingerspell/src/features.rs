//! Feature encoding of hand landmarks.
//!
//! The letter network was trained on the raw detector output, flattened point by point. No
//! mirroring, axis swap, or normalization is applied here; screen-space transforms live in
//! [`crate::display`] and must never be applied before classification.

use std::ops::Index;

use crate::{
    classifier::ClassifyError,
    iter::zip_exact,
    landmark::{Landmark, NUM_LANDMARKS},
};

/// Number of values in a [`FeatureVector`].
pub const FEATURE_LEN: usize = NUM_LANDMARKS * 2;

/// Network input: `[x0, y0, x1, y1, ..., x20, y20]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_LEN]);

impl FeatureVector {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn as_array(&self) -> &[f32; FEATURE_LEN] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        FEATURE_LEN
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

/// Flattens exactly [`NUM_LANDMARKS`] landmarks into a [`FeatureVector`], preserving order.
///
/// Returns [`ClassifyError::InvalidInputShape`] for any other number of landmarks.
pub fn encode(landmarks: &[Landmark]) -> Result<FeatureVector, ClassifyError> {
    let landmarks: &[Landmark; NUM_LANDMARKS] =
        landmarks.try_into().map_err(|_| ClassifyError::InvalidInputShape {
            expected: NUM_LANDMARKS,
            actual: landmarks.len(),
        })?;
    Ok(encode_array(landmarks))
}

pub(crate) fn encode_array(landmarks: &[Landmark; NUM_LANDMARKS]) -> FeatureVector {
    let mut data = [0.0; FEATURE_LEN];
    for (lm, out) in zip_exact(landmarks, data.chunks_exact_mut(2)) {
        out[0] = lm.x();
        out[1] = lm.y();
    }
    FeatureVector(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_landmarks() {
        let features = encode(&[Landmark::default(); NUM_LANDMARKS]).unwrap();
        assert_eq!(features.len(), 42);
        assert!(features.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn interleaves_in_order() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let landmarks = (0..NUM_LANDMARKS)
            .map(|_| Landmark::new(rng.f32(), rng.f32()))
            .collect::<Vec<_>>();

        let features = encode(&landmarks).unwrap();
        assert_eq!(features.as_slice().len(), FEATURE_LEN);
        for (i, lm) in landmarks.iter().enumerate() {
            assert_eq!(features[2 * i], lm.x());
            assert_eq!(features[2 * i + 1], lm.y());
        }
    }

    #[test]
    fn no_geometric_transform() {
        // Points outside the unit square pass through untouched.
        let mut landmarks = [Landmark::new(0.25, 0.75); NUM_LANDMARKS];
        landmarks[3] = Landmark::new(-0.1, 1.2);
        let features = encode(&landmarks).unwrap();
        assert_eq!(&features.as_slice()[..2], &[0.25, 0.75]);
        assert_eq!(&features.as_slice()[6..8], &[-0.1, 1.2]);
    }

    #[test]
    fn rejects_wrong_counts() {
        for count in [0, 1, 20, 22, 42] {
            let landmarks = vec![Landmark::default(); count];
            assert_eq!(
                encode(&landmarks),
                Err(ClassifyError::InvalidInputShape {
                    expected: NUM_LANDMARKS,
                    actual: count,
                }),
                "count {count}"
            );
        }
    }
}
