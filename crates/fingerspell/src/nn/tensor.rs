//! Tensor API.
//!
//! Tensors are the inputs and outputs of neural networks. Here they are little more than a shape
//! and a flat, row-major buffer of `f32`s: the letter network takes a `[1, 42]` feature batch
//! and produces a `[1, 21]` score batch, so there is no need for general strided views.

use std::fmt;

use tinyvec::TinyVec;

/// A dynamically shaped, row-major `f32` tensor.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    shape: TinyVec<[usize; 4]>,
    data: Box<[f32]>,
}

impl Tensor {
    /// Creates a tensor of the given shape by pulling elements from an iterator.
    ///
    /// # Panics
    ///
    /// `iter` must yield exactly as many elements as specified by `shape` (by multiplying all of
    /// its entries), otherwise this method will panic.
    #[track_caller]
    pub fn from_iter<I: IntoIterator<Item = f32>>(shape: &[usize], iter: I) -> Self {
        let data: Box<[f32]> = iter.into_iter().collect();
        let elements = shape.iter().product::<usize>();
        assert_eq!(
            data.len(),
            elements,
            "tensor of shape {shape:?} needs {elements} elements, got {}",
            data.len(),
        );
        Self {
            shape: TinyVec::from(shape),
            data,
        }
    }

    pub(super) fn from_tract(tract: &tract_onnx::prelude::Tensor) -> anyhow::Result<Self> {
        let data = tract.as_slice::<f32>()?;
        Ok(Self::from_iter(tract.shape(), data.iter().copied()))
    }

    pub(super) fn to_tract(&self) -> anyhow::Result<tract_onnx::prelude::Tensor> {
        tract_onnx::prelude::Tensor::from_shape(self.shape(), &self.data)
    }

    /// Returns the shape of this tensor.
    ///
    /// A tensor's shape is the number of entries in each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions of this tensor.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the values stored in a 1-dimensional tensor as a slice.
    ///
    /// # Panics
    ///
    /// `self` must have exactly 1 dimension, otherwise this method panics.
    #[track_caller]
    pub fn as_slice(&self) -> &[f32] {
        assert_eq!(
            self.rank(),
            1,
            "attempted to access tensor of shape {:?} as slice",
            self.shape()
        );
        &self.data
    }

    /// Returns the elements of entry `index` of the outermost dimension.
    ///
    /// For a `[1, 21]` batch, `row(0)` is the 21-element vector of the only batch entry.
    ///
    /// # Panics
    ///
    /// `self` must have at least one dimension and `index` must be in bounds, otherwise this
    /// method will panic.
    #[track_caller]
    pub fn row(&self, index: usize) -> &[f32] {
        assert!(
            self.rank() > 0 && index < self.shape[0],
            "attempted to index tensor of shape {:?} with [{}]",
            self.shape(),
            index
        );
        let stride = self.shape[1..].iter().product::<usize>();
        &self.data[index * stride..(index + 1) * stride]
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}
