//! Neural Network inference.

pub mod tensor;

use tensor::Tensor;
use tract_onnx::prelude::{
    tvec, Framework, Graph, InferenceModelExt, SimplePlan, TValue, TVec, TypedFact, TypedOp,
};

use std::{
    borrow::Cow,
    ops::{Index, Range},
    path::Path,
    sync::Arc,
};

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Neural network loader.
pub struct Loader<'a> {
    model_data: Cow<'a, [u8]>,
}

impl<'a> Loader<'a> {
    fn new(model_data: Cow<'a, [u8]>) -> Self {
        Self { model_data }
    }

    /// Loads and optimizes the network.
    ///
    /// Returns an error if the network data is malformed, if the network data is incomplete, or
    /// if the network uses unimplemented operations.
    pub fn load(self) -> anyhow::Result<NeuralNetwork> {
        let graph = tract_onnx::onnx()
            .model_for_read(&mut &*self.model_data)?
            .into_optimized()?;
        let model = SimplePlan::new(graph)?;

        Ok(NeuralNetwork(Arc::new(model)))
    }
}

/// A neural network that can be used for inference.
///
/// This is a cheaply [`Clone`]able handle to the underlying network structures.
#[derive(Clone)]
pub struct NeuralNetwork(Arc<Model>);

impl NeuralNetwork {
    /// Loads a pre-trained model from an ONNX file path.
    ///
    /// The path must have a `.onnx` extension.
    pub fn from_path<'a, P: AsRef<Path>>(path: P) -> anyhow::Result<Loader<'a>> {
        Self::from_path_impl(path.as_ref())
    }

    fn from_path_impl<'a>(path: &Path) -> anyhow::Result<Loader<'a>> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => anyhow::bail!(
                "neural network file must have `.onnx` extension: {}",
                path.display()
            ),
        }

        let model_data = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Ok(Loader::new(model_data.into()))
    }

    /// Loads a pre-trained model from an in-memory ONNX file.
    pub fn from_onnx(raw: &[u8]) -> Loader<'_> {
        Loader::new(raw.into())
    }

    /// Returns the number of input nodes of the network.
    pub fn num_inputs(&self) -> usize {
        self.0.model().inputs.len()
    }

    /// Returns the number of output nodes of the network.
    pub fn num_outputs(&self) -> usize {
        self.0.model().outputs.len()
    }

    /// Returns an iterator over the network's input node information.
    ///
    /// To perform inference, a matching input tensor has to be provided for each input.
    pub fn inputs(&self) -> NodeInfoIter<'_> {
        NodeInfoIter {
            net: self,
            ids: 0..self.num_inputs(),
            kind: NodeKind::Input,
        }
    }

    /// Returns an iterator over the network's output node information.
    pub fn outputs(&self) -> NodeInfoIter<'_> {
        NodeInfoIter {
            net: self,
            ids: 0..self.num_outputs(),
            kind: NodeKind::Output,
        }
    }

    /// Runs the network on a set of [`Inputs`], returning the estimated [`Outputs`].
    #[doc(alias = "infer")]
    pub fn estimate(&self, inputs: &Inputs) -> anyhow::Result<Outputs> {
        let inputs = inputs
            .iter()
            .map(|t| -> anyhow::Result<TValue> {
                Ok(TValue::from_const(Arc::new(t.to_tract()?)))
            })
            .collect::<anyhow::Result<TVec<_>>>()?;
        let outputs = self.0.run(inputs)?;
        let inner = outputs
            .iter()
            .map(|tract| Tensor::from_tract(tract))
            .collect::<anyhow::Result<TVec<_>>>()?;

        Ok(Outputs { inner })
    }
}

#[derive(Clone, Copy)]
enum NodeKind {
    Input,
    Output,
}

/// Iterator over a [`NeuralNetwork`]s input or output node information.
pub struct NodeInfoIter<'a> {
    net: &'a NeuralNetwork,
    ids: Range<usize>,
    kind: NodeKind,
}

impl<'a> Iterator for NodeInfoIter<'a> {
    type Item = NodeInfo<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;

        let net: &'a NeuralNetwork = self.net;
        let model = net.0.model();
        let (fact, outlet) = match self.kind {
            NodeKind::Input => (model.input_fact(id).ok()?, *model.inputs.get(id)?),
            NodeKind::Output => (model.output_fact(id).ok()?, *model.outputs.get(id)?),
        };

        Some(NodeInfo {
            shape: fact.shape.as_concrete(),
            name: &model.node(outlet.node).name,
        })
    }
}

/// Information about a neural network input or output node.
#[derive(Debug)]
pub struct NodeInfo<'a> {
    shape: Option<&'a [usize]>,
    name: &'a str,
}

impl<'a> NodeInfo<'a> {
    /// Returns the tensor shape of this node, or [`None`] if the network declares it symbolically.
    #[inline]
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape
    }

    /// Returns the name of this node.
    #[inline]
    pub fn name(&self) -> &str {
        self.name
    }
}

/// The result of a neural network inference pass.
///
/// This is a list of tensors corresponding to the network's output nodes.
#[derive(Debug)]
pub struct Outputs {
    inner: TVec<Tensor>,
}

impl Outputs {
    /// Returns the number of tensors in this inference output.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Index<usize> for Outputs {
    type Output = Tensor;

    fn index(&self, index: usize) -> &Tensor {
        &self.inner[index]
    }
}

/// List of input tensors for neural network inference.
#[derive(Debug)]
pub struct Inputs {
    inner: TVec<Tensor>,
}

impl Inputs {
    /// Returns the number of input tensors stored in `self`.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &Tensor> {
        self.inner.iter()
    }
}

impl From<Tensor> for Inputs {
    fn from(t: Tensor) -> Self {
        Self { inner: tvec![t] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_other_extensions() {
        let err = NeuralNetwork::from_path("assets/letter_classifier.tflite")
            .err()
            .expect("non-ONNX path accepted");
        assert!(err.to_string().contains("`.onnx` extension"), "{err}");
    }

    #[test]
    fn missing_file() {
        let err = NeuralNetwork::from_path("does/not/exist.onnx")
            .err()
            .expect("missing file accepted");
        assert!(err.to_string().contains("does/not/exist.onnx"), "{err}");
    }

    #[test]
    fn corrupt_model() {
        assert!(NeuralNetwork::from_onnx(b"definitely not protobuf")
            .load()
            .is_err());
    }

    #[test]
    fn single_input() {
        let inputs = Inputs::from(Tensor::from_iter(&[1, 2], [1.0, 2.0]));
        assert_eq!(inputs.len(), 1);
        assert!(!inputs.is_empty());
    }
}
