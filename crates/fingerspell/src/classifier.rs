//! Letter classification.
//!
//! A [`Classifier`] owns a [`ScoreModel`] (normally the ONNX letter network), turns landmarks
//! into a [`FeatureVector`], runs the model, and reports the highest-scoring letter if its score
//! exceeds the configured threshold.
//!
//! Failures never escape [`Classifier::classify`]: a missing model, malformed landmarks, or a
//! failed inference all show up as "no letter this frame", and the next call starts fresh.

use std::{
    cmp::Reverse,
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use crate::{
    features::{self, FeatureVector, FEATURE_LEN},
    labels::{LabelSet, NUM_LABELS},
    landmark::Landmark,
    nn::{tensor::Tensor, Inputs, NeuralNetwork},
    num::TotalF32,
    timer::Timer,
};

/// Canonical acceptance threshold.
///
/// A prediction is only reported if its score is *strictly* greater than this.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Model location used when neither [`ClassifierOptions::model_path`] nor the `FINGERSPELL_MODEL`
/// environment variable say otherwise. Relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "assets/letter_classifier.onnx";

const MODEL_PATH_VAR: &str = "FINGERSPELL_MODEL";

/// How many candidates are logged per call.
const LOG_TOP_K: usize = 3;

/// Errors produced on the classification path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// The caller passed the wrong number of landmarks.
    #[error("expected {expected} landmarks, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },

    /// The model could not be loaded when the classifier was created.
    #[error("letter model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single inference call failed or produced unusable output.
    #[error("inference failed: {0}")]
    InferenceError(String),
}

/// An accepted prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    label: String,
    index: usize,
    score: f32,
}

impl Classification {
    /// The predicted letter.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Index of the letter in the classifier's [`LabelSet`].
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw model score of the letter. Always greater than the classifier's threshold.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }
}

/// Something that maps a [`FeatureVector`] to one score per label.
///
/// Implemented for [`NeuralNetwork`] and for closures, which is mostly useful for testing and
/// for plugging in other inference engines.
///
/// Scoring takes `&mut self` since most inference engines are not reentrant.
pub trait ScoreModel: Send {
    fn scores(&mut self, features: &FeatureVector) -> anyhow::Result<Vec<f32>>;
}

impl<F> ScoreModel for F
where
    F: FnMut(&FeatureVector) -> anyhow::Result<Vec<f32>> + Send,
{
    fn scores(&mut self, features: &FeatureVector) -> anyhow::Result<Vec<f32>> {
        self(features)
    }
}

/// Feeds the features as a `[1, 42]` batch. The output may be a `[1, N]` batch or an `[N]` vector.
impl ScoreModel for NeuralNetwork {
    fn scores(&mut self, features: &FeatureVector) -> anyhow::Result<Vec<f32>> {
        let input = Tensor::from_iter(&[1, FEATURE_LEN], features.as_slice().iter().copied());
        let outputs = self.estimate(&Inputs::from(input))?;
        if outputs.len() != 1 {
            anyhow::bail!(
                "letter network must have exactly 1 output, this one has {}",
                outputs.len()
            );
        }
        let scores = &outputs[0];
        match scores.shape() {
            [1, _] => Ok(scores.row(0).to_vec()),
            [_] => Ok(scores.as_slice().to_vec()),
            shape => anyhow::bail!("letter network output has shape {shape:?}, expected [1, N] or [N]"),
        }
    }
}

/// Configuration for a [`Classifier`].
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    model_path: PathBuf,
    threshold: f32,
    labels: LabelSet,
}

impl Default for ClassifierOptions {
    /// Uses [`DEFAULT_THRESHOLD`], the default [`LabelSet`], and [`DEFAULT_MODEL_PATH`] unless the
    /// `FINGERSPELL_MODEL` environment variable is set.
    fn default() -> Self {
        Self {
            model_path: default_model_path().to_path_buf(),
            threshold: DEFAULT_THRESHOLD,
            labels: LabelSet::default(),
        }
    }
}

impl ClassifierOptions {
    /// Sets the path of the ONNX model to load.
    pub fn model_path<P: Into<PathBuf>>(self, model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..self
        }
    }

    /// Sets the acceptance threshold.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not in `[0, 1]` (this includes NaN).
    #[track_caller]
    pub fn threshold(self, threshold: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&threshold),
            "classifier threshold must be in [0, 1], got {threshold}"
        );
        Self { threshold, ..self }
    }

    /// Sets the label set. Its order must match the model's output order.
    pub fn labels(self, labels: LabelSet) -> Self {
        Self { labels, ..self }
    }

    pub fn get_model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn get_threshold(&self) -> f32 {
        self.threshold
    }

    pub fn get_labels(&self) -> &LabelSet {
        &self.labels
    }
}

fn default_model_path() -> &'static Path {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| match env::var_os(MODEL_PATH_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            log::debug!("using model path from {MODEL_PATH_VAR}: {}", path.display());
            path
        }
        None => PathBuf::from(DEFAULT_MODEL_PATH),
    })
}

/// Lifecycle state of a [`Classifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    /// The model is loaded and classification calls run inference.
    Ready,
    /// The model failed to load. Every classification call reports no result.
    Unavailable,
}

enum State {
    Ready(Box<dyn ScoreModel>),
    Unavailable(String),
}

/// Classifies hand landmarks into letters.
///
/// A classifier is either [`Ready`] or [`Unavailable`], decided once at construction. A failed
/// load is never retried; create a new classifier instead.
///
/// Classification takes `&mut self`. To share a classifier between threads, put it behind a
/// `Mutex`, or move it to a worker thread (see [`crate::pipeline::Recognizer`]).
///
/// [`Ready`]: ClassifierState::Ready
/// [`Unavailable`]: ClassifierState::Unavailable
pub struct Classifier {
    state: State,
    labels: LabelSet,
    threshold: f32,
    t_infer: Timer,
}

impl Classifier {
    /// Loads the model configured in `options`.
    ///
    /// This does not fail: if the model cannot be loaded, the error is logged and the classifier
    /// starts out [`Unavailable`](ClassifierState::Unavailable). Use [`Classifier::load`] to get
    /// the error instead.
    pub fn new(options: ClassifierOptions) -> Self {
        match Self::load(options.clone()) {
            Ok(classifier) => {
                log::debug!("loaded letter model from {}", options.model_path.display());
                log::debug!("labels: {:?}", classifier.labels);
                classifier
            }
            Err(e) => {
                log::error!("{e}");
                Self::unavailable(e.to_string(), options)
            }
        }
    }

    /// Loads the model configured in `options`, failing with
    /// [`ClassifyError::ModelUnavailable`] if it is missing, corrupt, or has the wrong shape.
    pub fn load(options: ClassifierOptions) -> Result<Self, ClassifyError> {
        let path = &options.model_path;
        let network = NeuralNetwork::from_path(path)
            .and_then(|loader| loader.load())
            .and_then(|network| {
                check_network(&network)?;
                Ok(network)
            })
            .map_err(|e| {
                ClassifyError::ModelUnavailable(format!("{}: {e:#}", path.display()))
            })?;

        Ok(Self::with_model(network, options))
    }

    /// Creates a [`Ready`](ClassifierState::Ready) classifier from an already loaded model.
    ///
    /// The model path in `options` is ignored.
    pub fn with_model<M: ScoreModel + 'static>(model: M, options: ClassifierOptions) -> Self {
        Self {
            state: State::Ready(Box::new(model)),
            labels: options.labels,
            threshold: options.threshold,
            t_infer: Timer::new("classify"),
        }
    }

    /// Creates a classifier that is permanently [`Unavailable`](ClassifierState::Unavailable).
    pub fn unavailable<R: Into<String>>(reason: R, options: ClassifierOptions) -> Self {
        Self {
            state: State::Unavailable(reason.into()),
            labels: options.labels,
            threshold: options.threshold,
            t_infer: Timer::new("classify"),
        }
    }

    pub fn state(&self) -> ClassifierState {
        match self.state {
            State::Ready(_) => ClassifierState::Ready,
            State::Unavailable(_) => ClassifierState::Unavailable,
        }
    }

    /// If the classifier is [`Unavailable`](ClassifierState::Unavailable), returns why.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready(_) => None,
            State::Unavailable(reason) => Some(reason),
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Timer measuring the inference calls made by this classifier.
    pub fn timer(&self) -> &Timer {
        &self.t_infer
    }

    /// Classifies a hand, returning [`None`] if there is no confident result.
    ///
    /// Errors are logged and reported as [`None`].
    pub fn classify(&mut self, landmarks: &[Landmark]) -> Option<Classification> {
        match features::encode(landmarks) {
            Ok(features) => self.classify_features(&features),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    /// Classifies an already encoded hand, returning [`None`] if there is no confident result.
    pub fn classify_features(&mut self, features: &FeatureVector) -> Option<Classification> {
        match self.try_classify_features(features) {
            Ok(res) => res,
            // Already logged at construction, don't spam it every frame.
            Err(ClassifyError::ModelUnavailable(_)) => None,
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    /// Classifies a hand.
    ///
    /// Returns `Ok(None)` if the best score does not exceed the threshold.
    pub fn try_classify(
        &mut self,
        landmarks: &[Landmark],
    ) -> Result<Option<Classification>, ClassifyError> {
        let features = features::encode(landmarks)?;
        self.try_classify_features(&features)
    }

    /// Classifies an already encoded hand.
    ///
    /// Returns `Ok(None)` if the best score does not exceed the threshold.
    pub fn try_classify_features(
        &mut self,
        features: &FeatureVector,
    ) -> Result<Option<Classification>, ClassifyError> {
        let model = match &mut self.state {
            State::Ready(model) => model,
            State::Unavailable(reason) => {
                return Err(ClassifyError::ModelUnavailable(reason.clone()))
            }
        };

        let scores = self
            .t_infer
            .time(|| model.scores(features))
            .map_err(|e| ClassifyError::InferenceError(format!("{e:#}")))?;

        if log::log_enabled!(log::Level::Trace) && scores.len() == self.labels.len() {
            let top = top_k(&scores, &self.labels, LOG_TOP_K)
                .into_iter()
                .map(|(label, score)| format!("{label}({score:.3})"))
                .collect::<Vec<_>>();
            log::trace!("top {LOG_TOP_K}: {}", top.join(", "));
        }

        let res = select(&scores, &self.labels, self.threshold)?;
        match &res {
            Some(c) => log::trace!("accepted {} ({:.3})", c.label, c.score),
            None => log::trace!("no score above {}", self.threshold),
        }
        Ok(res)
    }
}

/// Checks that the network maps one `[1, 42]` input to one `[1, 21]` (or `[21]`) output.
///
/// Symbolic dimensions are accepted and checked when inference runs.
fn check_network(network: &NeuralNetwork) -> anyhow::Result<()> {
    if network.num_inputs() != 1 || network.num_outputs() != 1 {
        anyhow::bail!(
            "letter network must have 1 input and 1 output, this one has {} and {}",
            network.num_inputs(),
            network.num_outputs(),
        );
    }

    for info in network.inputs() {
        match info.shape() {
            Some(shape) if shape != [1, FEATURE_LEN] => anyhow::bail!(
                "input '{}' has shape {shape:?}, expected [1, {FEATURE_LEN}]",
                info.name(),
            ),
            _ => {}
        }
    }
    for info in network.outputs() {
        match info.shape() {
            Some(shape) if shape != [1, NUM_LABELS] && shape != [NUM_LABELS] => anyhow::bail!(
                "output '{}' has shape {shape:?}, expected [1, {NUM_LABELS}]",
                info.name(),
            ),
            _ => {}
        }
    }

    Ok(())
}

/// Returns the index and value of the largest score.
///
/// If the maximum occurs more than once, the lowest index wins. NaN scores are skipped. Returns
/// [`None`] if there is no non-NaN score.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Picks the winning label from a score vector and applies the confidence gate.
///
/// Fails with [`ClassifyError::InferenceError`] if `scores` does not have one finite entry per
/// label. Returns `Ok(None)` unless the best score is strictly greater than `threshold`.
pub fn select(
    scores: &[f32],
    labels: &LabelSet,
    threshold: f32,
) -> Result<Option<Classification>, ClassifyError> {
    if scores.len() != labels.len() {
        return Err(ClassifyError::InferenceError(format!(
            "model produced {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(ClassifyError::InferenceError(format!(
            "model produced non-finite score {} at index {index}",
            scores[index]
        )));
    }

    let Some((index, score)) = argmax(scores) else {
        return Ok(None);
    };
    if score <= threshold {
        return Ok(None);
    }

    let label = labels.get(index).ok_or_else(|| {
        ClassifyError::InferenceError(format!("no label for output index {index}"))
    })?;
    Ok(Some(Classification {
        label: label.to_string(),
        index,
        score,
    }))
}

/// Returns up to `k` `(label, score)` pairs, best first. Equal scores keep index order.
pub fn top_k<'a>(scores: &[f32], labels: &'a LabelSet, k: usize) -> Vec<(&'a str, f32)> {
    let mut ranked = labels.iter().zip(scores.iter().copied()).collect::<Vec<_>>();
    ranked.sort_by_key(|&(_, score)| Reverse(TotalF32(score)));
    ranked.truncate(k);
    ranked
}
