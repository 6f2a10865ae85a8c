//! Classification through real ONNX networks.
//!
//! `data/x_scores.onnx` is a single `MatMul` whose score for label `i` is the x coordinate of
//! landmark `i`. `data/twenty_scores.onnx` is the same network with the last label removed.

use std::{fs, path::PathBuf};

use fingerspell::{
    classifier::{Classifier, ClassifierOptions, ClassifierState, ClassifyError, ScoreModel},
    features,
    landmark::{Landmark, NUM_LANDMARKS},
    nn::NeuralNetwork,
};

fn data(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data", name]
        .iter()
        .collect()
}

/// A hand whose landmark x coordinates are all `0.1`, except the given ones.
fn hand_with(raised: &[(usize, f32)]) -> Vec<Landmark> {
    let mut hand = vec![Landmark::new(0.1, 0.5); NUM_LANDMARKS];
    for &(i, x) in raised {
        hand[i] = Landmark::new(x, 0.5);
    }
    hand
}

fn x_scores() -> Classifier {
    let classifier = Classifier::new(ClassifierOptions::default().model_path(data("x_scores.onnx")));
    assert_eq!(
        classifier.state(),
        ClassifierState::Ready,
        "{:?}",
        classifier.unavailable_reason()
    );
    classifier
}

#[test]
fn network_shape() {
    let network = NeuralNetwork::from_path(data("x_scores.onnx"))
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(network.num_inputs(), 1);
    assert_eq!(network.num_outputs(), 1);

    let input = network.inputs().next().unwrap();
    assert_eq!(input.name(), "features");
    assert_eq!(input.shape(), Some(&[1, 42][..]));
    assert_eq!(network.outputs().next().unwrap().shape(), Some(&[1, 21][..]));
}

#[test]
fn raw_scores() {
    let mut network = NeuralNetwork::from_path(data("x_scores.onnx"))
        .unwrap()
        .load()
        .unwrap();
    let hand = hand_with(&[(5, 0.9)]);
    let scores = network.scores(&features::encode(&hand).unwrap()).unwrap();
    assert_eq!(scores.len(), 21);
    assert_eq!(scores[5], 0.9);
    assert_eq!(scores[0], 0.1);
}

#[test]
fn classifies() {
    let mut classifier = x_scores();
    let res = classifier.classify(&hand_with(&[(5, 0.9)])).unwrap();
    assert_eq!(res.label(), "F");
    assert_eq!(res.index(), 5);
    assert_eq!(res.score(), 0.9);

    let res = classifier.classify(&hand_with(&[(20, 0.75)])).unwrap();
    assert_eq!(res.label(), "Y");
    assert_eq!(classifier.timer().count(), 2);
}

#[test]
fn ties_and_threshold() {
    let mut classifier = x_scores();
    let res = classifier
        .classify(&hand_with(&[(3, 0.8), (9, 0.8)]))
        .unwrap();
    assert_eq!(res.label(), "D");

    assert_eq!(classifier.try_classify(&hand_with(&[(3, 0.7)])), Ok(None));
    assert_eq!(classifier.classify(&hand_with(&[])), None);
}

#[test]
fn wrong_landmark_count() {
    let mut classifier = x_scores();
    assert_eq!(
        classifier.try_classify(&hand_with(&[])[..20]),
        Err(ClassifyError::InvalidInputShape {
            expected: 21,
            actual: 20
        })
    );
    assert_eq!(classifier.state(), ClassifierState::Ready);
}

#[test]
fn wrong_output_shape_is_unavailable() {
    let options = ClassifierOptions::default().model_path(data("twenty_scores.onnx"));
    let err = Classifier::load(options.clone()).err().unwrap();
    assert!(matches!(err, ClassifyError::ModelUnavailable(_)), "{err}");
    assert!(err.to_string().contains("[1, 21]"), "{err}");

    let mut classifier = Classifier::new(options);
    assert_eq!(classifier.state(), ClassifierState::Unavailable);
    assert_eq!(classifier.classify(&hand_with(&[(5, 0.9)])), None);
}

#[test]
fn corrupt_model_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letters.onnx");
    fs::write(&path, b"\x08\x07 certainly not a protobuf graph").unwrap();

    let mut classifier = Classifier::new(ClassifierOptions::default().model_path(&path));
    assert_eq!(classifier.state(), ClassifierState::Unavailable);
    assert!(classifier
        .unavailable_reason()
        .unwrap()
        .contains("letters.onnx"));
    for _ in 0..3 {
        assert_eq!(classifier.classify(&hand_with(&[(5, 0.9)])), None);
    }
    assert_eq!(classifier.state(), ClassifierState::Unavailable);
}
