use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};

use fingerspell::{
    classifier::{Classifier, ClassifierOptions, ClassifierState},
    display::ScreenTransform,
    features::FeatureVector,
    labels::{LabelSet, NUM_LABELS},
    landmark::{Landmark, NUM_LANDMARKS},
    pipeline::{HandEvent, Recognition, Recognizer},
};

const TIMEOUT: Duration = Duration::from_secs(10);

/// A stand-in for the letter network: the score of label `i` is high iff the wrist's x
/// coordinate is `i / 100`.
fn wrist_model() -> Classifier {
    Classifier::with_model(
        |features: &FeatureVector| -> anyhow::Result<Vec<f32>> {
            let index = (features[0] * 100.0).round() as usize;
            let mut scores = vec![0.01; NUM_LABELS];
            if let Some(score) = scores.get_mut(index) {
                *score = 0.8;
            }
            Ok(scores)
        },
        ClassifierOptions::default(),
    )
}

fn hand_for(index: usize) -> Vec<Landmark> {
    let mut rng = fastrand::Rng::with_seed(index as u64);
    let mut hand = (0..NUM_LANDMARKS)
        .map(|_| Landmark::new(rng.f32(), rng.f32()))
        .collect::<Vec<_>>();
    hand[0] = Landmark::new(index as f32 / 100.0, 0.5);
    hand
}

fn spawn(classifier: Classifier) -> (Recognizer, mpsc::Receiver<Recognition>) {
    let (sender, receiver) = mpsc::channel();
    let recognizer = Recognizer::spawn(
        classifier,
        ScreenTransform::front_camera(720.0, 1280.0),
        move |rec| {
            sender.send(rec).ok();
        },
    )
    .unwrap();
    (recognizer, receiver)
}

#[test]
fn recognizes_events_in_order() {
    let (mut recognizer, results) = spawn(wrist_model());

    let letters = [0, 4, 20, 9];
    for &index in &letters {
        recognizer.submit(HandEvent::new(vec![hand_for(index)]));
    }
    recognizer.submit(HandEvent::no_hands());

    let labels = LabelSet::default();
    for (seq, &index) in letters.iter().enumerate() {
        let rec = results.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(rec.sequence(), seq as u64);
        assert_eq!(rec.label(), labels.get(index));
        assert_eq!(rec.overlay().points().len(), NUM_LANDMARKS);
    }

    let rec = results.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(rec.sequence(), letters.len() as u64);
    assert!(rec.overlay().is_empty());
    assert_eq!(rec.label(), None);

    drop(recognizer);
    assert!(results.recv_timeout(TIMEOUT).is_err());
}

#[test]
fn unavailable_model_still_draws() {
    let classifier = Classifier::new(ClassifierOptions::default().model_path("missing/model.onnx"));
    assert_eq!(classifier.state(), ClassifierState::Unavailable);

    let (mut recognizer, results) = spawn(classifier);
    for _ in 0..3 {
        recognizer.submit(HandEvent::new(vec![hand_for(2)]));
    }
    for _ in 0..3 {
        let rec = results.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(rec.label(), None);
        assert!(!rec.overlay().is_empty());
    }
}

#[test]
fn below_threshold_is_no_result() {
    let classifier = Classifier::with_model(
        |_: &FeatureVector| -> anyhow::Result<Vec<f32>> {
            let mut scores = vec![0.0; NUM_LABELS];
            scores[3] = 0.2;
            Ok(scores)
        },
        ClassifierOptions::default(),
    );
    let (mut recognizer, results) = spawn(classifier);
    recognizer.submit(HandEvent::new(vec![hand_for(3)]));
    assert_eq!(results.recv_timeout(TIMEOUT).unwrap().label(), None);
}

#[test]
fn shared_behind_mutex() {
    let classifier = Arc::new(Mutex::new(wrist_model()));

    let handles = (0..4)
        .map(|t| {
            let classifier = classifier.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let label = classifier
                        .lock()
                        .unwrap()
                        .classify(&hand_for(t))
                        .map(|c| c.index());
                    assert_eq!(label, Some(t));
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(classifier.lock().unwrap().timer().count(), 100);
}
