//! Worker-thread pipeline from detector events to letters.
//!
//! The landmark detector delivers its results asynchronously, on whatever thread it likes. The
//! [`Recognizer`] decouples that from classification: detector callbacks [`submit`] a
//! [`HandEvent`], and a dedicated worker thread that exclusively owns the [`Classifier`] turns it
//! into a [`Recognition`] for the UI.
//!
//! [`submit`]: Recognizer::submit

use std::io;

use pawawwewism::Worker;

use crate::{
    classifier::{Classification, Classifier},
    display::{Overlay, ScreenTransform},
    landmark::Landmark,
    timer::FpsCounter,
};

/// Events between progress log messages.
const LOG_EVERY: u64 = 30;

/// One detector result: the landmarks of every detected hand, in detector order.
#[derive(Debug, Clone, Default)]
pub struct HandEvent {
    hands: Vec<Vec<Landmark>>,
}

impl HandEvent {
    pub fn new(hands: Vec<Vec<Landmark>>) -> Self {
        Self { hands }
    }

    /// An event for a frame in which no hand was detected.
    pub fn no_hands() -> Self {
        Self::default()
    }

    /// An event with a single detected hand.
    pub fn single<I, L>(landmarks: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Landmark>,
    {
        Self {
            hands: vec![landmarks.into_iter().map(Into::into).collect()],
        }
    }

    pub fn hands(&self) -> &[Vec<Landmark>] {
        &self.hands
    }
}

/// The outcome of processing one [`HandEvent`].
#[derive(Debug, Clone)]
pub struct Recognition {
    sequence: u64,
    overlay: Overlay,
    classification: Option<Classification>,
}

impl Recognition {
    /// Zero-based position of the event in submission order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// What to draw. Empty if no hand was detected, which should clear the view.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// The recognized letter, if any.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.label())
    }
}

/// Synchronous per-event processing, shared by [`Recognizer`] and callers that want to run the
/// pipeline on their own thread.
pub struct Processor {
    classifier: Classifier,
    transform: ScreenTransform,
    events: u64,
}

impl Processor {
    pub fn new(classifier: Classifier, transform: ScreenTransform) -> Self {
        Self {
            classifier,
            transform,
            events: 0,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Processes one event.
    ///
    /// Only the first hand is drawn and classified. The overlay and the classifier each get
    /// their own view of the landmarks: the overlay is transformed to screen space, the
    /// classifier sees the raw detector output.
    pub fn process(&mut self, event: &HandEvent) -> Recognition {
        let sequence = self.events;
        self.events += 1;
        if self.events % LOG_EVERY == 0 {
            log::debug!("processed {} hand events", self.events);
        }

        let Some(hand) = event.hands.first() else {
            log::trace!("event {sequence}: no hand");
            return Recognition {
                sequence,
                overlay: Overlay::empty(),
                classification: None,
            };
        };

        let overlay = Overlay::project_points(hand, &self.transform);
        let classification = self.classifier.classify(hand);
        log::trace!(
            "event {sequence}: {} hand(s), letter {:?}",
            event.hands.len(),
            classification.as_ref().map(|c| c.label())
        );

        Recognition {
            sequence,
            overlay,
            classification,
        }
    }
}

/// Runs a [`Classifier`] on a worker thread.
///
/// Dropping the recognizer closes its channel and joins the worker after the pending events
/// have been processed. If the worker (or the sink) panicked, the panic is propagated.
pub struct Recognizer {
    worker: Worker<HandEvent>,
}

impl Recognizer {
    /// Spawns the worker thread.
    ///
    /// `sink` is called on the worker thread with the result of every submitted event, in
    /// submission order. UI code typically forwards it to its main thread from there.
    pub fn spawn<S>(
        classifier: Classifier,
        transform: ScreenTransform,
        mut sink: S,
    ) -> io::Result<Self>
    where
        S: FnMut(Recognition) + Send + 'static,
    {
        let mut processor = Processor::new(classifier, transform);
        let mut fps = FpsCounter::new("recognizer");

        let worker = Worker::builder()
            .name("recognizer")
            .spawn(move |event: HandEvent| {
                let recognition = processor.process(&event);
                sink(recognition);
                fps.tick_with([processor.classifier().timer()]);
            })?;

        Ok(Self { worker })
    }

    /// Hands an event to the worker.
    ///
    /// Blocks until the worker has accepted it, which happens once the previous event is done.
    pub fn submit(&mut self, event: HandEvent) {
        self.worker.send(event);
    }
}
