//! Classifies recorded hand landmarks.
//!
//! Usage: `fingerspell <model.onnx> <landmarks.txt> [threshold]`
//!
//! Every non-empty line of `landmarks.txt` holds the 42 whitespace-separated coordinates of one
//! hand (`x0 y0 x1 y1 ... x20 y20`). Lines starting with `#` are ignored. For each hand, the
//! recognized letter and its score are printed, or `-` if there is no confident result.

use std::{env, fs, process};

use anyhow::Context;
use fingerspell::{
    classifier::{Classifier, ClassifierOptions, DEFAULT_THRESHOLD},
    landmark::Landmark,
};

fn main() -> anyhow::Result<()> {
    fingerspell::init_logger!();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let (model, landmarks, threshold) = match args.as_slice() {
        [model, landmarks] => (model, landmarks, DEFAULT_THRESHOLD),
        [model, landmarks, threshold] => {
            let threshold: f32 = threshold
                .parse()
                .with_context(|| format!("invalid threshold '{threshold}'"))?;
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("threshold must be in [0, 1], got {threshold}");
            }
            (model, landmarks, threshold)
        }
        _ => {
            eprintln!("usage: fingerspell <model.onnx> <landmarks.txt> [threshold]");
            process::exit(2);
        }
    };

    let options = ClassifierOptions::default()
        .model_path(model)
        .threshold(threshold);
    let mut classifier = Classifier::load(options)?;

    let text = fs::read_to_string(landmarks)
        .with_context(|| format!("failed to read landmarks from '{landmarks}'"))?;
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let location = || format!("{landmarks}:{}", line_no + 1);
        let hand = parse_hand(line).with_context(location)?;
        match classifier.try_classify(&hand).with_context(location)? {
            Some(c) => println!("{}\t{:.3}", c.label(), c.score()),
            None => println!("-"),
        }
    }

    log::debug!("{}", classifier.timer());
    Ok(())
}

fn parse_hand(line: &str) -> anyhow::Result<Vec<Landmark>> {
    let coords = line
        .split_whitespace()
        .map(|v| {
            v.parse::<f32>()
                .with_context(|| format!("invalid coordinate '{v}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    if coords.len() % 2 != 0 {
        anyhow::bail!("odd number of coordinates ({})", coords.len());
    }
    Ok(coords
        .chunks_exact(2)
        .map(|xy| Landmark::new(xy[0], xy[1]))
        .collect())
}
