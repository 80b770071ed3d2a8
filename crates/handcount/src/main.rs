use std::{ops::ControlFlow, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use handcount::{
    pipeline::{self, FrameProcessor, ProcessorOptions},
    replay::Recording,
    source::SourceOptions,
};

/// Counts extended fingers in a recording of hand landmarks.
#[derive(Parser, Debug)]
#[command(name = "handcount", version)]
struct Cli {
    /// JSON-lines landmark recording, one frame per line.
    recording: PathBuf,
    /// Do not mirror the landmarks horizontally.
    #[arg(long)]
    no_mirror: bool,
    /// Label hands by their detected handedness instead of their slot.
    #[arg(long)]
    true_handedness: bool,
    /// Only process every N-th frame.
    #[arg(long, value_name = "N", default_value_t = 2)]
    frame_skip: u32,
    #[arg(long, value_name = "N", default_value_t = 2)]
    max_hands: usize,
    #[arg(long, value_name = "F", default_value_t = 0.85)]
    min_detection_confidence: f32,
}

fn main() -> anyhow::Result<()> {
    handcount::init_logger!();

    let cli = Cli::parse();

    let source_options = SourceOptions::default()
        .max_num_hands(cli.max_hands)
        .min_detection_confidence(cli.min_detection_confidence)
        .mirror(!cli.no_mirror);

    let recording = Recording::from_path(&cli.recording)
        .with_context(|| format!("failed to load {}", cli.recording.display()))?;
    let (mut camera, mut detector) = recording
        .into_parts(source_options)
        .context("invalid detector options")?;

    let mut processor = FrameProcessor::new(
        ProcessorOptions::default()
            .use_true_handedness(cli.true_handedness)
            .frame_skip(cli.frame_skip),
    );

    let summary = pipeline::run(&mut processor, &mut camera, &mut detector, |frame, report| {
        for hand in report.hands() {
            let (x_min, y_min, x_max, y_max) = hand.result().bounding_box().to_tuple();
            println!(
                "frame {}: {} [{x_min},{y_min} .. {x_max},{y_max}]",
                frame.index(),
                hand.overlay_text(),
            );
        }
        for err in report.rejected() {
            println!("frame {}: rejected: {err}", frame.index());
        }
        ControlFlow::Continue(())
    })?;

    println!(
        "{} frames read, {} processed, {} hands classified, {} rejected",
        summary.frames_read,
        summary.frames_processed,
        summary.hands_classified,
        summary.hands_rejected,
    );

    Ok(())
}
