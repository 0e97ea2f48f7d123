// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::{Parser, Subcommand};
use matchmove_affects::{Frame, FrameSet};
use std::path::PathBuf;

/// Query which solvable attributes affect markers, bundles and transforms
#[derive(Debug, Parser)]
#[command(name = "matchmove-affects", version, about)]
pub struct Cli {
    /// Scene snapshot (RON)
    #[arg(long)]
    pub scene: PathBuf,

    /// Resolver configuration (RON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of one key per line
    #[arg(long)]
    pub json: bool,

    /// Query to run
    #[command(subcommand)]
    pub command: Command,
}

/// Queries
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Nodes upstream of a node
    Upstream {
        /// Root node
        node: String,
    },
    /// Frames on which a node is enabled
    Frames {
        /// Node with `enable`/`weight` attributes
        node: String,
        /// Frames to test, e.g. `1-10,15`
        #[arg(long, value_parser = parse_frames)]
        frames: FrameSet,
    },
    /// Plugs affecting a transform
    Transform {
        /// Target node
        node: String,
        /// Camera providing context
        #[arg(long)]
        camera: Option<String>,
        /// Frames, e.g. `1-10,15`
        #[arg(long, value_parser = parse_frames)]
        frames: Option<FrameSet>,
    },
    /// Plugs affected by a marker
    Marker {
        /// Marker node
        marker: String,
        /// Camera the marker belongs to
        #[arg(long)]
        camera: Option<String>,
        /// Frames, e.g. `1-10,15`
        #[arg(long, value_parser = parse_frames)]
        frames: Option<FrameSet>,
    },
    /// Plugs affecting a bundle as seen through a marker
    Bundle {
        /// Bundle node
        bundle: String,
        /// Marker node
        marker: String,
        /// Cameras providing context (repeatable)
        #[arg(long = "camera")]
        cameras: Vec<String>,
        /// Frames, e.g. `1-10,15`
        #[arg(long, value_parser = parse_frames)]
        frames: Option<FrameSet>,
    },
    /// Marker/plug sparsity map
    Sparsity {
        /// `marker` or `marker:camera` (repeatable)
        #[arg(long = "pair", value_parser = parse_pair, required = true)]
        pairs: Vec<(String, Option<String>)>,
        /// Frames, e.g. `1-10,15`
        #[arg(long, value_parser = parse_frames)]
        frames: Option<FrameSet>,
    },
}

/// Largest number of frames a single `--frames` list may name
pub const MAX_FRAMES: usize = 100_000;

/// Parse a frame list such as `1-4,7,-2`
pub fn parse_frames(text: &str) -> Result<FrameSet, String> {
    let mut frames = FrameSet::new();
    for part in text.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(format!("empty frame entry in '{text}'"));
        }
        // Skip a leading sign so `-3` and `-5--2` parse
        let dash = part
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i);
        match dash {
            Some(i) => {
                let start = parse_frame(&part[..i])?;
                let end = parse_frame(&part[i + 1..])?;
                if start > end {
                    return Err(format!("frame range {part} is reversed"));
                }
                let span = i64::from(end) - i64::from(start) + 1;
                if span > MAX_FRAMES as i64 {
                    return Err(format!("frame range {part} spans more than {MAX_FRAMES} frames"));
                }
                frames.extend(start..=end);
            }
            None => {
                frames.insert(parse_frame(part)?);
            }
        }
        if frames.len() > MAX_FRAMES {
            return Err(format!("frame list names more than {MAX_FRAMES} frames"));
        }
    }
    Ok(frames)
}

fn parse_frame(text: &str) -> Result<Frame, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("'{text}' is not a frame number"))
}

/// Parse `marker` or `marker:camera`
pub fn parse_pair(text: &str) -> Result<(String, Option<String>), String> {
    match text.split_once(':') {
        Some((marker, _)) if marker.is_empty() => Err(format!("missing marker in '{text}'")),
        Some((marker, camera)) if camera.is_empty() => Ok((marker.to_string(), None)),
        Some((marker, camera)) => Ok((marker.to_string(), Some(camera.to_string()))),
        None if text.is_empty() => Err("empty marker".to_string()),
        None => Ok((text.to_string(), None)),
    }
}
