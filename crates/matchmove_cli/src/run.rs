// SPDX-License-Identifier: MIT OR Apache-2.0
//! Query execution.

use crate::cli::{Cli, Command};
use crate::output;
use matchmove_affects::{AffectsError, AffectsResult, ResolverConfig, ResolverSession, SparsityMap};
use matchmove_graph::{SceneError, SceneGraph};
use thiserror::Error;

/// Command-line errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Scene could not be loaded
    #[error("Failed to load scene: {0}")]
    Scene(#[from] SceneError),

    /// Query or configuration failed
    #[error(transparent)]
    Affects(#[from] AffectsError),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the scene and config, run the query and render its output
pub fn run(cli: &Cli) -> Result<String, CliError> {
    let scene = SceneGraph::load(&cli.scene)?;
    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    execute(&scene, config, &cli.command, cli.json)
}

/// Run a query against an already loaded scene
pub fn execute(
    scene: &SceneGraph,
    config: ResolverConfig,
    command: &Command,
    json: bool,
) -> Result<String, CliError> {
    let mut session = ResolverSession::with_config(scene, config)?;

    let text = match command {
        Command::Upstream { node } => {
            let closure = session.upstream_nodes(node)?;
            if json {
                serde_json::to_string_pretty(&output::closure_json(&closure))?
            } else {
                output::closure_text(&closure)
            }
        }
        Command::Frames { node, frames } => {
            let active = session.active_frames(node, frames)?;
            if json {
                serde_json::to_string(&active)?
            } else {
                output::frames_text(&active)
            }
        }
        Command::Transform { node, camera, frames } => {
            let result =
                session.find_plugs_affecting_transform(node, camera.as_deref(), frames.as_ref())?;
            render(&result, json)?
        }
        Command::Marker { marker, camera, frames } => {
            let result =
                session.find_plugs_affected_by_marker(marker, camera.as_deref(), frames.as_ref())?;
            render(&result, json)?
        }
        Command::Bundle {
            bundle,
            marker,
            cameras,
            frames,
        } => {
            let cameras: Vec<&str> = cameras.iter().map(String::as_str).collect();
            let result =
                session.find_plugs_affecting_bundle(bundle, marker, &cameras, frames.as_ref())?;
            render(&result, json)?
        }
        Command::Sparsity { pairs, frames } => {
            let pairs: Vec<(&str, Option<&str>)> = pairs
                .iter()
                .map(|(marker, camera)| (marker.as_str(), camera.as_deref()))
                .collect();
            let map = SparsityMap::build(&mut session, &pairs, frames.as_ref())?;
            if json {
                serde_json::to_string_pretty(&output::sparsity_json(&map))?
            } else {
                output::sparsity_text(&map)
            }
        }
    };

    for warning in session.take_warnings() {
        tracing::warn!("{warning}");
    }
    Ok(text)
}

fn render(result: &AffectsResult, json: bool) -> Result<String, CliError> {
    if json {
        Ok(serde_json::to_string_pretty(&output::result_json(result))?)
    } else {
        Ok(output::result_text(result))
    }
}
