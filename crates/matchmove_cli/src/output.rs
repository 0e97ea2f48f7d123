// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text and JSON rendering of query results.

use matchmove_affects::{AffectsResult, FrameSet, SparsityMap, UpstreamClosure};
use serde_json::{json, Map, Value};

/// One composite key per line
pub fn result_text(result: &AffectsResult) -> String {
    result.keys().join("\n")
}

/// Plug names as an array, or an object of plug name to frames
pub fn result_json(result: &AffectsResult) -> Value {
    match result {
        AffectsResult::Plugs(_) => json!(result.plug_names()),
        AffectsResult::Framed(map) => Value::Object(
            map.iter()
                .map(|(plug, frames)| (plug.to_string(), json!(frames)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

/// Sorted node paths, one per line
pub fn closure_text(closure: &UpstreamClosure) -> String {
    closure.nodes.join("\n")
}

/// Closure with traversal statistics
pub fn closure_json(closure: &UpstreamClosure) -> Value {
    json!({
        "nodes": closure.nodes,
        "iterations": closure.iterations,
        "pending": closure.pending,
    })
}

/// Comma-separated ascending frames
pub fn frames_text(frames: &FrameSet) -> String {
    frames
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// `marker: key` lines
pub fn sparsity_text(map: &SparsityMap) -> String {
    let mut lines = Vec::new();
    for marker in map.markers() {
        if let Some(result) = map.affects(marker) {
            lines.extend(result.keys().into_iter().map(|key| format!("{marker}: {key}")));
        }
    }
    lines.join("\n")
}

/// Per-marker results plus density
pub fn sparsity_json(map: &SparsityMap) -> Value {
    let markers: Map<String, Value> = map
        .markers()
        .filter_map(|marker| Some((marker.to_string(), result_json(map.affects(marker)?))))
        .collect();
    json!({
        "markers": markers,
        "density": map.density(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchmove_affects::PlugSetBuilder;
    use matchmove_graph::Plug;

    #[test]
    fn test_framed_json_is_keyed_by_plug() {
        let mut builder = PlugSetBuilder::new(true);
        let frames: FrameSet = [2, 1].into_iter().collect();
        builder.add(Plug::new("cam", "focalLength"), Some(&frames));
        let value = result_json(&builder.build());
        assert_eq!(value, json!({ "cam.focalLength": [1, 2] }));
    }

    #[test]
    fn test_unframed_text() {
        let mut builder = PlugSetBuilder::new(false);
        builder.add(Plug::new("b", "tx"), None);
        builder.add(Plug::new("a", "tx"), None);
        assert_eq!(result_text(&builder.build()), "a.tx\nb.tx");
    }

    #[test]
    fn test_frames_text() {
        let frames: FrameSet = [3, 1, 2].into_iter().collect();
        assert_eq!(frames_text(&frames), "1,2,3");
    }
}
