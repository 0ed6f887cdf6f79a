//! Attribute resolution: turns draw items into tightly packed vertex data.
//!
//! Color precedence for the vertex-color path is
//! per-vertex `colors` > item `color` > path default. An empty `colors` list
//! never hides a valid `color`.

use crate::paint::{Color, ColorFormat};
use crate::scene::{DrawItem, InvalidItemReason};

use super::TriangleError;

/// Render-space positions of an item's points, in order.
pub fn resolve_points(item: &DrawItem) -> impl Iterator<Item = [f32; 3]> + '_ {
    let pose = item.pose.unwrap_or_default();
    item.points.iter().map(move |p| pose.apply(*p).to_array())
}

/// Per-item uniform color for the flat-color path.
pub fn resolve_flat_color(
    index: usize,
    item: &DrawItem,
    default: Color,
    warnings: &mut Vec<TriangleError>,
) -> [f32; 4] {
    let (rgba, format) = item.color.unwrap_or(default).resolve();
    if format == ColorFormat::Ambiguous {
        warnings.push(ambiguous(index, None, item.color.unwrap_or(default)));
    }
    rgba
}

/// One color per vertex for the vertex-color path.
///
/// The `[0, 1]` / `[0, 255]` format is detected once over all of the item's
/// colors. Only the first ambiguous color of an item is reported.
pub fn resolve_vertex_colors(
    index: usize,
    item: &DrawItem,
    default: Color,
    warnings: &mut Vec<TriangleError>,
) -> Result<Vec<[f32; 4]>, InvalidItemReason> {
    let count = item.points.len();

    let Some(colors) = item.vertex_colors() else {
        let rgba = resolve_flat_color(index, item, default, warnings);
        return Ok(vec![rgba; count]);
    };

    if colors.len() != count {
        return Err(InvalidItemReason::ColorCountMismatch {
            points: count,
            colors: colors.len(),
        });
    }

    // One format for the whole item so a gradient is never read two ways.
    let group = ColorFormat::detect(colors.iter().copied());
    let mut reported = false;
    let resolved = colors
        .iter()
        .enumerate()
        .map(|(vertex, c)| {
            if group != ColorFormat::Ambiguous {
                return c.resolve_as(group);
            }
            // Mixed garbage: each color falls back to its own reading.
            let (rgba, format) = c.resolve();
            if format == ColorFormat::Ambiguous && !reported {
                warnings.push(ambiguous(index, Some(vertex), *c));
                reported = true;
            }
            rgba
        })
        .collect();

    Ok(resolved)
}

fn ambiguous(index: usize, vertex: Option<usize>, c: Color) -> TriangleError {
    TriangleError::ColorFormatAmbiguous {
        index,
        vertex,
        channels: c.channels(),
    }
}
