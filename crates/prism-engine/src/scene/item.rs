use thiserror::Error;

use crate::coords::{Point3, Pose};
use crate::paint::Color;

/// Depth comparison applied when the depth test is enabled.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Per-item depth override.
///
/// `enable` and `mask` only override a path default when `true`; `false` means
/// "use the path default". `compare` overrides when present.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DepthConfig {
    pub enable: bool,
    pub mask: bool,
    pub compare: Option<CompareFunc>,
}

/// One caller-supplied group of triangles sharing a pose and coloring mode.
///
/// Every consecutive triple of `points` is one triangle. When `colors` is
/// present and non-empty it holds one color per point and the item is drawn
/// with interpolated vertex colors; otherwise the whole item uses `color`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawItem {
    pub points: Vec<Point3>,
    pub color: Option<Color>,
    pub colors: Option<Vec<Color>>,
    pub pose: Option<Pose>,
    pub depth: Option<DepthConfig>,
}

/// Shading model a draw item is routed to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShadingPath {
    FlatColor,
    VertexColor,
}

impl ShadingPath {
    pub fn label(self) -> &'static str {
        match self {
            ShadingPath::FlatColor => "flat-color",
            ShadingPath::VertexColor => "vertex-color",
        }
    }
}

/// Why a draw item was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum InvalidItemReason {
    #[error("item has no points")]
    MissingPoints,

    #[error("{len} points is not a multiple of 3")]
    PointsNotTriangles { len: usize },

    #[error("{colors} vertex colors for {points} points")]
    ColorCountMismatch { points: usize, colors: usize },
}

impl DrawItem {
    pub fn new(points: impl Into<Vec<Point3>>) -> Self {
        Self {
            points: points.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_colors(mut self, colors: impl Into<Vec<Color>>) -> Self {
        self.colors = Some(colors.into());
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_depth(mut self, depth: DepthConfig) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Per-vertex colors, if any are present.
    #[inline]
    pub fn vertex_colors(&self) -> Option<&[Color]> {
        self.colors.as_deref().filter(|c| !c.is_empty())
    }

    /// Routing rule: non-empty `colors` selects the vertex-color path.
    #[inline]
    pub fn shading_path(&self) -> ShadingPath {
        if self.vertex_colors().is_some() {
            ShadingPath::VertexColor
        } else {
            ShadingPath::FlatColor
        }
    }

    /// Number of whole triangles described by `points`.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.points.len() / 3
    }

    pub fn validate(&self) -> Result<(), InvalidItemReason> {
        let len = self.points.len();
        if len == 0 {
            return Err(InvalidItemReason::MissingPoints);
        }
        if len % 3 != 0 {
            return Err(InvalidItemReason::PointsNotTriangles { len });
        }
        if let Some(colors) = self.vertex_colors() {
            if colors.len() != len {
                return Err(InvalidItemReason::ColorCountMismatch {
                    points: len,
                    colors: colors.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Vec<Point3> {
        vec![Point3::ZERO, Point3::X, Point3::Y]
    }

    #[test]
    fn empty_colors_do_not_select_vertex_path() {
        let item = DrawItem::new(tri())
            .with_color(Color::WHITE)
            .with_colors(Vec::<Color>::new());
        assert_eq!(item.shading_path(), ShadingPath::FlatColor);
        assert!(item.vertex_colors().is_none());
    }

    #[test]
    fn non_empty_colors_select_vertex_path() {
        let item = DrawItem::new(tri()).with_colors(vec![Color::WHITE; 3]);
        assert_eq!(item.shading_path(), ShadingPath::VertexColor);
    }

    #[test]
    fn validate_rejects_partial_triangles() {
        let item = DrawItem::new(vec![Point3::ZERO, Point3::X]);
        assert_eq!(
            item.validate(),
            Err(InvalidItemReason::PointsNotTriangles { len: 2 })
        );
    }

    #[test]
    fn validate_rejects_missing_points() {
        assert_eq!(
            DrawItem::default().validate(),
            Err(InvalidItemReason::MissingPoints)
        );
    }

    #[test]
    fn validate_rejects_color_count_mismatch() {
        let item = DrawItem::new(tri()).with_colors(vec![Color::WHITE; 2]);
        assert_eq!(
            item.validate(),
            Err(InvalidItemReason::ColorCountMismatch { points: 3, colors: 2 })
        );
    }

    #[test]
    fn triangle_count_floors() {
        let mut points = tri();
        points.extend(tri());
        assert_eq!(DrawItem::new(points).triangle_count(), 2);
    }

    #[test]
    fn rejection_reasons_read_as_messages() {
        let reason = InvalidItemReason::ColorCountMismatch { points: 3, colors: 2 };
        assert_eq!(reason.to_string(), "2 vertex colors for 3 points");
        assert_eq!(
            InvalidItemReason::PointsNotTriangles { len: 4 }.to_string(),
            "4 points is not a multiple of 3"
        );
    }
}
