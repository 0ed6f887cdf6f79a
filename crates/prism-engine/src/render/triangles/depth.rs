use crate::scene::{CompareFunc, DepthConfig, DrawItem};

/// Fully resolved depth configuration for one draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DepthState {
    pub enable: bool,
    pub mask: bool,
    pub compare: CompareFunc,
}

impl DepthState {
    /// Flat-color default: test but do not write, so coplanar flat triangles
    /// drawn in sequence never z-fight against each other.
    pub const FLAT_COLOR: Self = Self {
        enable: true,
        mask: false,
        compare: CompareFunc::Less,
    };

    /// Vertex-color default: write depth and compare with `<=` so later items
    /// at the same depth layer over earlier ones.
    pub const VERTEX_COLOR: Self = Self {
        enable: true,
        mask: true,
        compare: CompareFunc::LessEqual,
    };

    /// Applies an item override on top of a path default.
    ///
    /// `enable`/`mask` override only when `true`; a `false` or absent override
    /// keeps the default.
    pub fn with_override(self, over: Option<&DepthConfig>) -> Self {
        let Some(over) = over else { return self };
        Self {
            enable: over.enable || self.enable,
            mask: over.mask || self.mask,
            compare: over.compare.unwrap_or(self.compare),
        }
    }

    /// Depth state for a whole batch.
    ///
    /// Depth is fixed per draw call. When every item resolves to the same state
    /// that state is used; otherwise the batch falls back to `self` and the
    /// second element is `true`.
    pub fn for_batch<'a>(self, items: impl IntoIterator<Item = &'a DrawItem>) -> (Self, bool) {
        let mut resolved: Option<Self> = None;
        for item in items {
            let state = self.with_override(item.depth.as_ref());
            match resolved {
                None => resolved = Some(state),
                Some(prev) if prev != state => return (self, true),
                Some(_) => {}
            }
        }
        (resolved.unwrap_or(self), false)
    }

    pub fn to_wgpu(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        // A disabled depth test also disables depth writes.
        let (depth_write_enabled, depth_compare) = if self.enable {
            (self.mask, compare_to_wgpu(self.compare))
        } else {
            (false, wgpu::CompareFunction::Always)
        };
        wgpu::DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

fn compare_to_wgpu(f: CompareFunc) -> wgpu::CompareFunction {
    match f {
        CompareFunc::Never => wgpu::CompareFunction::Never,
        CompareFunc::Less => wgpu::CompareFunction::Less,
        CompareFunc::Equal => wgpu::CompareFunction::Equal,
        CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunc::Greater => wgpu::CompareFunction::Greater,
        CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunc::Always => wgpu::CompareFunction::Always,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point3;

    fn item(depth: Option<DepthConfig>) -> DrawItem {
        let mut item = DrawItem::new(vec![Point3::ZERO, Point3::X, Point3::Y]);
        item.depth = depth;
        item
    }

    #[test]
    fn path_defaults() {
        assert!(DepthState::FLAT_COLOR.enable);
        assert!(!DepthState::FLAT_COLOR.mask);
        assert_eq!(
            DepthState::VERTEX_COLOR,
            DepthState { enable: true, mask: true, compare: CompareFunc::LessEqual }
        );
    }

    #[test]
    fn truthy_mask_overrides_flat_default() {
        let over = DepthConfig { mask: true, ..Default::default() };
        let s = DepthState::FLAT_COLOR.with_override(Some(&over));
        assert!(s.mask);
        assert!(s.enable);
    }

    #[test]
    fn falsy_override_keeps_default() {
        // `enable: false` is not truthy, so it cannot switch the test off.
        let over = DepthConfig { enable: false, mask: false, compare: None };
        assert_eq!(DepthState::FLAT_COLOR.with_override(Some(&over)), DepthState::FLAT_COLOR);
        assert_eq!(DepthState::VERTEX_COLOR.with_override(Some(&over)), DepthState::VERTEX_COLOR);
        assert_eq!(DepthState::VERTEX_COLOR.with_override(None), DepthState::VERTEX_COLOR);
    }

    #[test]
    fn compare_override_applies() {
        let over = DepthConfig { compare: Some(CompareFunc::Always), ..Default::default() };
        assert_eq!(
            DepthState::FLAT_COLOR.with_override(Some(&over)).compare,
            CompareFunc::Always
        );
    }

    #[test]
    fn unanimous_override_applies_to_the_batch() {
        let over = DepthConfig { mask: true, ..Default::default() };
        let items = [item(Some(over)), item(Some(over))];
        let (state, mixed) = DepthState::FLAT_COLOR.for_batch(&items);
        assert!(!mixed);
        assert!(state.mask);
    }

    #[test]
    fn mixed_overrides_fall_back_to_path_default() {
        let over = DepthConfig { mask: true, ..Default::default() };
        let items = [item(Some(over)), item(None)];
        let (state, mixed) = DepthState::FLAT_COLOR.for_batch(&items);
        assert!(mixed);
        assert_eq!(state, DepthState::FLAT_COLOR);
    }

    #[test]
    fn override_equal_to_default_is_not_mixed() {
        let over = DepthConfig { enable: true, ..Default::default() };
        let items = [item(Some(over)), item(None)];
        assert_eq!(
            DepthState::FLAT_COLOR.for_batch(&items),
            (DepthState::FLAT_COLOR, false)
        );
    }

    #[test]
    fn disabled_test_maps_to_always_without_writes() {
        let s = DepthState { enable: false, mask: true, compare: CompareFunc::Less };
        let ds = s.to_wgpu(wgpu::TextureFormat::Depth32Float);
        assert!(!ds.depth_write_enabled);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn vertex_default_maps_to_less_equal_with_writes() {
        let ds = DepthState::VERTEX_COLOR.to_wgpu(wgpu::TextureFormat::Depth32Float);
        assert!(ds.depth_write_enabled);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::LessEqual);
    }
}
