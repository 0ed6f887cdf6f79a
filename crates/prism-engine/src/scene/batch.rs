use super::{DrawItem, DrawItems, InvalidItemReason, ShadingPath};

/// Items routed to one shading path for one draw call, in input order.
///
/// Each entry keeps the item's index in the frame input so diagnostics can
/// point back at the caller's data.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    pub path: ShadingPath,
    pub items: Vec<(usize, &'a DrawItem)>,
}

impl<'a> Batch<'a> {
    fn new(path: ShadingPath) -> Self {
        Self { path, items: Vec::new() }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Raw vertex count: every point is one vertex of a triangle list.
    pub fn vertex_count(&self) -> usize {
        self.items.iter().map(|(_, item)| item.points.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a DrawItem> + '_ {
        self.items.iter().map(|(_, item)| *item)
    }
}

/// Result of splitting one frame's input between the two shading paths.
///
/// Every input index ends up in exactly one of `flat`, `vertex` or `rejected`.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub flat: Batch<'a>,
    pub vertex: Batch<'a>,
    pub rejected: Vec<(usize, InvalidItemReason)>,
}

/// Validates and classifies `items`, preserving input order within each batch.
pub fn partition<'a>(items: impl Into<DrawItems<'a>>) -> Partition<'a> {
    let items = items.into();
    let mut flat = Batch::new(ShadingPath::FlatColor);
    let mut vertex = Batch::new(ShadingPath::VertexColor);
    let mut rejected = Vec::new();

    for (index, item) in items.as_slice().iter().enumerate() {
        if let Err(reason) = item.validate() {
            rejected.push((index, reason));
            continue;
        }
        match item.shading_path() {
            ShadingPath::FlatColor => flat.items.push((index, item)),
            ShadingPath::VertexColor => vertex.items.push((index, item)),
        }
    }

    Partition { flat, vertex, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point3;
    use crate::paint::Color;

    fn tri(z: f32) -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    fn flat(z: f32) -> DrawItem {
        DrawItem::new(tri(z)).with_color(Color::WHITE)
    }

    fn colored(z: f32) -> DrawItem {
        DrawItem::new(tri(z)).with_colors(vec![Color::BLACK; 3])
    }

    fn indices(batch: &Batch<'_>) -> Vec<usize> {
        batch.items.iter().map(|(i, _)| *i).collect()
    }

    #[test]
    fn partition_is_total_and_order_preserving() {
        let items = vec![
            flat(0.0),
            colored(1.0),
            flat(2.0),
            DrawItem::new(vec![Point3::ZERO]),
            colored(3.0),
            flat(4.0),
        ];
        let p = partition(&items);

        assert_eq!(indices(&p.flat), vec![0, 2, 5]);
        assert_eq!(indices(&p.vertex), vec![1, 4]);
        assert_eq!(p.rejected.len(), 1);
        assert_eq!(p.rejected[0].0, 3);

        let mut seen: Vec<usize> = indices(&p.flat);
        seen.extend(indices(&p.vertex));
        seen.extend(p.rejected.iter().map(|(i, _)| *i));
        seen.sort_unstable();
        assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
    }

    #[test]
    fn mismatched_colors_are_excluded_from_both_batches() {
        let items = vec![DrawItem::new(tri(0.0)).with_colors(vec![Color::WHITE; 4]), flat(1.0)];
        let p = partition(&items);

        assert_eq!(indices(&p.flat), vec![1]);
        assert!(p.vertex.is_empty());
        assert_eq!(
            p.rejected,
            vec![(0, InvalidItemReason::ColorCountMismatch { points: 3, colors: 4 })]
        );
    }

    #[test]
    fn single_item_matches_one_element_sequence() {
        let item = colored(0.0);
        let one = [item.clone()];

        let a = partition(&item);
        let b = partition(&one);

        assert_eq!(indices(&a.vertex), indices(&b.vertex));
        assert_eq!(indices(&a.flat), indices(&b.flat));
        assert_eq!(a.vertex.iter().next(), b.vertex.iter().next());
    }

    #[test]
    fn vertex_count_is_raw_point_count() {
        let items = vec![flat(0.0), DrawItem::new([tri(1.0), tri(2.0)].concat())];
        let p = partition(&items);
        assert_eq!(p.flat.vertex_count(), 9);
    }
}
