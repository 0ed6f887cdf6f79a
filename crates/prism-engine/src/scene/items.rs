use super::DrawItem;

/// Borrowed per-frame input: one draw item or an ordered sequence of them.
///
/// A single item is treated exactly like a one-element sequence.
#[derive(Debug, Copy, Clone)]
pub struct DrawItems<'a>(&'a [DrawItem]);

impl<'a> DrawItems<'a> {
    #[inline]
    pub fn as_slice(&self) -> &'a [DrawItem] {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a DrawItem> for DrawItems<'a> {
    #[inline]
    fn from(item: &'a DrawItem) -> Self {
        Self(std::slice::from_ref(item))
    }
}

impl<'a> From<&'a [DrawItem]> for DrawItems<'a> {
    #[inline]
    fn from(items: &'a [DrawItem]) -> Self {
        Self(items)
    }
}

impl<'a> From<&'a Vec<DrawItem>> for DrawItems<'a> {
    #[inline]
    fn from(items: &'a Vec<DrawItem>) -> Self {
        Self(items.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [DrawItem; N]> for DrawItems<'a> {
    #[inline]
    fn from(items: &'a [DrawItem; N]) -> Self {
        Self(items.as_slice())
    }
}
