/// RGBA color as supplied by callers.
///
/// Channels are stored exactly as given. Callers may use either the normalized
/// `[0, 1]` range or the byte `[0, 255]` range; the representation is detected
/// right before GPU upload.
///
/// Detection rule:
/// - every channel finite and within `[0, 1]` → normalized, used as-is
/// - every channel finite and within `[0, 255]`, at least one above `1` → byte,
///   each channel divided by `255`
/// - anything else (negative, above `255`, NaN/inf) → ambiguous, treated as
///   normalized and clamped to `[0, 1]` (non-finite channels become `0`)
///
/// Colors that belong together (one item's per-vertex `colors`) are detected as
/// a group with [`ColorFormat::detect`]: if any of them has a channel above `1`
/// and none is ambiguous, every color of the group is divided by `255`, so a
/// byte-range `[1, 1, 1, 1]` next to `[255, 255, 255, 255]` stays near black.
/// A lone byte color whose channels all happen to be `<= 1` is read as
/// normalized; [`Color::from_rgba8`] normalizes at construction and avoids that.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Channel representation detected for a [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorFormat {
    Normalized,
    Byte,
    Ambiguous,
}

impl ColorFormat {
    /// Detects one format for a group of colors.
    ///
    /// Any ambiguous color makes the group ambiguous; otherwise any byte color
    /// makes it byte-range. An empty group is normalized.
    pub fn detect(colors: impl IntoIterator<Item = Color>) -> Self {
        colors
            .into_iter()
            .map(Color::format)
            .fold(ColorFormat::Normalized, |acc, f| match (acc, f) {
                (ColorFormat::Ambiguous, _) | (_, ColorFormat::Ambiguous) => ColorFormat::Ambiguous,
                (ColorFormat::Byte, _) | (_, ColorFormat::Byte) => ColorFormat::Byte,
                _ => ColorFormat::Normalized,
            })
    }
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a normalized color from straight-alpha bytes.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    #[inline]
    pub fn channels(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn format(self) -> ColorFormat {
        let ch = self.channels();
        if ch.iter().any(|c| !c.is_finite() || *c < 0.0 || *c > 255.0) {
            ColorFormat::Ambiguous
        } else if ch.iter().all(|c| *c <= 1.0) {
            ColorFormat::Normalized
        } else {
            ColorFormat::Byte
        }
    }

    /// Returns normalized straight-alpha channels ready for upload, along with
    /// the detected input format.
    ///
    /// Resolving an already-resolved color is a no-op, so double conversion
    /// cannot happen.
    pub fn resolve(self) -> ([f32; 4], ColorFormat) {
        let format = self.format();
        (self.resolve_as(format), format)
    }

    /// Normalizes channels as `format`, usually detected for a whole group.
    pub fn resolve_as(self, format: ColorFormat) -> [f32; 4] {
        let ch = self.channels();
        match format {
            ColorFormat::Normalized => ch,
            ColorFormat::Byte => ch.map(|c| c / 255.0),
            ColorFormat::Ambiguous => ch.map(|c| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 }),
        }
    }
}

impl From<[f32; 4]> for Color {
    #[inline]
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<[u8; 4]> for Color {
    #[inline]
    fn from(c: [u8; 4]) -> Self {
        Self::from_rgba8(c[0], c[1], c[2], c[3])
    }
}
