use crate::foundation::error::{ImprintError, ImprintResult};

pub use kurbo::{Point, Rect, RoundedRect, Vec2};

/// Absolute device-pixel rectangle describing a node's render bounds.
///
/// Frames are immutable values: a node derives the frame it exposes to its children from its
/// parent's frame, never the other way round.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Absolute left edge.
    pub x: f64,
    /// Absolute top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Frame {
    /// Build a frame from its components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The root frame of a scene: `{0, 0, width, height}`.
    pub fn root(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    /// Absolute origin of a child declared at parent-relative `(dx, dy)`.
    pub fn origin_offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Frame as a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Frame as a rounded rectangle with elliptical corner radii `(rx, ry)`.
    ///
    /// `kurbo` only models circular corners, so the smaller radius is used when they differ.
    pub fn to_rounded_rect(self, radius: CornerRadius) -> RoundedRect {
        RoundedRect::from_rect(self.to_rect(), radius.uniform())
    }
}

/// A declared length: absolute pixels or a percentage of the parent's matching dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage (`50.0` means half) of the parent dimension.
    Percent(f64),
}

impl Length {
    /// Resolve against the parent's dimension along the same axis.
    ///
    /// Non-finite results and non-positive parent dimensions collapse to `0.0`.
    pub fn resolve(self, parent: f64) -> f64 {
        let v = match self {
            Self::Px(px) => px,
            Self::Percent(p) => {
                if !parent.is_finite() || parent <= 0.0 {
                    return 0.0;
                }
                (p / 100.0) * parent
            }
        };
        if v.is_finite() { v.max(0.0) } else { 0.0 }
    }

    /// Parse `"<number>%"`.
    pub fn parse_percent(s: &str) -> ImprintResult<Self> {
        let body = s
            .trim()
            .strip_suffix('%')
            .ok_or_else(|| ImprintError::validation(format!("invalid percentage '{s}'")))?;
        let p: f64 = body
            .trim()
            .parse()
            .map_err(|_| ImprintError::validation(format!("invalid percentage '{s}'")))?;
        if !p.is_finite() {
            return Err(ImprintError::validation(format!("invalid percentage '{s}'")));
        }
        Ok(Self::Percent(p))
    }

    /// `100%`.
    pub fn full() -> Self {
        Self::Percent(100.0)
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::full()
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Self::Px(v)
    }
}

impl From<u32> for Length {
    fn from(v: u32) -> Self {
        Self::Px(f64::from(v))
    }
}

impl std::str::FromStr for Length {
    type Err = ImprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_percent(s)
    }
}

impl<'de> serde::Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Px(f64),
            Percent(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Px(v) => Ok(Self::Px(v)),
            Repr::Percent(s) => Self::parse_percent(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Corner radius: a single value or an `(rx, ry)` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadius {
    /// Horizontal radius.
    pub rx: f64,
    /// Vertical radius.
    pub ry: f64,
}

impl CornerRadius {
    /// Same radius on both axes.
    pub fn all(r: f64) -> Self {
        Self { rx: r, ry: r }
    }

    fn uniform(self) -> f64 {
        self.rx.min(self.ry).max(0.0)
    }

    /// `true` when no rounding is applied.
    pub fn is_zero(self) -> bool {
        self.uniform() <= 0.0
    }
}

impl From<f64> for CornerRadius {
    fn from(r: f64) -> Self {
        Self::all(r)
    }
}

impl<'de> serde::Deserialize<'de> for CornerRadius {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(f64),
            Pair([f64; 2]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::One(r) => Ok(Self::all(r)),
            Repr::Pair([rx, ry]) => Ok(Self { rx, ry }),
        }
    }
}

/// Straight-alpha RGBA8 colour.
///
/// Serializes as `#rrggbbaa`, which the colour parser reads back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Build a colour from straight RGBA8 components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Convert into premultiplied components.
    pub fn premultiplied(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
