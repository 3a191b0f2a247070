use glam::Vec2;
use rand::Rng;

/// Inclusive pair of float bounds. Bounds are not required to be ordered.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const ZERO: Self = Self::new(0., 0.);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Uniform sample between the two bounds, whichever order they are in.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        let t: f32 = rng.gen();
        self.min + (self.max - self.min) * t
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn splat(value: i32) -> Self {
        Self::new(value, value)
    }

    /// Uniform sample over the closed interval spanned by the bounds.
    pub fn sample(&self, rng: &mut impl Rng) -> i32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        rng.gen_range(lo..=hi)
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]` in `0.0..=1.0`.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.)
    }
}

/// Linear interpolation from `from` to `to`. `fraction` is clamped to `[0, 1]`
/// and each channel is truncated back to a byte.
pub fn linear_fade(from: Color, to: Color, fraction: f32) -> Color {
    let fraction = if fraction.is_nan() {
        1.
    } else {
        fraction.clamp(0., 1.)
    };
    let channel = |a: u8, b: u8| ((b as f32 - a as f32) * fraction + a as f32) as u8;

    Color {
        r: channel(from.r, to.r),
        g: channel(from.g, to.g),
        b: channel(from.b, to.b),
        a: channel(from.a, to.a),
    }
}

/// Counter-clockwise rotation of `v` by `degrees`.
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}
