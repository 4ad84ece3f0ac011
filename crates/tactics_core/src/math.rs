//! Fixed-point math utilities for deterministic decisions.
//!
//! Every distance, ratio and strength value the tactical core computes is
//! fixed-point. Feeding the same world snapshot through the decision pipeline
//! therefore produces bit-identical orders on every platform.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all tactical math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// π in `I32F32` (round(π · 2³²)).
pub const PI: Fixed = Fixed::from_bits(13_493_037_705);

/// π/2 in `I32F32`.
pub const FRAC_PI_2: Fixed = Fixed::from_bits(6_746_518_852);

/// 2π in `I32F32`.
pub const TAU: Fixed = Fixed::from_bits(26_986_075_409);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Config and scenario files are edited by hand, so values are written as
/// plain decimal numbers. Deserialization rounds to the nearest representable
/// fixed-point value and rejects out-of-range input.
pub mod fixed_serde {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_num::<f64>())
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(raw)
            .ok_or_else(|| D::Error::custom(format!("value {raw} is out of fixed-point range")))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Convenience constructor from integers.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Whether `other` lies within `radius` of this point (inclusive).
    #[must_use]
    pub fn is_within(self, other: Self, radius: Fixed) -> bool {
        if radius < Fixed::ZERO {
            return false;
        }
        self.distance_squared(other) <= radius.saturating_mul(radius)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.dot(self))
    }

    /// Scale by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }

    /// Point `distance` away from `self` in the direction of `target`.
    ///
    /// Returns `self` when the two points coincide.
    #[must_use]
    pub fn towards(self, target: Self, distance: Fixed) -> Self {
        self + (target - self).normalize().scale(distance)
    }

    /// Point `distance` away from `self`, directly away from `threat`.
    #[must_use]
    pub fn away_from(self, threat: Self, distance: Fixed) -> Self {
        self + (self - threat).normalize().scale(distance)
    }

    /// Unit vector for an angle in radians.
    #[must_use]
    pub fn from_angle(angle: Fixed) -> Self {
        Self::new(fixed_cos(angle), fixed_sin(angle))
    }

    /// Arithmetic mean of a set of points. Empty input yields the origin.
    #[must_use]
    pub fn centroid<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut sum_x = Fixed::ZERO;
        let mut sum_y = Fixed::ZERO;
        let mut count = 0i32;
        for p in points {
            sum_x += p.x;
            sum_y += p.y;
            count += 1;
        }
        if count == 0 {
            return Self::ZERO;
        }
        let n = Fixed::from_num(count);
        Self::new(sum_x / n, sum_y / n)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Cosine on `[0, π/2]` via a Horner-form Taylor series (error < 1e-6).
fn cos_first_quadrant(x: Fixed) -> Fixed {
    let x2 = x * x;
    let one = Fixed::ONE;
    let t = one - x2 / Fixed::from_num(90);
    let t = one - x2 / Fixed::from_num(56) * t;
    let t = one - x2 / Fixed::from_num(30) * t;
    let t = one - x2 / Fixed::from_num(12) * t;
    one - x2 / Fixed::from_num(2) * t
}

/// Deterministic fixed-point cosine.
#[must_use]
pub fn fixed_cos(angle: Fixed) -> Fixed {
    let mut x = angle % TAU;
    if x < Fixed::ZERO {
        x += TAU;
    }
    // cos is symmetric around π
    if x > PI {
        x = TAU - x;
    }
    if x > FRAC_PI_2 {
        -cos_first_quadrant(PI - x)
    } else {
        cos_first_quadrant(x)
    }
}

/// Deterministic fixed-point sine.
#[must_use]
pub fn fixed_sin(angle: Fixed) -> Fixed {
    fixed_cos(angle - FRAC_PI_2)
}

/// Smooth 0→1 curve `(1 − cos(π·f)) / 2` used to discount damaged units.
///
/// Inputs are clamped to `[0, 1]`; the endpoints are exact and the output is
/// clamped so it never leaves `[0, 1]`.
#[must_use]
pub fn cosine_falloff(fraction: Fixed) -> Fixed {
    if fraction <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    if fraction >= Fixed::ONE {
        return Fixed::ONE;
    }
    let value = (Fixed::ONE - fixed_cos(PI * fraction)) / Fixed::from_num(2);
    value.clamp(Fixed::ZERO, Fixed::ONE)
}

/// `numerator / denominator`, or `fallback` when the denominator is zero.
#[must_use]
pub fn ratio_or(numerator: Fixed, denominator: Fixed, fallback: Fixed) -> Fixed {
    if denominator == Fixed::ZERO {
        fallback
    } else {
        numerator / denominator
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epsilon() -> Fixed {
        Fixed::ONE / Fixed::from_num(10000)
    }

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
        assert!((a.distance(b) - Fixed::from_num(5)).abs() < epsilon());
    }

    #[test]
    fn test_is_within_inclusive() {
        let a = Vec2Fixed::from_ints(0, 0);
        let b = Vec2Fixed::from_ints(6, 8);
        assert!(a.is_within(b, Fixed::from_num(10)));
        assert!(!a.is_within(b, Fixed::from_num(9)));
        assert!(!a.is_within(a, Fixed::from_num(-1)));
    }

    #[test]
    fn test_vec2_normalize() {
        let norm = Vec2Fixed::from_ints(3, 4).normalize();
        let len_sq = norm.dot(norm);
        assert!((len_sq - Fixed::ONE).abs() < epsilon());
        assert_eq!(Vec2Fixed::ZERO.normalize(), Vec2Fixed::ZERO);
    }

    #[test]
    fn test_towards_and_away() {
        let origin = Vec2Fixed::from_ints(0, 0);
        let east = Vec2Fixed::from_ints(10, 0);
        let step = origin.towards(east, Fixed::from_num(2));
        assert!((step.x - Fixed::from_num(2)).abs() < epsilon());
        let back = origin.away_from(east, Fixed::from_num(2));
        assert!((back.x + Fixed::from_num(2)).abs() < epsilon());
    }

    #[test]
    fn test_cos_known_values() {
        assert_eq!(fixed_cos(Fixed::ZERO), Fixed::ONE);
        assert!((fixed_cos(PI) + Fixed::ONE).abs() < epsilon());
        assert!(fixed_cos(FRAC_PI_2).abs() < epsilon());
        assert!((fixed_cos(-PI) + Fixed::ONE).abs() < epsilon());
        assert!((fixed_sin(FRAC_PI_2) - Fixed::ONE).abs() < epsilon());
    }

    #[test]
    fn test_cosine_falloff_endpoints_and_midpoint() {
        assert_eq!(cosine_falloff(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(cosine_falloff(Fixed::ONE), Fixed::ONE);
        assert_eq!(cosine_falloff(Fixed::from_num(-3)), Fixed::ZERO);
        assert_eq!(cosine_falloff(Fixed::from_num(2)), Fixed::ONE);
        let half = cosine_falloff(Fixed::from_num(0.5));
        assert!((half - Fixed::from_num(0.5)).abs() < epsilon());
        // a quarter-health unit is worth well under a quarter
        assert!(cosine_falloff(Fixed::from_num(0.25)) < Fixed::from_num(0.25));
    }

    #[test]
    fn test_cosine_falloff_monotonic() {
        let mut previous = Fixed::ZERO;
        for step in 0..=100 {
            let value = cosine_falloff(Fixed::from_num(step) / Fixed::from_num(100));
            assert!(value >= previous, "curve decreased at step {step}");
            previous = value;
        }
    }

    #[test]
    fn test_ratio_or_guards_zero() {
        assert_eq!(
            ratio_or(Fixed::from_num(3), Fixed::ZERO, Fixed::ONE),
            Fixed::ONE
        );
        assert_eq!(
            ratio_or(Fixed::from_num(3), Fixed::from_num(2), Fixed::ONE),
            Fixed::from_num(1.5)
        );
    }

    #[test]
    fn test_centroid() {
        let c = Vec2Fixed::centroid([Vec2Fixed::from_ints(0, 0), Vec2Fixed::from_ints(4, 2)]);
        assert_eq!(c, Vec2Fixed::from_ints(2, 1));
        assert_eq!(Vec2Fixed::centroid(std::iter::empty()), Vec2Fixed::ZERO);
    }
}
