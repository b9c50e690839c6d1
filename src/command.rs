// src/command.rs
//
// Pure mapping from raw device input into the policy's command frame.
//
// The mapper applies asymmetric, sign-dependent per-axis scaling so that
// forward/back, left/right, and left/right-yaw command ranges may differ
// in magnitude, and derives a dead-zone "centered" flag from the raw
// sample's norm.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::types::{CommandVector, RawSample};

/// Raw-sample norm below which the command is considered centered.
pub const CENTERED_NORM_THRESHOLD: f64 = 0.01;

/// Asymmetric scale pair for one command axis.
///
/// `neg` scales negative raw input (applied to `|raw|`), `pos` scales
/// positive raw input. Both are plain multipliers; `neg` is conventionally
/// negative so that pulling the stick back yields a negative command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub neg: f64,
    pub pos: f64,
}

impl AxisRange {
    pub fn new(neg: f64, pos: f64) -> Self {
        Self { neg, pos }
    }

    /// Scale `raw` by the range selected from the sign of `key`.
    ///
    /// `key > 0` selects the positive scale applied to the signed value;
    /// otherwise the negative scale is applied to `|raw|`. For the common
    /// case the key is `raw` itself, which makes zero map to zero.
    pub fn scale_keyed(&self, raw: f64, key: f64) -> f64 {
        if key > 0.0 {
            self.pos * raw
        } else {
            self.neg * raw.abs()
        }
    }

    /// Scale `raw` keyed by its own sign.
    pub fn scale(&self, raw: f64) -> f64 {
        self.scale_keyed(raw, raw)
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        if !self.neg.is_finite() || !self.pos.is_finite() {
            return Err(ConfigError::InvalidAxisRange {
                axis,
                message: format!("scales must be finite, got ({}, {})", self.neg, self.pos),
            });
        }
        Ok(())
    }
}

/// Per-axis command scaling table. Immutable; set once at start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandRanges {
    /// Forward velocity range (m/s).
    pub vel_x: AxisRange,
    /// Lateral velocity range (m/s).
    pub vel_y: AxisRange,
    /// Yaw rate range (rad/s).
    pub yaw: AxisRange,
}

impl Default for CommandRanges {
    fn default() -> Self {
        Self {
            vel_x: AxisRange::new(-3.0, 3.0),
            vel_y: AxisRange::new(-2.0, 2.0),
            yaw: AxisRange::new(-3.0, 3.0),
        }
    }
}

impl CommandRanges {
    /// Fail fast on malformed ranges before the loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vel_x.validate("vel_x")?;
        self.vel_y.validate("vel_y")?;
        self.yaw.validate("yaw")?;
        Ok(())
    }
}

/// Map a raw device sample into a scaled command vector.
///
/// Pure and total: same sample + same ranges always produce the same
/// command, with no hidden state. This matters because the result
/// overwrites part of the policy's observation in place.
///
/// Compatibility quirk, preserved deliberately: the yaw axis selects its
/// scale from the sign of the **forward** component, not the yaw
/// component's own sign. Reproduces the reference controller bit-for-bit;
/// pinned by `yaw_scale_keys_off_forward_sign`.
pub fn map_command(raw: RawSample, ranges: &CommandRanges) -> CommandVector {
    let vel_x = ranges.vel_x.scale(raw.forward);
    let vel_y = ranges.vel_y.scale(raw.lateral);
    let yaw_rate = ranges.yaw.scale_keyed(raw.yaw, raw.forward);
    let centered = raw.norm() < CENTERED_NORM_THRESHOLD;

    CommandVector {
        vel_x,
        vel_y,
        yaw_rate,
        centered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> CommandRanges {
        CommandRanges::default()
    }

    #[test]
    fn test_positive_input_uses_positive_scale() {
        let cmd = map_command(RawSample::new(0.5, 0.25, 0.0), &ranges());
        assert!((cmd.vel_x - 1.5).abs() < 1e-12); // 3.0 * 0.5
        assert!((cmd.vel_y - 0.5).abs() < 1e-12); // 2.0 * 0.25
    }

    #[test]
    fn test_negative_input_uses_negative_scale_of_abs() {
        let cmd = map_command(RawSample::new(-0.5, -1.0, 0.0), &ranges());
        assert!((cmd.vel_x - (-1.5)).abs() < 1e-12); // -3.0 * 0.5
        assert!((cmd.vel_y - (-2.0)).abs() < 1e-12); // -2.0 * 1.0
    }

    #[test]
    fn test_zero_maps_to_zero() {
        let cmd = map_command(RawSample::ZERO, &ranges());
        assert_eq!(cmd.vel_x, 0.0);
        assert_eq!(cmd.vel_y, 0.0);
        assert_eq!(cmd.yaw_rate, 0.0);
    }

    #[test]
    fn yaw_scale_keys_off_forward_sign() {
        // Forward positive: positive yaw scale applied to the signed value.
        let cmd = map_command(RawSample::new(0.5, 0.0, -0.5), &ranges());
        assert!((cmd.yaw_rate - (-1.5)).abs() < 1e-12); // 3.0 * -0.5

        // Forward non-positive: negative yaw scale applied to |yaw|,
        // even for positive yaw input.
        let cmd = map_command(RawSample::new(-0.5, 0.0, 0.5), &ranges());
        assert!((cmd.yaw_rate - (-1.5)).abs() < 1e-12); // -3.0 * 0.5
    }

    #[test]
    fn test_centered_boundary_is_strict() {
        let just_under = map_command(RawSample::new(0.0099, 0.0, 0.0), &ranges());
        assert!(just_under.centered);

        // Exactly at the threshold is NOT centered.
        let exact = map_command(RawSample::new(0.01, 0.0, 0.0), &ranges());
        assert!(!exact.centered);

        let above = map_command(RawSample::new(0.1, 0.1, 0.1), &ranges());
        assert!(!above.centered);
    }

    #[test]
    fn test_mapper_is_total_outside_nominal_range() {
        let cmd = map_command(RawSample::new(2.0, -3.0, 10.0), &ranges());
        assert!(cmd.vel_x.is_finite());
        assert!(cmd.vel_y.is_finite());
        assert!(cmd.yaw_rate.is_finite());
    }

    #[test]
    fn test_range_validation_rejects_non_finite() {
        let mut r = ranges();
        r.vel_y = AxisRange::new(f64::NAN, 2.0);
        assert!(r.validate().is_err());

        let mut r = ranges();
        r.yaw = AxisRange::new(-3.0, f64::INFINITY);
        assert!(r.validate().is_err());

        assert!(ranges().validate().is_ok());
    }
}
