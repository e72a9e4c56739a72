//! Configuration for the particle field.
//!
//! A [`VortexConfig`] is supplied once when the engine is built and stays
//! immutable for the engine's lifetime. Every knob has a default, so
//! `VortexConfig::default()` reproduces the stock look: 700 blue-violet
//! particles swirling out of a horizontal band at mid-screen.
//!
//! # Example
//!
//! ```ignore
//! use vortex::VortexConfig;
//!
//! let config = VortexConfig::default()
//!     .with_particle_count(400)
//!     .with_base_hue(120.0)
//!     .with_background("#020308");
//! vortex::run(config)?;
//! ```

use crate::error::ConfigError;

/// Configuration for a particle field renderer.
///
/// Spawn values are randomized per particle as `base + rand(range)` where
/// `rand(n)` is uniform over `[0, n)`; the vertical spawn offset uses the
/// symmetric distribution instead (see [`crate::SpawnContext`]).
#[derive(Clone, Debug)]
pub struct VortexConfig {
    /// Number of concurrently simulated particles.
    pub particle_count: usize,

    /// Half-range of the initial vertical offset from the canvas center,
    /// in pixels. Particles spawn inside a horizontal band of height
    /// `2 * range_y` centered on the screen.
    pub range_y: f32,

    /// Minimum particle lifetime, in frames.
    pub base_ttl: f32,
    /// Added random lifetime range, in frames.
    pub range_ttl: f32,

    /// Minimum per-frame speed multiplier.
    pub base_speed: f32,
    /// Added random speed range.
    pub range_speed: f32,

    /// Minimum stroke width, in pixels.
    pub base_radius: f32,
    /// Added random stroke width range.
    pub range_radius: f32,

    /// Minimum hue, in degrees (220 = blue).
    pub base_hue: f32,
    /// Added random hue range, in degrees.
    pub range_hue: f32,

    /// How many full rotations the steering angle can sweep across the
    /// noise field's [-1, 1] output. Values above 1 fold the flow back on
    /// itself, producing swirls rather than laminar drift.
    pub noise_steps: f32,

    /// Spatial noise frequency along x.
    pub x_off: f64,
    /// Spatial noise frequency along y.
    pub y_off: f64,
    /// Temporal noise frequency (per tick).
    pub z_off: f64,

    /// Background fill color, as `#rgb` or `#rrggbb` hex.
    pub background: String,
}

impl Default for VortexConfig {
    fn default() -> Self {
        Self {
            particle_count: 700,
            range_y: 100.0,
            base_ttl: 50.0,
            range_ttl: 150.0,
            base_speed: 0.0,
            range_speed: 1.5,
            base_radius: 1.0,
            range_radius: 2.0,
            base_hue: 220.0,
            range_hue: 100.0,
            noise_steps: 3.0,
            x_off: 0.00125,
            y_off: 0.00125,
            z_off: 0.00025,
            background: "#000000".to_string(),
        }
    }
}

impl VortexConfig {
    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the vertical spawn half-spread in pixels.
    pub fn with_range_y(mut self, range_y: f32) -> Self {
        self.range_y = range_y;
        self
    }

    /// Set the lifetime range in frames (`ttl = base + rand(range)`).
    pub fn with_ttl(mut self, base: f32, range: f32) -> Self {
        self.base_ttl = base;
        self.range_ttl = range;
        self
    }

    /// Set the speed range (`speed = base + rand(range)`).
    pub fn with_speed(mut self, base: f32, range: f32) -> Self {
        self.base_speed = base;
        self.range_speed = range;
        self
    }

    /// Set the stroke width range in pixels (`radius = base + rand(range)`).
    pub fn with_radius(mut self, base: f32, range: f32) -> Self {
        self.base_radius = base;
        self.range_radius = range;
        self
    }

    /// Set the minimum hue in degrees, keeping the configured hue range.
    pub fn with_base_hue(mut self, base_hue: f32) -> Self {
        self.base_hue = base_hue;
        self
    }

    /// Set the added random hue range in degrees.
    pub fn with_range_hue(mut self, range_hue: f32) -> Self {
        self.range_hue = range_hue;
        self
    }

    /// Set the background fill color from a `#rgb`/`#rrggbb` hex string.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Parse the configured background color into linear RGBA.
    ///
    /// Fails with [`ConfigError::InvalidColor`] on malformed input; call
    /// this before opening a window to reject bad configs early.
    pub fn background_color(&self) -> Result<[f64; 4], ConfigError> {
        parse_hex_color(&self.background)
    }
}

/// Parse a `#rgb` or `#rrggbb` hex string into linear-space RGBA.
pub fn parse_hex_color(s: &str) -> Result<[f64; 4], ConfigError> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.is_ascii())
        .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))?;

    let channel = |hex: &str| -> Result<f64, ConfigError> {
        u8::from_str_radix(hex, 16)
            .map(|v| srgb_to_linear(v as f64 / 255.0))
            .map_err(|_| ConfigError::InvalidColor(s.to_string()))
    };

    let (r, g, b) = match digits.len() {
        // #rgb shorthand: each digit doubled
        3 => {
            let expand = |i: usize| {
                let d = &digits[i..i + 1];
                channel(&format!("{d}{d}"))
            };
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ),
        _ => return Err(ConfigError::InvalidColor(s.to_string())),
    };

    Ok([r, g, b, 1.0])
}

/// Convert one sRGB channel to linear space.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_look() {
        let config = VortexConfig::default();
        assert_eq!(config.particle_count, 700);
        assert_eq!(config.range_y, 100.0);
        assert_eq!(config.base_hue, 220.0);
        assert_eq!(config.background, "#000000");
    }

    #[test]
    fn test_builder_chain() {
        let config = VortexConfig::default()
            .with_particle_count(10)
            .with_base_hue(60.0)
            .with_background("#112233");
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.base_hue, 60.0);
        assert_eq!(config.background, "#112233");
    }

    #[test]
    fn test_parse_black_and_white() {
        assert_eq!(parse_hex_color("#000000").unwrap(), [0.0, 0.0, 0.0, 1.0]);
        let white = parse_hex_color("#ffffff").unwrap();
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_shorthand_matches_full() {
        let short = parse_hex_color("#1af").unwrap();
        let full = parse_hex_color("#11aaff").unwrap();
        assert_eq!(short, full);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["000000", "#12345", "#gggggg", "#", "blue"] {
            assert!(parse_hex_color(bad).is_err(), "{bad} should be rejected");
        }
    }
}
