//! Scalar-to-colour mapping used to heat-map vertex displacement.
//!
//! Every base gradient is a closed-form function of `t` in `[0, 1]`. Segment
//! boundaries are half-open (`[a, b)`) except for the last segment, which
//! includes `1.0`. The symmetric variant folds the input around `0.5` first,
//! so the midpoint maps to the base gradient's start colour and both ends map
//! to its end colour.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModalVizError;

/// Linear RGB triple with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// The six base gradient functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientBase {
    /// Blue -> green -> yellow -> red.
    #[default]
    Classic,
    /// Black -> red -> yellow -> white.
    Thermal,
    /// HSV hue sweep from red to magenta.
    Rainbow,
    /// Dark to bright blue.
    Monochrome,
    /// Deep blue -> cyan -> light green -> white.
    Ocean,
    /// Black -> dark red -> red -> orange -> yellow -> white.
    Fire,
}

impl GradientBase {
    pub const ALL: [GradientBase; 6] = [
        GradientBase::Classic,
        GradientBase::Thermal,
        GradientBase::Rainbow,
        GradientBase::Monochrome,
        GradientBase::Ocean,
        GradientBase::Fire,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Thermal => "thermal",
            Self::Rainbow => "rainbow",
            Self::Monochrome => "monochrome",
            Self::Ocean => "ocean",
            Self::Fire => "fire",
        }
    }

    /// Maps `t` to a colour without folding. `t` is clamped to `[0, 1]`.
    pub fn color_at(self, t: f32) -> Rgb {
        let t = clamp_unit(t);
        match self {
            Self::Classic => classic(t),
            Self::Thermal => thermal(t),
            Self::Rainbow => rainbow(t),
            Self::Monochrome => monochrome(t),
            Self::Ocean => ocean(t),
            Self::Fire => fire(t),
        }
    }
}

impl fmt::Display for GradientBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GradientBase {
    type Err = ModalVizError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|base| base.name() == wanted)
            .ok_or_else(|| ModalVizError::msg(format!("unknown gradient `{value}`")))
    }
}

/// A base gradient plus the symmetric-fold flag. Compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GradientSelection {
    pub base: GradientBase,
    #[serde(default)]
    pub symmetric: bool,
}

impl GradientSelection {
    pub const CLASSIC: Self = Self::new(GradientBase::Classic);
    pub const THERMAL: Self = Self::new(GradientBase::Thermal);
    pub const RAINBOW: Self = Self::new(GradientBase::Rainbow);
    pub const MONOCHROME: Self = Self::new(GradientBase::Monochrome);
    pub const OCEAN: Self = Self::new(GradientBase::Ocean);
    pub const FIRE: Self = Self::new(GradientBase::Fire);

    pub const fn new(base: GradientBase) -> Self {
        Self {
            base,
            symmetric: false,
        }
    }

    pub const fn symmetric(base: GradientBase) -> Self {
        Self {
            base,
            symmetric: true,
        }
    }

    /// Maps `t` in `[0, 1]` to a colour, folding around the midpoint first when
    /// the selection is symmetric.
    pub fn evaluate(self, t: f32) -> Rgb {
        let t = clamp_unit(t);
        let t = if self.symmetric {
            (t - 0.5).abs() * 2.0
        } else {
            t
        };
        self.base.color_at(t)
    }
}

impl fmt::Display for GradientSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symmetric {
            write!(f, "{} (symmetric)", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn classic(t: f32) -> Rgb {
    if t < 0.33 {
        let ratio = t / 0.33;
        Rgb::new(0.0, ratio, 1.0 - ratio)
    } else if t < 0.66 {
        let ratio = (t - 0.33) / 0.33;
        Rgb::new(ratio, 1.0, 0.0)
    } else {
        let ratio = (t - 0.66) / 0.34;
        Rgb::new(1.0, 1.0 - ratio, 0.0)
    }
}

fn thermal(t: f32) -> Rgb {
    if t < 0.25 {
        Rgb::new(t / 0.25, 0.0, 0.0)
    } else if t < 0.5 {
        Rgb::new(1.0, (t - 0.25) / 0.25, 0.0)
    } else if t < 0.75 {
        Rgb::new(1.0, 1.0, (t - 0.5) / 0.25)
    } else {
        Rgb::new(1.0, 1.0, 1.0)
    }
}

fn rainbow(t: f32) -> Rgb {
    hsv_to_rgb(t * 300.0, 1.0, 1.0)
}

fn monochrome(t: f32) -> Rgb {
    let intensity = 0.2 + 0.8 * t;
    Rgb::new(0.0, 0.4 * intensity, intensity)
}

fn ocean(t: f32) -> Rgb {
    if t < 0.33 {
        let ratio = t / 0.33;
        Rgb::new(0.0, ratio * 0.5, 0.5 + ratio * 0.5)
    } else if t < 0.66 {
        let ratio = (t - 0.33) / 0.33;
        Rgb::new(0.0, 0.5 + ratio * 0.5, 1.0 - ratio * 0.3)
    } else {
        let ratio = (t - 0.66) / 0.34;
        Rgb::new(ratio * 0.8, 1.0, 0.7 + ratio * 0.3)
    }
}

fn fire(t: f32) -> Rgb {
    if t < 0.2 {
        let ratio = t / 0.2;
        Rgb::new(ratio * 0.5, 0.0, 0.0)
    } else if t < 0.4 {
        let ratio = (t - 0.2) / 0.2;
        Rgb::new(0.5 + ratio * 0.5, 0.0, 0.0)
    } else if t < 0.6 {
        let ratio = (t - 0.4) / 0.2;
        Rgb::new(1.0, ratio * 0.5, 0.0)
    } else if t < 0.8 {
        let ratio = (t - 0.6) / 0.2;
        Rgb::new(1.0, 0.5 + ratio * 0.5, 0.0)
    } else {
        let ratio = (t - 0.8) / 0.2;
        Rgb::new(1.0, 1.0, ratio)
    }
}

/// Standard six-sector HSV conversion. `hue` is in degrees.
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - f * saturation);
    let t = value * (1.0 - (1.0 - f) * saturation);
    let (r, g, b) = match sector as u32 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Rgb::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_rgb(actual: Rgb, expected: (f32, f32, f32)) {
        let expected = Rgb::new(expected.0, expected.1, expected.2);
        assert!(
            (actual.r - expected.r).abs() <= EPS
                && (actual.g - expected.g).abs() <= EPS
                && (actual.b - expected.b).abs() <= EPS,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn classic_endpoints() {
        assert_rgb(GradientSelection::CLASSIC.evaluate(0.0), (0.0, 0.0, 1.0));
        assert_rgb(GradientSelection::CLASSIC.evaluate(1.0), (1.0, 0.0, 0.0));
        assert_rgb(GradientSelection::CLASSIC.evaluate(0.33), (0.0, 1.0, 0.0));
    }

    #[test]
    fn symmetric_classic_folds_around_midpoint() {
        let folded = GradientSelection::symmetric(GradientBase::Classic);
        let plain = GradientSelection::CLASSIC;

        assert_eq!(folded.evaluate(0.5), plain.evaluate(0.0));
        assert_eq!(folded.evaluate(0.0), folded.evaluate(1.0));
        assert_eq!(folded.evaluate(0.0), plain.evaluate(1.0));
        assert_eq!(folded.evaluate(0.25), plain.evaluate(0.5));
    }

    #[test]
    fn inputs_outside_unit_range_are_clamped() {
        for base in GradientBase::ALL {
            assert_eq!(base.color_at(-3.0), base.color_at(0.0), "{base}");
            assert_eq!(base.color_at(7.0), base.color_at(1.0), "{base}");
        }
    }

    #[test]
    fn every_gradient_stays_in_unit_cube() {
        for base in GradientBase::ALL {
            for symmetric in [false, true] {
                let selection = GradientSelection { base, symmetric };
                for step in 0..=200 {
                    let rgb = selection.evaluate(step as f32 / 200.0);
                    for channel in rgb.to_array() {
                        assert!(
                            (0.0..=1.0 + EPS).contains(&channel),
                            "{selection} produced {rgb:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn thermal_segments() {
        let thermal = GradientBase::Thermal;
        assert_rgb(thermal.color_at(0.0), (0.0, 0.0, 0.0));
        assert_rgb(thermal.color_at(0.125), (0.5, 0.0, 0.0));
        assert_rgb(thermal.color_at(0.25), (1.0, 0.0, 0.0));
        assert_rgb(thermal.color_at(0.5), (1.0, 1.0, 0.0));
        assert_rgb(thermal.color_at(0.8), (1.0, 1.0, 1.0));
    }

    #[test]
    fn rainbow_stops_short_of_red() {
        let rainbow = GradientBase::Rainbow;
        assert_rgb(rainbow.color_at(0.0), (1.0, 0.0, 0.0));
        assert_rgb(rainbow.color_at(0.2), (1.0, 1.0, 0.0));
        assert_rgb(rainbow.color_at(0.4), (0.0, 1.0, 0.0));
        assert_rgb(rainbow.color_at(1.0), (1.0, 0.0, 1.0));
    }

    #[test]
    fn monochrome_ramps_intensity() {
        assert_rgb(GradientBase::Monochrome.color_at(0.0), (0.0, 0.08, 0.2));
        assert_rgb(GradientBase::Monochrome.color_at(1.0), (0.0, 0.4, 1.0));
    }

    #[test]
    fn ocean_segments() {
        let ocean = GradientBase::Ocean;
        assert_rgb(ocean.color_at(0.0), (0.0, 0.0, 0.5));
        assert_rgb(ocean.color_at(0.33), (0.0, 0.5, 1.0));
        assert_rgb(ocean.color_at(0.66), (0.0, 1.0, 0.7));
        assert_rgb(ocean.color_at(1.0), (0.8, 1.0, 1.0));
    }

    #[test]
    fn fire_segments() {
        let fire = GradientBase::Fire;
        assert_rgb(fire.color_at(0.0), (0.0, 0.0, 0.0));
        assert_rgb(fire.color_at(0.2), (0.5, 0.0, 0.0));
        assert_rgb(fire.color_at(0.4), (1.0, 0.0, 0.0));
        assert_rgb(fire.color_at(0.6), (1.0, 0.5, 0.0));
        assert_rgb(fire.color_at(0.8), (1.0, 1.0, 0.0));
        assert_rgb(fire.color_at(1.0), (1.0, 1.0, 1.0));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Ocean".parse::<GradientBase>().unwrap(), GradientBase::Ocean);
        assert_eq!(" fire ".parse::<GradientBase>().unwrap(), GradientBase::Fire);
        assert!("plasma".parse::<GradientBase>().is_err());
    }
}
