use serde::{Serialize, Serializer};
use std::fmt;

pub const GRADIENT_STEPS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb(0x00, 0x80, 0x00);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

// NB: templates want the css form, not a tuple
impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Copy, Debug)]
struct Hsl {
    h: f64,
    s: f64,
    l: f64,
}

impl From<Rgb> for Hsl {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let diff = max - min;

        if diff == 0.0 {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l < 0.5 {
            diff / (max + min)
        } else {
            diff / (2.0 - max - min)
        };
        let h = if max == r {
            (g - b) / diff
        } else if max == g {
            2.0 + (b - r) / diff
        } else {
            4.0 + (r - g) / diff
        };
        Hsl {
            h: (h / 6.0).rem_euclid(1.0),
            s,
            l,
        }
    }
}

impl From<Hsl> for Rgb {
    fn from(Hsl { h, s, l }: Hsl) -> Self {
        let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

        if s == 0.0 {
            let v = to_byte(l);
            return Rgb(v, v, v);
        }

        let v2 = if l < 0.5 { l * (1.0 + s) } else { (l + s) - s * l };
        let v1 = 2.0 * l - v2;
        let hue = |h: f64| {
            let h = h.rem_euclid(1.0);
            if 6.0 * h < 1.0 {
                v1 + (v2 - v1) * 6.0 * h
            } else if 2.0 * h < 1.0 {
                v2
            } else if 3.0 * h < 2.0 {
                v1 + (v2 - v1) * (2.0 / 3.0 - h) * 6.0
            } else {
                v1
            }
        };

        Rgb(
            to_byte(hue(h + 1.0 / 3.0)),
            to_byte(hue(h)),
            to_byte(hue(h - 1.0 / 3.0)),
        )
    }
}

/// Position of `score` (a compound polarity in [-1, 1]) on a gradient of `steps` colors:
/// `floor((score + 1) * (steps - 1) / 2)`.
///
/// Scores outside [-1, 1] aren't expected. The float-to-int cast saturates below zero,
/// and [Gradient::color_for] caps the top end.
pub fn color_index(score: f64, steps: usize) -> usize {
    ((score + 1.0) * (steps.saturating_sub(1)) as f64 / 2.0) as usize
}

/// Evenly spaced colors between two endpoints, interpolated in HSL space.
#[derive(Clone, Debug)]
pub struct Gradient {
    colors: Vec<Rgb>,
}

impl Gradient {
    pub fn new(from: Rgb, to: Rgb, steps: usize) -> Self {
        let (from, to) = (Hsl::from(from), Hsl::from(to));
        let intervals = steps.saturating_sub(1).max(1) as f64;
        let colors = (0..steps)
            .map(|i| {
                let t = i as f64 / intervals;
                Rgb::from(Hsl {
                    h: from.h + (to.h - from.h) * t,
                    s: from.s + (to.s - from.s) * t,
                    l: from.l + (to.l - from.l) * t,
                })
            })
            .collect();
        Self { colors }
    }

    pub fn red_to_green() -> Self {
        Self::new(Rgb::RED, Rgb::GREEN, GRADIENT_STEPS)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn color_for(&self, score: f64) -> Rgb {
        let last = self.colors.len().saturating_sub(1);
        self.colors
            .get(color_index(score, self.colors.len()).min(last))
            .copied()
            .unwrap_or(Rgb::RED)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::red_to_green()
    }
}
