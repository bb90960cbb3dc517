//! CIE L\*a\*b\* coordinates and the sRGB ↔ XYZ ↔ Lab transform.
//!
//! All perceptual math in tintbot happens here: distances, blends, and
//! nearest-neighbour search operate on [`Lab`] triples, never on RGB.
//!
//! # Conversion
//!
//! ```text
//! sRGB (0..=255) ──gamma decode──▶ linear RGB ──M──▶ XYZ ──f(t)──▶ Lab
//! Lab ──f⁻¹(t)──▶ XYZ ──M⁻¹──▶ linear RGB ──gamma encode──▶ clamp [0,1] ──▶ round
//! ```
//!
//! The reference white is D65. Going back to RGB clamps out-of-gamut channels
//! to `[0, 1]` before scaling, so a Lab round trip can move a channel by one
//! unit of rounding.

use crate::color::Rgb;

/// D65 reference white in XYZ (2° observer).
pub const D65_WHITE: [f64; 3] = [0.950_47, 1.0, 1.088_83];

/// CIE ε = 216/24389.
const EPSILON: f64 = 216.0 / 24_389.0;
/// CIE κ = 24389/27.
const KAPPA: f64 = 24_389.0 / 27.0;

const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.412_424, 0.357_579, 0.180_464],
    [0.212_656, 0.715_158, 0.072_185_6],
    [0.019_332_4, 0.119_193, 0.950_444],
];

const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.240_71, -1.537_26, -0.498_571],
    [-0.969_258, 1.875_99, 0.041_555_7],
    [0.055_635_2, -0.203_996, 1.057_07],
];

/// A color in CIE L\*a\*b\* (D65).
///
/// `l` lies in `[0, 100]`; `a` and `b` are unbounded but stay within roughly
/// ±128 for colors inside the sRGB gamut.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[must_use]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64, f64) {
        (self.l, self.a, self.b)
    }

    /// Convert an 8-bit sRGB triple to Lab.
    #[must_use]
    pub fn from_rgb(rgb: Rgb) -> Self {
        let linear = [
            srgb_to_linear(rgb.r),
            srgb_to_linear(rgb.g),
            srgb_to_linear(rgb.b),
        ];
        let xyz = mul(&SRGB_TO_XYZ, linear);

        let fx = lab_f(xyz[0] / D65_WHITE[0]);
        let fy = lab_f(xyz[1] / D65_WHITE[1]);
        let fz = lab_f(xyz[2] / D65_WHITE[2]);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert back to 8-bit sRGB, clamping out-of-gamut channels.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let fy = (self.l + 16.0) / 116.0;
        let fx = fy + self.a / 500.0;
        let fz = fy - self.b / 200.0;

        let xr = lab_f_inv(fx);
        let zr = lab_f_inv(fz);
        let yr = if self.l > KAPPA * EPSILON {
            fy.powi(3)
        } else {
            self.l / KAPPA
        };

        let xyz = [xr * D65_WHITE[0], yr * D65_WHITE[1], zr * D65_WHITE[2]];
        let [r, g, b] = mul(&XYZ_TO_SRGB, xyz);
        Rgb::new(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }

    /// Euclidean distance in Lab space.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// Mix two Lab colors channel by channel.
    ///
    /// Each channel is `w * self + (1 - w) * modifier` with `w` taken from
    /// `weights` in `[l, a, b]` order. Weights are not validated here.
    #[must_use]
    pub fn mix(self, modifier: Self, weights: [f64; 3]) -> Self {
        let [wl, wa, wb] = weights;
        Self {
            l: wl * self.l + (1.0 - wl) * modifier.l,
            a: wa * self.a + (1.0 - wa) * modifier.a,
            b: wb * self.b + (1.0 - wb) * modifier.b,
        }
    }
}

impl From<Rgb> for Lab {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb(rgb)
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn linear_to_srgb(c: f64) -> u8 {
    let encoded = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    // NaN falls through clamp unchanged; treat it as black.
    let clamped = if encoded.is_nan() {
        0.0
    } else {
        encoded.clamp(0.0, 1.0)
    };
    (clamped * 255.0).round() as u8
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    let cubed = t.powi(3);
    if cubed > EPSILON {
        cubed
    } else {
        (116.0 * t - 16.0) / KAPPA
    }
}
