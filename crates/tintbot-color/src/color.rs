//! The validated [`Color`] value and its encodings.
//!
//! Three light-weight encodings are accepted on input:
//!
//! | encoding | example | notes |
//! |----------|---------|-------|
//! | RGB triple | `(55, 0, 40)` | integral channels in `0..=255` |
//! | html | `#370028` | exactly six hex digits |
//! | hex | `0x370028` | lowercase `0x`, exactly six hex digits |
//!
//! Output encodings are always lowercase.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::FormatError;
use crate::lab::Lab;

/// An 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Raw, unvalidated input for [`Color::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorInput<'a> {
    /// An integer triple; each channel must lie in `0..=255`.
    Triple(i64, i64, i64),
    /// `#rrggbb` or `0xrrggbb`.
    Text(&'a str),
}

impl From<(i64, i64, i64)> for ColorInput<'_> {
    fn from((r, g, b): (i64, i64, i64)) -> Self {
        Self::Triple(r, g, b)
    }
}

impl From<[i64; 3]> for ColorInput<'_> {
    fn from([r, g, b]: [i64; 3]) -> Self {
        Self::Triple(r, g, b)
    }
}

impl From<(u8, u8, u8)> for ColorInput<'_> {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Triple(i64::from(r), i64::from(g), i64::from(b))
    }
}

impl<'a> From<&'a str> for ColorInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for ColorInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

/// An immutable color.
///
/// A `Color` can only be obtained from a valid encoding, so every method on it
/// is total. The Lab coordinates are computed once at construction.
/// Equality and hashing use the RGB triple.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    rgb: Rgb,
    lab: Lab,
}

impl Color {
    pub const BLACK: Self = Self {
        rgb: Rgb::new(0, 0, 0),
        lab: Lab::new(0.0, 0.0, 0.0),
    };

    /// Build a color from channels that are already known to be in range.
    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let rgb = Rgb::new(r, g, b);
        Self {
            rgb,
            lab: Lab::from_rgb(rgb),
        }
    }

    /// Parse any accepted encoding.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the input matches none of the RGB triple,
    /// `#rrggbb`, or `0xrrggbb` shapes.
    pub fn parse<'a>(input: impl Into<ColorInput<'a>>) -> Result<Self, FormatError> {
        match input.into() {
            ColorInput::Triple(r, g, b) => Ok(Self::from(Rgb::new(
                channel('r', r)?,
                channel('g', g)?,
                channel('b', b)?,
            ))),
            ColorInput::Text(text) => parse_text(text),
        }
    }

    /// Quantize Lab coordinates to the nearest in-gamut 8-bit color.
    #[must_use]
    pub fn from_lab(lab: Lab) -> Self {
        Self::from(lab.to_rgb())
    }

    #[must_use]
    pub const fn rgb(&self) -> Rgb {
        self.rgb
    }

    #[must_use]
    pub const fn lab(&self) -> Lab {
        self.lab
    }

    #[must_use]
    pub const fn to_rgb(&self) -> (u8, u8, u8) {
        self.rgb.as_tuple()
    }

    #[must_use]
    pub const fn to_lab(&self) -> (f64, f64, f64) {
        self.lab.as_tuple()
    }

    /// `#rrggbb`, lowercase.
    #[must_use]
    pub fn to_html(&self) -> String {
        let Rgb { r, g, b } = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// `0xrrggbb`, lowercase.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let Rgb { r, g, b } = self.rgb;
        format!("0x{r:02x}{g:02x}{b:02x}")
    }

    /// Perceptual (Lab Euclidean) distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.lab.distance(other.lab)
    }
}

/// Perceptual distance between two colors.
///
/// Symmetric, non-negative, and zero exactly when the Lab coordinates match.
#[must_use]
pub fn distance(a: &Color, b: &Color) -> f64 {
    a.distance(b)
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self {
            rgb,
            lab: Lab::from_rgb(rgb),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::from_rgb(r, g, b)
    }
}

impl TryFrom<(i64, i64, i64)> for Color {
    type Error = FormatError;

    fn try_from(value: (i64, i64, i64)) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for Color {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_text(s)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgb.hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgb { r, g, b } = self.rgb;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_html())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

fn channel(name: char, value: i64) -> Result<u8, FormatError> {
    u8::try_from(value).map_err(|_| FormatError::ChannelOutOfRange {
        channel: name,
        value,
    })
}

fn parse_text(text: &str) -> Result<Color, FormatError> {
    if let Some(body) = text.strip_prefix('#') {
        return hex_body(body)
            .map(Color::from)
            .ok_or_else(|| FormatError::InvalidHtml {
                input: text.to_string(),
            });
    }
    if let Some(body) = text.strip_prefix("0x") {
        return hex_body(body)
            .map(Color::from)
            .ok_or_else(|| FormatError::InvalidHex {
                input: text.to_string(),
            });
    }
    Err(FormatError::unrecognized(text))
}

fn hex_body(body: &str) -> Option<Rgb> {
    if body.len() != 6 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&body[range], 16).ok();
    Some(Rgb::new(byte(0..2)?, byte(2..4)?, byte(4..6)?))
}
