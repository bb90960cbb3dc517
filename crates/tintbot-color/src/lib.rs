#![forbid(unsafe_code)]

//! Color values for tintbot.
//!
//! # Role in tintbot
//! `tintbot-color` is the shared vocabulary for colors. The catalog, blend
//! engine, and namer in `tintbot-core` only ever see a validated [`Color`];
//! format sniffing happens once, in [`Color::parse`].
//!
//! # This crate provides
//! - [`Color`]: an immutable color convertible between RGB, `#rrggbb`,
//!   `0xrrggbb`, and CIE L\*a\*b\*.
//! - [`Lab`]: D65 CIELAB coordinates with Euclidean distance and per-channel
//!   mixing.
//! - [`FormatError`] for inputs that match none of the accepted encodings.
//!
//! # Example
//!
//! ```
//! use tintbot_color::{Color, distance};
//!
//! let white: Color = "#ffffff".parse().unwrap();
//! let black = Color::parse("0x000000").unwrap();
//! assert_eq!(white.to_rgb(), (255, 255, 255));
//! assert!((distance(&white, &black) - 100.0).abs() < 1e-3);
//! ```

/// Color values and encodings.
pub mod color;
/// Parse errors.
pub mod error;
/// CIE L\*a\*b\* coordinates and sRGB conversion.
pub mod lab;

pub use color::{Color, ColorInput, Rgb, distance};
pub use error::FormatError;
pub use lab::{D65_WHITE, Lab};
