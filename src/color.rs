//! The 16-bit RGB565 color used throughout the canvas and palette tables.

use bitfrob::u8_replicate_bits;
use bytemuck::{Pod, Zeroable};

/// Packed 5:6:5 RGB color, matching the in-memory representation the camera
/// firmware itself renders screenshots with.
///
/// Bit layout (little endian `u16`, high to low): `RRRRR GGGGGG BBBBB`.
/// Equality is bit equality, so a palette that uses each color at most once
/// can be inverted by a straight color-to-entry lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(transparent)]
pub struct Color(pub u16);

const RED_SHIFT: u32 = 11;
const GREEN_SHIFT: u32 = 5;
const RED_BITS: u32 = 5;
const GREEN_BITS: u32 = 6;
const BLUE_BITS: u32 = 5;

impl Color {
  /// Pure black, `0x000000` in 8:8:8 — the crosshair's `BORDER` color.
  pub const BLACK: Self = Self(0);
  /// Pure white, `0xFFFFFF` in 8:8:8 — the crosshair's `FILL` color.
  pub const WHITE: Self = Self::from_rgb5_6_5(0b11111, 0b111111, 0b11111);

  /// Builds a color from native 5/6/5-bit channel values.
  ///
  /// Out-of-range bits beyond each channel's width are masked off silently,
  /// matching the firmware's own packed-integer construction rather than
  /// panicking on a caller mistake.
  #[inline]
  #[must_use]
  pub const fn from_rgb5_6_5(r: u8, g: u8, b: u8) -> Self {
    let r = (r as u16 & 0b11111) << RED_SHIFT;
    let g = (g as u16 & 0b111111) << GREEN_SHIFT;
    let b = b as u16 & 0b11111;
    Self(r | g | b)
  }

  /// Builds a color from 8-bit-per-channel values, truncating each channel
  /// down to its native bit width.
  #[inline]
  #[must_use]
  pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
    Self::from_rgb5_6_5(r >> 3, g >> 2, b >> 3)
  }

  /// The raw packed `u16` value.
  #[inline]
  #[must_use]
  pub const fn to_u16(self) -> u16 {
    self.0
  }

  /// Native red component, 0..=31.
  #[inline]
  #[must_use]
  pub const fn r5(self) -> u8 {
    ((self.0 >> RED_SHIFT) & 0b11111) as u8
  }

  /// Native green component, 0..=63.
  #[inline]
  #[must_use]
  pub const fn g6(self) -> u8 {
    ((self.0 >> GREEN_SHIFT) & 0b111111) as u8
  }

  /// Native blue component, 0..=31.
  #[inline]
  #[must_use]
  pub const fn b5(self) -> u8 {
    (self.0 & 0b11111) as u8
  }

  /// Red, expanded to a full 8-bit value by bit replication (the same
  /// technique a 16bpp BMP bitfield decode uses to widen a short channel).
  #[inline]
  #[must_use]
  pub fn r8(self) -> u8 {
    u8_replicate_bits(RED_BITS, self.r5())
  }

  /// Green, expanded to a full 8-bit value by bit replication.
  #[inline]
  #[must_use]
  pub fn g8(self) -> u8 {
    u8_replicate_bits(GREEN_BITS, self.g6())
  }

  /// Blue, expanded to a full 8-bit value by bit replication.
  #[inline]
  #[must_use]
  pub fn b8(self) -> u8 {
    u8_replicate_bits(BLUE_BITS, self.b5())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn black_and_white_are_the_crosshair_colors() {
    assert_eq!(Color::BLACK.to_u16(), 0x0000);
    assert_eq!(Color::WHITE.to_u16(), 0xFFFF);
  }

  #[test]
  fn rgb8_round_trips_through_the_nearest_native_value() {
    let c = Color::from_rgb8(0xFF, 0x80, 0x10);
    assert_eq!(c.r5(), 0b11111);
    assert!(c.g8() <= 0x84 && c.g8() >= 0x7C);
    assert!(c.b8() <= 0x18);
  }

  #[test]
  fn replication_maps_max_channel_to_max_byte() {
    assert_eq!(Color::from_rgb5_6_5(31, 63, 31).r8(), 255);
    assert_eq!(Color::from_rgb5_6_5(31, 63, 31).g8(), 255);
    assert_eq!(Color::from_rgb5_6_5(31, 63, 31).b8(), 255);
    assert_eq!(Color::from_rgb5_6_5(0, 0, 0).r8(), 0);
  }
}
