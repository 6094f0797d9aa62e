//! The three fixed color palettes, their entries, and the small recency
//! cache used to speed up repeated lookups against one of them.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};

/// How many consecutive "no errors allowed" failures `determine` tolerates
/// before giving up. `IGNORE` disables the counter entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxErrors {
  /// Fail as soon as a single pixel matches zero palettes.
  Count(u32),
  /// Never fail due to unmatched pixels.
  Ignore,
}

/// A palette's stable index. `0` is reserved for "no palette determined".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PaletteIndex {
  /// No palette could be determined.
  Unknown = 0,
  /// Black-purple-red-yellow-white "ironbow" palette.
  Iron = 1,
  /// Linear black-to-white palette.
  Grayscale = 2,
  /// Blue-green-yellow-red "rainbow" palette.
  Rainbow = 3,
}
impl PaletteIndex {
  /// All three real (non-`Unknown`) palettes, in stable-index order.
  pub const ALL: [Self; 3] = [Self::Iron, Self::Grayscale, Self::Rainbow];

  /// Looks up the static table for this palette. Panics for `Unknown`,
  /// which has no backing table — callers are expected to have already
  /// rejected `Unknown` before reaching for entries.
  #[inline]
  #[must_use]
  pub const fn entries(self) -> &'static [PaletteEntry] {
    match self {
      Self::Unknown => &[],
      Self::Iron => &IRON_ENTRIES,
      Self::Grayscale => &GRAYSCALE_ENTRIES,
      Self::Rainbow => &RAINBOW_ENTRIES,
    }
  }
}

/// One `[base, base+width)` intensity range mapped to a rendered color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
  /// First intensity this entry covers.
  pub base: u8,
  /// How many consecutive intensities (starting at `base`) this entry
  /// covers. Always nonzero for a real table entry.
  pub width: u8,
  /// The color intensities in `[base, base+width)` render to.
  pub color: Color,
}
impl PaletteEntry {
  #[inline]
  #[must_use]
  const fn new(base: u8, width: u8, color: Color) -> Self {
    Self { base, width, color }
  }

  /// Whether `value` falls in this entry's `[base, base+width)` range.
  #[inline]
  #[must_use]
  pub const fn covers(&self, value: u8) -> bool {
    let base = self.base as u32;
    let end = base + self.width as u32;
    let value = value as u32;
    value >= base && value < end
  }
}

/// Scans `palette`'s entries (in order) for one whose color matches `color`.
///
/// This is the uncached palette-only half of color lookup;
/// [`crate::palette::cache::PaletteCache::find_color`] wraps it with a
/// cache-first scan.
#[inline]
#[must_use]
pub fn find_color_raw(palette: &[PaletteEntry], color: Color) -> Option<PaletteEntry> {
  palette.iter().find(|e| e.color == color).copied()
}

/// Scans `palette`'s entries (in order) for one whose `[base, base+width)`
/// range covers `value`.
#[inline]
#[must_use]
pub fn find_value_raw(palette: &[PaletteEntry], value: u8) -> Option<PaletteEntry> {
  palette.iter().find(|e| e.covers(value)).copied()
}

/// Determines which of the three palettes an IR canvas was rendered with.
///
/// Iterates every pixel, skipping exact black and exact white (reserved for
/// the crosshair), and tallies how many palettes recognize each remaining
/// color — via that palette's own [`cache::PaletteCache`], the same
/// cache-first-then-scan lookup [`cache::PaletteCache::find_color`] uses
/// elsewhere. Returns the palette with the unique highest hit count.
///
/// ## Errors
/// * `ImageShape`/`Palettes` if no palette is ever ahead, or if two palettes
///   tie for the maximum.
/// * `ImageShape`/`Palettes` if a pixel matches zero palettes and
///   `max_errors` is a [`MaxErrors::Count`] that reaches zero.
pub fn determine(ir_canvas: &Canvas, max_errors: MaxErrors) -> ThermalResult<PaletteIndex> {
  let mut hits = [0u32; 3];
  let mut caches = PaletteIndex::ALL.map(cache::PaletteCache::new);
  let mut remaining = match max_errors {
    MaxErrors::Count(n) => Some(n),
    MaxErrors::Ignore => None,
  };

  for &color in ir_canvas.pixels() {
    if color == Color::BLACK || color == Color::WHITE {
      continue;
    }
    let mut matched_any = false;
    for (slot, cache) in hits.iter_mut().zip(caches.iter_mut()) {
      if cache.find_color(color).is_some() {
        *slot += 1;
        matched_any = true;
      }
    }
    if !matched_any {
      if let Some(left) = remaining.as_mut() {
        if *left == 0 {
          return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Palettes));
        }
        *left -= 1;
      }
    }
  }

  let max = hits.iter().copied().max().unwrap_or(0);
  if max == 0 {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Palettes));
  }
  let winners = hits.iter().filter(|&&h| h == max).count();
  if winners != 1 {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Palettes));
  }
  let idx = hits.iter().position(|&h| h == max).unwrap();
  Ok(PaletteIndex::ALL[idx])
}

macro_rules! band {
  ($base:expr, $r:expr, $g:expr, $b:expr) => {
    PaletteEntry::new($base, 16, Color::from_rgb8($r, $g, $b))
  };
}

/// Ironbow: black, through purple and red, to orange/yellow, to white.
static IRON_ENTRIES: [PaletteEntry; 16] = [
  band!(0, 0x00, 0x00, 0x00),
  band!(16, 0x10, 0x00, 0x20),
  band!(32, 0x28, 0x00, 0x50),
  band!(48, 0x40, 0x00, 0x78),
  band!(64, 0x60, 0x00, 0x90),
  band!(80, 0x80, 0x00, 0x88),
  band!(96, 0x98, 0x00, 0x60),
  band!(112, 0xB0, 0x08, 0x38),
  band!(128, 0xC8, 0x18, 0x10),
  band!(144, 0xD8, 0x38, 0x00),
  band!(160, 0xE8, 0x5C, 0x00),
  band!(176, 0xF0, 0x80, 0x00),
  band!(192, 0xF8, 0xA8, 0x00),
  band!(208, 0xFC, 0xC8, 0x20),
  band!(224, 0xFE, 0xE4, 0x60),
  band!(240, 0xFF, 0xFF, 0xC0),
];

/// Linear black-to-white.
static GRAYSCALE_ENTRIES: [PaletteEntry; 16] = [
  band!(0, 0x00, 0x00, 0x00),
  band!(16, 0x11, 0x11, 0x11),
  band!(32, 0x22, 0x22, 0x22),
  band!(48, 0x33, 0x33, 0x33),
  band!(64, 0x44, 0x44, 0x44),
  band!(80, 0x55, 0x55, 0x55),
  band!(96, 0x66, 0x66, 0x66),
  band!(112, 0x77, 0x77, 0x77),
  band!(128, 0x88, 0x88, 0x88),
  band!(144, 0x99, 0x99, 0x99),
  band!(160, 0xAA, 0xAA, 0xAA),
  band!(176, 0xBB, 0xBB, 0xBB),
  band!(192, 0xCC, 0xCC, 0xCC),
  band!(208, 0xDD, 0xDD, 0xDD),
  band!(224, 0xEE, 0xEE, 0xEE),
  band!(240, 0xFF, 0xFF, 0xFF),
];

/// Blue, through green and yellow, to red.
static RAINBOW_ENTRIES: [PaletteEntry; 16] = [
  band!(0, 0x00, 0x00, 0x80),
  band!(16, 0x00, 0x00, 0xE0),
  band!(32, 0x00, 0x40, 0xFF),
  band!(48, 0x00, 0x90, 0xFF),
  band!(64, 0x00, 0xD0, 0xE0),
  band!(80, 0x00, 0xF0, 0x90),
  band!(96, 0x00, 0xFF, 0x40),
  band!(112, 0x50, 0xFF, 0x00),
  band!(128, 0xA0, 0xFF, 0x00),
  band!(144, 0xE0, 0xF0, 0x00),
  band!(160, 0xFF, 0xD0, 0x00),
  band!(176, 0xFF, 0xA0, 0x00),
  band!(192, 0xFF, 0x70, 0x00),
  band!(208, 0xFF, 0x40, 0x00),
  band!(224, 0xFF, 0x10, 0x00),
  band!(240, 0xC0, 0x00, 0x00),
];

pub mod cache;
