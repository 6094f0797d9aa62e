//! Composes the locator, OCR, and palette subsystems into the end-to-end
//! recovery pipeline: classification mask, OCR'd spot readings, two-pass
//! palette inversion with crosshair-occlusion repair, re-render, and
//! crosshair restamping.

use alloc::vec;
use alloc::vec::Vec;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};
use crate::locator::{DetectClass, LocatorResult, Model, Rect};
use crate::ocr::{self, GlyphKind};
use crate::palette::cache::PaletteCache;
use crate::palette::{self, MaxErrors, PaletteIndex};

/// Per-pixel classification, mirroring the IR canvas geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskClass {
  /// Thermal image data.
  Image,
  /// Covered by the crosshair overlay.
  Crosshair,
  /// Transient: an `Image` pixel whose color matched no palette entry
  /// during pass 1. Promoted back to `Image` by pass 2.
  Invalid,
  /// Outside the canvas (never produced for the IR canvas itself, kept
  /// for taxonomy parity with [`DetectClass::OutOfBounds`]).
  OutOfBounds,
}
impl From<DetectClass> for MaskClass {
  fn from(d: DetectClass) -> Self {
    match d {
      DetectClass::Image => Self::Image,
      DetectClass::Crosshair => Self::Crosshair,
      DetectClass::OutOfBounds => Self::OutOfBounds,
      DetectClass::Fail => Self::Invalid,
    }
  }
}

/// How a recovered intensity's value is picked from its matched entry's
/// `[base, base+width)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantization {
  /// Requires `entry.width == 1`.
  Exact,
  Floor,
  Ceiling,
  MedianLow,
  MedianHigh,
}

/// Policy for filling crosshair-occluded (or palette-lookup-miss)
/// intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
  Zero,
  Min,
  Max,
  Med,
  SquareSmall,
  SquareWeight,
  SquareLarge,
}

/// A recovered intensity and its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntensityPoint {
  pub value: u8,
  pub uncertainty: u8,
}

/// A full intensity image, at IR-canvas resolution.
#[derive(Debug, Clone)]
pub struct IntensityImage {
  width: u32,
  height: u32,
  quantization: Quantization,
  points: Vec<IntensityPoint>,
}
impl IntensityImage {
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }
  #[inline]
  #[must_use]
  pub const fn quantization(&self) -> Quantization {
    self.quantization
  }
  #[inline]
  #[must_use]
  pub fn points(&self) -> &[IntensityPoint] {
    &self.points
  }
}

/// Owns the visible (IR) and text sub-canvases, the classification mask,
/// and (once computed) the OCR'd readings and intensity image.
pub struct ThermalContext {
  visible_image: Canvas,
  text_image: Canvas,
  model: Model,
  aperture: Rect,
  mask: Vec<MaskClass>,
  palette: Option<PaletteIndex>,
  temperature_tenths_c: Option<i32>,
  emissivity_percent: Option<u8>,
  intensity_image: Option<IntensityImage>,
  value_min: Option<u8>,
  value_max: Option<u8>,
  mean_value: Option<u8>,
}

impl ThermalContext {
  /// Builds a thermal context from a located screenshot, taking ownership
  /// of its two sub-canvases in place of a nulled-pointer move.
  pub fn create(locator: LocatorResult) -> ThermalResult<Self> {
    let model = locator.model();
    let aperture = locator.aperture_rect();
    let (width, height) = (locator.ir_canvas().width(), locator.ir_canvas().height());
    let mut mask = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
      for x in 0..width {
        mask.push(MaskClass::from(locator.detect(x, y)));
      }
    }
    let (text_image, visible_image) = locator.into_canvases();
    Ok(Self {
      visible_image,
      text_image,
      model,
      aperture,
      mask,
      palette: None,
      temperature_tenths_c: None,
      emissivity_percent: None,
      intensity_image: None,
      value_min: None,
      value_max: None,
      mean_value: None,
    })
  }

  #[inline]
  #[must_use]
  pub fn visible_image(&self) -> &Canvas {
    &self.visible_image
  }
  #[inline]
  #[must_use]
  pub fn text_image(&self) -> &Canvas {
    &self.text_image
  }
  #[inline]
  #[must_use]
  pub const fn model(&self) -> Model {
    self.model
  }
  #[inline]
  #[must_use]
  pub const fn aperture_rect(&self) -> Rect {
    self.aperture
  }
  #[inline]
  #[must_use]
  pub fn mask(&self) -> &[MaskClass] {
    &self.mask
  }
  #[inline]
  #[must_use]
  pub fn temperature_tenths_c(&self) -> Option<i32> {
    self.temperature_tenths_c
  }
  #[inline]
  #[must_use]
  pub fn emissivity_percent(&self) -> Option<u8> {
    self.emissivity_percent
  }
  #[inline]
  #[must_use]
  pub fn intensity_image(&self) -> Option<&IntensityImage> {
    self.intensity_image.as_ref()
  }
  #[inline]
  #[must_use]
  pub fn value_range(&self) -> Option<(u8, u8)> {
    self.value_min.zip(self.value_max)
  }
  #[inline]
  #[must_use]
  pub fn mean_value(&self) -> Option<u8> {
    self.mean_value
  }

  fn width(&self) -> u32 {
    self.visible_image.width()
  }
  fn height(&self) -> u32 {
    self.visible_image.height()
  }

  /// Determines which palette rendered [`Self::visible_image`] and caches
  /// it for [`Self::process`].
  pub fn determine_palette(&mut self, max_errors: MaxErrors) -> ThermalResult<PaletteIndex> {
    let index = palette::determine(&self.visible_image, max_errors)?;
    self.palette = Some(index);
    Ok(index)
  }

  /// Reads the temperature and emissivity glyph runs from the text strip.
  ///
  /// Temperature: 6 large glyphs at `(0, 0)`, pitch 0, matching
  /// `[-]?\d+\.\dU` with `U` in `{C, F}`; stored as tenths of a degree
  /// Celsius (Fahrenheit values are converted). Emissivity: 6 small
  /// glyphs at `(110, 3)`, pitch 0, matching `E:0.dd`; stored as `dd`
  /// percent, rejecting `dd == 0`.
  ///
  /// ## Errors
  /// `Syntax`/`Thermal` if either string doesn't match its grammar;
  /// `ImageShape`/`Thermal` if the emissivity reading is exactly zero;
  /// whatever [`ocr::recognize_string`] returns if a glyph run doesn't fit
  /// or contains an unrecognizable glyph.
  pub fn ocr(&mut self) -> ThermalResult<()> {
    let temp_str = ocr::recognize_string(&self.text_image, 0, 0, 0, 6, 0, GlyphKind::Large)
      .map_err(|e| ThermalError::wrap(e, ErrorSource::Thermal))?;
    let emissivity_str = ocr::recognize_string(&self.text_image, 110, 3, 0, 6, 0, GlyphKind::Small)
      .map_err(|e| ThermalError::wrap(e, ErrorSource::Thermal))?;

    self.temperature_tenths_c = Some(parse_temperature(&temp_str)?);
    self.emissivity_percent = Some(parse_emissivity(&emissivity_str)?);
    Ok(())
  }

  fn mask_index(&self, x: u32, y: u32) -> usize {
    crate::canvas::xy_to_index(x, y, self.width())
  }

  /// Runs the two-pass palette inversion: classify and invert every pixel,
  /// then repair whatever pass 1 couldn't place.
  ///
  /// ## Errors
  /// * `AssertFail`/`Thermal` if an intensity image already exists (callers
  ///   must build a fresh context to re-process), if `quantization` is
  ///   `Exact` but a matched entry's width isn't 1, or if the mask holds a
  ///   class other than `Image`/`Crosshair` going into pass 1.
  /// * `ImageShape`/`Thermal` if no palette has been determined yet.
  pub fn process(&mut self, interpolation: Interpolation, quantization: Quantization) -> ThermalResult<()> {
    if self.intensity_image.is_some() {
      return Err(ThermalError::new(ErrorReason::AssertFail, ErrorSource::Thermal));
    }
    let palette_index = self.palette.ok_or_else(|| ThermalError::new(ErrorReason::ImageShape, ErrorSource::Thermal))?;

    let (width, height) = (self.width(), self.height());
    let mut points = vec![IntensityPoint::default(); (width * height) as usize];
    let mut cache = PaletteCache::new(palette_index);

    let mut value_min = u8::MAX;
    let mut value_max = 0u8;
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    let mut skipped: u64 = 0;
    let mut start_y: Option<u32> = None;

    for y in 0..height {
      for x in 0..width {
        let idx = self.mask_index(x, y);
        match self.mask[idx] {
          MaskClass::Image => {
            let color = self.visible_image.get(x, y).expect("in-bounds pixel");
            match cache.find_color(color) {
              Some(entry) => {
                let (value, uncertainty) = quantize(entry, quantization)?;
                value_min = value_min.min(value);
                value_max = value_max.max(value);
                sum += u64::from(value);
                count += 1;
                points[idx] = IntensityPoint { value, uncertainty };
              }
              None => {
                self.mask[idx] = MaskClass::Invalid;
                skipped += 1;
                start_y.get_or_insert(y);
              }
            }
          }
          MaskClass::Crosshair => {
            skipped += 1;
            start_y.get_or_insert(y);
            if interpolation == Interpolation::Zero {
              points[idx] = IntensityPoint { value: 0, uncertainty: 1 };
            }
          }
          MaskClass::Invalid | MaskClass::OutOfBounds => {
            return Err(ThermalError::new(ErrorReason::AssertFail, ErrorSource::Thermal));
          }
        }
      }
    }

    debug_assert!(skipped > 0 || value_min <= value_max);
    let mean_value = (sum / count.max(1)) as u8;
    crate::trace!("pass 1 done: {skipped} pixels need repair, range [{value_min}, {value_max}]");

    if skipped == 0 {
      self.value_min = Some(value_min);
      self.value_max = Some(value_max);
      self.mean_value = Some(mean_value);
      self.intensity_image = Some(IntensityImage { width, height, quantization, points });
      return Ok(());
    }

    let start_y = start_y.unwrap_or(0);
    crate::trace!("pass 2 repairing rows {start_y}..{height} with {interpolation:?}");
    for y in start_y..height {
      for x in 0..width {
        let idx = self.mask_index(x, y);
        let was_invalid = matches!(self.mask[idx], MaskClass::Invalid);
        if !matches!(self.mask[idx], MaskClass::Crosshair | MaskClass::Invalid) {
          continue;
        }
        skipped -= 1;
        if was_invalid {
          self.mask[idx] = MaskClass::Image;
        }
        let value = replacement_value(
          interpolation,
          &self.mask,
          &points,
          x,
          y,
          width,
          height,
          value_min,
          value_max,
          mean_value,
        );
        points[idx] = IntensityPoint { value, uncertainty: 1 };
      }
    }

    debug_assert_eq!(skipped, 0);

    self.value_min = Some(value_min);
    self.value_max = Some(value_max);
    self.mean_value = Some(mean_value);
    self.intensity_image = Some(IntensityImage { width, height, quantization, points });
    Ok(())
  }

  /// Renders the intensity image with `palette`, producing a fresh output
  /// canvas.
  ///
  /// ## Errors
  /// `ImageShape`/`Thermal` if [`Self::process`] hasn't run yet, or if an
  /// intensity value has no entry in `palette` (shouldn't happen for a
  /// palette that covers the full `0..=255` range, but the lookup is still
  /// fallible).
  pub fn export(&self, palette_index: PaletteIndex) -> ThermalResult<Canvas> {
    let image = self
      .intensity_image
      .as_ref()
      .ok_or_else(|| ThermalError::new(ErrorReason::ImageShape, ErrorSource::Thermal))?;
    let mut canvas = Canvas::create(image.width, image.height)?;
    let mut cache = PaletteCache::new(palette_index);
    for (i, point) in image.points.iter().enumerate() {
      let entry = cache
        .find_value(point.value)
        .ok_or_else(|| ThermalError::new(ErrorReason::ImageShape, ErrorSource::Thermal))?;
      let x = (i as u32) % image.width;
      let y = (i as u32) / image.width;
      canvas.set(x, y, entry.color);
    }
    Ok(canvas)
  }

  /// Restamps a crosshair onto `canvas` using the mask, in two passes: a
  /// horizontal sweep that paints both the border and fill pixels of each
  /// run, then a vertical sweep that paints only the top/bottom border
  /// caps (the fill interior is already in place from the horizontal
  /// pass — the asymmetry is intentional, not an oversight).
  ///
  /// ## Errors
  /// `OutOfRange`/`Thermal` if `canvas`'s dimensions don't match the mask.
  pub fn crosshair(&self, border_color: Color, fill_color: Color, canvas: &mut Canvas) -> ThermalResult<()> {
    let (width, height) = (self.width(), self.height());
    if canvas.width() != width || canvas.height() != height {
      return Err(ThermalError::new(ErrorReason::OutOfRange, ErrorSource::Thermal));
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum RunState {
      None,
      Border,
      Fill,
    }

    for y in 0..height {
      let mut state = RunState::None;
      let mut run_len = 0u32;
      for x in 0..width {
        let idx = self.mask_index(x, y);
        let is_crosshair = matches!(self.mask[idx], MaskClass::Crosshair);
        match (state, is_crosshair) {
          (RunState::None, true) => {
            canvas.set(x, y, border_color);
            state = RunState::Border;
            run_len = 1;
          }
          (RunState::Border | RunState::Fill, true) => {
            canvas.set(x, y, fill_color);
            state = RunState::Fill;
            run_len += 1;
          }
          (RunState::Border | RunState::Fill, false) => {
            if state == RunState::Fill && run_len > 1 {
              canvas.set(x - 1, y, border_color);
            }
            state = RunState::None;
            run_len = 0;
          }
          (RunState::None, false) => {}
        }
      }
      if state == RunState::Fill && run_len > 1 {
        canvas.set(width - 1, y, border_color);
      }
    }

    for x in 0..width {
      let mut state = RunState::None;
      let mut run_len = 0u32;
      for y in 0..height {
        let idx = self.mask_index(x, y);
        let is_crosshair = matches!(self.mask[idx], MaskClass::Crosshair);
        match (state, is_crosshair) {
          (RunState::None, true) => {
            canvas.set(x, y, border_color);
            state = RunState::Border;
            run_len = 1;
          }
          (RunState::Border | RunState::Fill, true) => {
            state = RunState::Fill;
            run_len += 1;
          }
          (RunState::Border | RunState::Fill, false) => {
            if state == RunState::Fill && run_len > 1 {
              canvas.set(x, y - 1, border_color);
            }
            state = RunState::None;
            run_len = 0;
          }
          (RunState::None, false) => {}
        }
      }
      if state == RunState::Fill && run_len > 1 {
        canvas.set(x, height - 1, border_color);
      }
    }

    Ok(())
  }
}

fn quantize(entry: palette::PaletteEntry, quantization: Quantization) -> ThermalResult<(u8, u8)> {
  let unc = entry.width;
  let value = match quantization {
    Quantization::Exact => {
      if entry.width != 1 {
        return Err(ThermalError::new(ErrorReason::AssertFail, ErrorSource::Thermal));
      }
      entry.base
    }
    Quantization::Floor => entry.base,
    Quantization::Ceiling => entry.base + (entry.width - 1),
    Quantization::MedianLow => entry.base + (entry.width - 1) / 2,
    Quantization::MedianHigh => entry.base + entry.width / 2,
  };
  Ok((value, unc))
}

#[allow(clippy::too_many_arguments)]
fn replacement_value(
  interpolation: Interpolation,
  mask: &[MaskClass],
  points: &[IntensityPoint],
  x: u32,
  y: u32,
  width: u32,
  height: u32,
  value_min: u8,
  value_max: u8,
  mean_value: u8,
) -> u8 {
  match interpolation {
    Interpolation::Zero => 0,
    Interpolation::Min => value_min,
    Interpolation::Max => value_max,
    Interpolation::Med => mean_value,
    Interpolation::SquareSmall => {
      let (sum, count) = accumulate_square(mask, points, x, y, width, height, 2, 1);
      mean_of(sum, count)
    }
    Interpolation::SquareWeight => {
      let (sum, count) = square_weight_sum(mask, points, x, y, width, height);
      mean_of(sum, count)
    }
    Interpolation::SquareLarge => {
      let (mut sum, mut count) = accumulate_square(mask, points, x, y, width, height, 6, 1);
      let (s, c) = square_weight_sum(mask, points, x, y, width, height);
      sum += s;
      count += c;
      let (s, c) = accumulate_square(mask, points, x, y, width, height, 2, 1);
      sum += s;
      count += c;
      mean_of(sum, count)
    }
  }
}

fn square_weight_sum(
  mask: &[MaskClass],
  points: &[IntensityPoint],
  x: u32,
  y: u32,
  width: u32,
  height: u32,
) -> (u64, u64) {
  let (mut sum, mut count) = accumulate_square(mask, points, x, y, width, height, 2, 1);
  let (s, c) = accumulate_square(mask, points, x, y, width, height, 1, 4);
  sum += s;
  count += c;
  (sum, count)
}

fn accumulate_square(
  mask: &[MaskClass],
  points: &[IntensityPoint],
  cx: u32,
  cy: u32,
  width: u32,
  height: u32,
  radius: i32,
  weight: u64,
) -> (u64, u64) {
  let mut sum = 0u64;
  let mut count = 0u64;
  for dy in -radius..=radius {
    for dx in -radius..=radius {
      let nx = cx as i32 + dx;
      let ny = cy as i32 + dy;
      if nx < 0 || ny < 0 || nx as u32 >= width || ny as u32 >= height {
        continue;
      }
      let idx = crate::canvas::xy_to_index(nx as u32, ny as u32, width);
      if mask[idx] == MaskClass::Image {
        sum += weight * u64::from(points[idx].value);
        count += weight;
      }
    }
  }
  (sum, count)
}

#[inline]
fn mean_of(sum: u64, count: u64) -> u8 {
  if count == 0 {
    0
  } else {
    (sum / count) as u8
  }
}

/// Rounds `numerator / denom` to the nearest integer, rounding the
/// magnitude up when the remainder's magnitude is at least half of
/// `denom` — used for the Fahrenheit-to-Celsius conversion's denominator
/// of 9.
fn div_round(numerator: i32, denom: i32) -> i32 {
  let q = numerator / denom;
  let r = numerator % denom;
  if r.abs() * 2 >= denom.abs() {
    q + numerator.signum()
  } else {
    q
  }
}

fn fahrenheit_tenths_to_celsius_tenths(tenths_f: i32) -> i32 {
  div_round((tenths_f - 320) * 5, 9)
}

fn parse_temperature(s: &str) -> ThermalResult<i32> {
  let err = || ThermalError::new(ErrorReason::Syntax, ErrorSource::Thermal);
  let bytes = s.as_bytes();
  let mut i = 0usize;
  let negative = bytes.first() == Some(&b'-');
  if negative {
    i += 1;
  }
  let digits_start = i;
  while bytes.get(i).is_some_and(u8::is_ascii_digit) {
    i += 1;
  }
  if i == digits_start {
    return Err(err());
  }
  let int_part: i32 = s[digits_start..i].parse().map_err(|_| err())?;
  if bytes.get(i) != Some(&b'.') {
    return Err(err());
  }
  i += 1;
  let frac_pos = i;
  if !bytes.get(i).is_some_and(u8::is_ascii_digit) {
    return Err(err());
  }
  i += 1;
  if i != bytes.len().saturating_sub(1) {
    return Err(err());
  }
  let frac: i32 = s[frac_pos..i].parse().map_err(|_| err())?;
  let magnitude = int_part * 10 + frac;
  let tenths = if negative { -magnitude } else { magnitude };
  match bytes[i] {
    b'C' => Ok(tenths),
    b'F' => Ok(fahrenheit_tenths_to_celsius_tenths(tenths)),
    _ => Err(err()),
  }
}

fn parse_emissivity(s: &str) -> ThermalResult<u8> {
  let err = || ThermalError::new(ErrorReason::Syntax, ErrorSource::Thermal);
  let bytes = s.as_bytes();
  if bytes.len() != 6 || &bytes[0..4] != b"E:0." {
    return Err(err());
  }
  if !bytes[4].is_ascii_digit() || !bytes[5].is_ascii_digit() {
    return Err(err());
  }
  let dd: u8 = s[4..6].parse().map_err(|_| err())?;
  if dd == 0 {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Thermal));
  }
  Ok(dd)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn temperature_parses_celsius_directly() {
    assert_eq!(parse_temperature("-10.5C").unwrap(), -105);
  }

  #[test]
  fn temperature_converts_fahrenheit_exactly_when_evenly_divisible() {
    assert_eq!(parse_temperature("023.0F").unwrap(), -50);
  }

  #[test]
  fn temperature_rejects_garbage() {
    assert!(parse_temperature("abc").is_err());
    assert!(parse_temperature("12.34C").is_err());
    assert!(parse_temperature("12.3K").is_err());
  }

  #[test]
  fn emissivity_parses_percent() {
    assert_eq!(parse_emissivity("E:0.95").unwrap(), 95);
  }

  #[test]
  fn emissivity_rejects_zero() {
    let err = parse_emissivity("E:0.00").unwrap_err();
    assert_eq!(err.reason(), ErrorReason::ImageShape);
  }

  #[test]
  fn div_round_rounds_half_up_by_magnitude() {
    assert_eq!(div_round(44, 9), 5); // 44/9 = 4.88..
    assert_eq!(div_round(40, 9), 4); // 40/9 = 4.44..
    assert_eq!(div_round(-450, 9), -50);
  }

  fn make_solid_context(width: u32, height: u32, color: Color) -> ThermalContext {
    let mut visible = Canvas::create(width, height).unwrap();
    for y in 0..height {
      for x in 0..width {
        visible.set(x, y, color);
      }
    }
    let text = Canvas::create(1, 1).unwrap();
    let mask = vec![MaskClass::Image; (width * height) as usize];
    ThermalContext {
      visible_image: visible,
      text_image: text,
      model: Model::Unknown,
      aperture: Rect::default(),
      mask,
      palette: Some(PaletteIndex::Iron),
      temperature_tenths_c: None,
      emissivity_percent: None,
      intensity_image: None,
      value_min: None,
      value_max: None,
      mean_value: None,
    }
  }

  #[test]
  fn process_floor_round_trips_a_tiny_iron_canvas() {
    let entries = PaletteIndex::Iron.entries();
    let mut ctx = make_solid_context(4, 2, entries[0].color);
    for (i, e) in [entries[0], entries[1], entries[2], entries[3], entries[4], entries[5], entries[6], entries[7]]
      .iter()
      .enumerate()
    {
      let x = (i % 4) as u32;
      let y = (i / 4) as u32;
      ctx.visible_image.set(x, y, e.color);
    }
    ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();
    let image = ctx.intensity_image().unwrap();
    for (i, e) in [entries[0], entries[1], entries[2], entries[3], entries[4], entries[5], entries[6], entries[7]]
      .iter()
      .enumerate()
    {
      assert_eq!(image.points()[i].value, e.base);
    }
  }

  #[test]
  fn crosshair_interpolation_fills_center_from_neighbors() {
    let entries = PaletteIndex::Iron.entries();
    let color_for = |v: u8| palette::find_value_raw(entries, v).unwrap().color;
    let mut ctx = make_solid_context(5, 5, color_for(100));
    let center_idx = crate::canvas::xy_to_index(2, 2, 5);
    ctx.mask[center_idx] = MaskClass::Crosshair;
    ctx.process(Interpolation::SquareSmall, Quantization::Floor).unwrap();
    let image = ctx.intensity_image().unwrap();
    let point = image.points()[center_idx];
    assert_eq!(point.value, entries.iter().find(|e| e.covers(100)).unwrap().base);
    assert_eq!(point.uncertainty, 1);
  }

  #[test]
  fn zero_interpolation_shortcut_writes_zero_everywhere_occluded() {
    let entries = PaletteIndex::Iron.entries();
    let color_for = |v: u8| palette::find_value_raw(entries, v).unwrap().color;
    let mut ctx = make_solid_context(3, 3, color_for(50));
    for idx in [0usize, 4, 8] {
      ctx.mask[idx] = MaskClass::Crosshair;
    }
    ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();
    let image = ctx.intensity_image().unwrap();
    for idx in [0usize, 4, 8] {
      assert_eq!(image.points()[idx], IntensityPoint { value: 0, uncertainty: 1 });
    }
  }

  #[test]
  fn export_round_trips_exact_quantization() {
    let entries = PaletteIndex::Iron.entries();
    let mut ctx = make_solid_context(2, 1, entries[0].color);
    ctx.visible_image.set(1, 0, entries[3].color);
    ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();
    let out = ctx.export(PaletteIndex::Iron).unwrap();
    assert_eq!(out.get(0, 0), Some(entries[0].color));
    assert_eq!(out.get(1, 0), Some(entries[3].color));
  }

  #[test]
  fn process_without_any_occlusion_still_reports_real_min_max_mean() {
    let entries = PaletteIndex::Iron.entries();
    let mut ctx = make_solid_context(2, 2, entries[2].color);
    ctx.visible_image.set(1, 1, entries[8].color);
    ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();
    let (min, max) = ctx.value_range().unwrap();
    assert_eq!(min, entries[2].base);
    assert_eq!(max, entries[8].base);
    assert!(ctx.mean_value().is_some());
  }

  #[test]
  fn reprocessing_an_already_processed_context_is_an_error() {
    let entries = PaletteIndex::Iron.entries();
    let mut ctx = make_solid_context(2, 1, entries[0].color);
    ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();
    assert!(ctx.process(Interpolation::Zero, Quantization::Floor).is_err());
  }

  #[test]
  fn crosshair_restamp_paints_border_then_fill_with_right_cap() {
    let mut ctx = make_solid_context(6, 1, Color::BLACK);
    for idx in 1..5 {
      ctx.mask[idx] = MaskClass::Crosshair;
    }
    let mut canvas = Canvas::create(6, 1).unwrap();
    ctx.crosshair(Color::BLACK, Color::WHITE, &mut canvas).unwrap();
    assert_eq!(canvas.get(1, 0), Some(Color::BLACK));
    assert_eq!(canvas.get(2, 0), Some(Color::WHITE));
    assert_eq!(canvas.get(3, 0), Some(Color::WHITE));
    assert_eq!(canvas.get(4, 0), Some(Color::BLACK)); // right cap
  }
}
