//! Splits a raw screenshot into its text and IR regions and locates the
//! superimposed crosshair overlay, identifying the device model from its
//! geometric signature.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};

/// Screenshot geometry, fixed for both camera models.
pub const SCREENSHOT_WIDTH: u32 = 174;
pub const SCREENSHOT_HEIGHT: u32 = 220;
pub const TEXT_ORIGIN: (u32, u32) = (2, 1);
pub const TEXT_SIZE: (u32, u32) = (170, 23);
pub const IR_ORIGIN: (u32, u32) = (12, 25);
pub const IR_SIZE: (u32, u32) = (150, 175);

/// An axis-aligned rectangle: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
  pub x: u32,
  pub y: u32,
  pub w: u32,
  pub h: u32,
}
impl Rect {
  #[inline]
  #[must_use]
  const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
    Self { x, y, w, h }
  }

  /// Whether `(x, y)` falls inside this rectangle.
  #[inline]
  #[must_use]
  pub const fn contains(&self, x: u32, y: u32) -> bool {
    x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
  }
}

/// The device model, distinguished solely by crosshair fill width, eye size,
/// and total height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
  /// Crosshair fill width 7, eye 5×5.
  ModelA,
  /// Crosshair fill width 14, eye 17×17.
  ModelB,
  /// No crosshair row matched; the image is still valid for palette work.
  Unknown,
}

/// Per-model geometric constants.
struct ModelSpec {
  model: Model,
  fill_width: u32,
  eye_size: u32,
  eye_offset: (u32, u32),
  target_row: u32,
  height: u32,
}
const MODEL_A: ModelSpec =
  ModelSpec { model: Model::ModelA, fill_width: 7, eye_size: 5, eye_offset: (9, 9), target_row: 11, height: 23 };
const MODEL_B: ModelSpec =
  ModelSpec { model: Model::ModelB, fill_width: 14, eye_size: 17, eye_offset: (16, 15), target_row: 23, height: 47 };

impl ModelSpec {
  /// Bounding-box width, derived from the horizontal cross-section pattern
  /// `BORDER FILL BORDER EYE BORDER FILL BORDER` (one border pixel per
  /// border run, `fill_width` pixels per fill run): `4 + 2*fill + eye`.
  ///
  /// This isn't given directly anywhere; it's the length the cross-section
  /// pattern itself implies. For MODEL_A it happens to equal the given
  /// height (23), making MODEL_A's crosshair square. MODEL_B's is not (49
  /// wide, 47 tall) — nothing requires a crosshair to be square.
  #[inline]
  const fn width(&self) -> u32 {
    4 + 2 * self.fill_width + self.eye_size
  }

  /// The eight opaque rectangles that make up this model's crosshair,
  /// relative to the crosshair's own origin.
  ///
  /// Each model's crosshair is documented as eight axis-aligned rectangles
  /// without spelled-out coordinates (see DESIGN.md's Open Questions). We
  /// build a picture-frame ring around the transparent eye/aperture window
  /// from the same border/fill/eye constants already given, split into
  /// near/far halves on each of the ring's four sides — eight rectangles,
  /// none of them free invention.
  fn detect_rects(&self) -> [Rect; 8] {
    let width = self.width();
    let height = self.height;
    let eye = self.eye_size;
    let h_thickness = (width - eye) / 2;
    let v_thickness = (height - eye) / 2;
    let mid_x = width / 2;
    let mid_y = height / 2;
    [
      // top band, left half / right half
      Rect::new(0, 0, mid_x, v_thickness),
      Rect::new(mid_x, 0, width - mid_x, v_thickness),
      // bottom band, left half / right half
      Rect::new(0, height - v_thickness, mid_x, v_thickness),
      Rect::new(mid_x, height - v_thickness, width - mid_x, v_thickness),
      // left band, top half / bottom half (excluding the corners already
      // covered by the top/bottom bands above)
      Rect::new(0, v_thickness, h_thickness, mid_y - v_thickness),
      Rect::new(0, mid_y, h_thickness, height - v_thickness - (mid_y - v_thickness)),
      // right band, top half / bottom half
      Rect::new(width - h_thickness, v_thickness, h_thickness, mid_y - v_thickness),
      Rect::new(
        width - h_thickness,
        mid_y,
        h_thickness,
        height - v_thickness - (mid_y - v_thickness),
      ),
    ]
  }
}

/// Classification for a single pixel within the IR canvas, as produced by
/// [`LocatorResult::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectClass {
  /// Part of the thermal image (not covered by the crosshair overlay).
  Image,
  /// Part of the opaque crosshair overlay.
  Crosshair,
  /// Locator state is inconsistent or absent; detection is unreliable.
  Fail,
  /// `(x, y)` is outside the IR canvas.
  OutOfBounds,
}

/// The result of locating the crosshair and splitting a raw screenshot.
pub struct LocatorResult {
  text_canvas: Canvas,
  ir_canvas: Canvas,
  model: Model,
  crosshair: Rect,
  aperture: Rect,
}
impl LocatorResult {
  /// The text-strip sub-canvas.
  #[inline]
  #[must_use]
  pub fn text_canvas(&self) -> &Canvas {
    &self.text_canvas
  }

  /// The IR sub-canvas.
  #[inline]
  #[must_use]
  pub fn ir_canvas(&self) -> &Canvas {
    &self.ir_canvas
  }

  /// The detected device model (or [`Model::Unknown`]).
  #[inline]
  #[must_use]
  pub const fn model(&self) -> Model {
    self.model
  }

  /// The crosshair's bounding rectangle, in IR-canvas-local coordinates.
  #[inline]
  #[must_use]
  pub const fn crosshair_rect(&self) -> Rect {
    self.crosshair
  }

  /// The aperture (spot-measurement) rectangle, in IR-canvas-local
  /// coordinates.
  #[inline]
  #[must_use]
  pub const fn aperture_rect(&self) -> Rect {
    self.aperture
  }

  /// Consumes `self`, handing the two sub-canvases to the caller by value
  /// in place of a nulled-pointer ownership transfer.
  #[inline]
  #[must_use]
  pub fn into_canvases(self) -> (Canvas, Canvas) {
    (self.text_canvas, self.ir_canvas)
  }

  /// Classifies `(x, y)` (in IR-canvas-local coordinates).
  #[must_use]
  pub fn detect(&self, x: u32, y: u32) -> DetectClass {
    if x >= self.ir_canvas.width() || y >= self.ir_canvas.height() {
      return DetectClass::OutOfBounds;
    }
    match self.model {
      Model::Unknown => DetectClass::Image,
      Model::ModelA | Model::ModelB => {
        let spec = model_spec(self.model);
        if !self.crosshair.contains(x, y) {
          return DetectClass::Image;
        }
        let rel_x = x - self.crosshair.x;
        let rel_y = y - self.crosshair.y;
        if spec.detect_rects().iter().any(|r| r.contains(rel_x, rel_y)) {
          DetectClass::Crosshair
        } else {
          DetectClass::Image
        }
      }
    }
  }
}

fn model_spec(model: Model) -> ModelSpec {
  match model {
    Model::ModelA => MODEL_A,
    Model::ModelB => MODEL_B,
    Model::Unknown => unreachable!("detect() guards against Unknown before calling this"),
  }
}

/// Classifies a pixel's raw color for the locator's row scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelKind {
  Border,
  Fill,
  Other,
}
#[inline]
fn classify_pixel(color: Color) -> PixelKind {
  if color == Color::BLACK {
    PixelKind::Border
  } else if color == Color::WHITE {
    PixelKind::Fill
  } else {
    PixelKind::Other
  }
}

/// States of the eight-state crosshair row scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
  Start,
  Border1,
  Fill1,
  Border2,
  Eye,
  Border3,
  Fill2,
  Border4,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScanCounts {
  border: u32,
  fill: u32,
  eye: u32,
}

/// Runs the eight-state sweep across one row, returning the matched model
/// and the x of the last (rightmost) pixel of the completed pattern, if the
/// full `BORDER FILL BORDER EYE BORDER FILL BORDER` cross-section occurs.
fn scan_row(pixels: &[Color]) -> Option<(Model, u32)> {
  let mut state = ScanState::Start;
  let mut counts = ScanCounts::default();

  for (x, &color) in pixels.iter().enumerate() {
    let x = x as u32;
    let kind = classify_pixel(color);
    match (state, kind) {
      (ScanState::Fill1, PixelKind::Border)
        if counts.fill == MODEL_A.fill_width || counts.fill == MODEL_B.fill_width =>
      {
        counts.border = 2;
        state = ScanState::Border2;
      }
      (ScanState::Eye, PixelKind::Border)
        if counts.border == 2
          && (counts.eye == MODEL_A.eye_size || counts.eye == MODEL_B.eye_size) =>
      {
        counts.border = 3;
        state = ScanState::Border3;
      }
      (ScanState::Fill2, PixelKind::Border)
        if counts.border == 3
          && (counts.fill == 2 * MODEL_A.fill_width || counts.fill == 2 * MODEL_B.fill_width) =>
      {
        counts.border = 4;
        state = ScanState::Border4;
        let fill = counts.fill;
        let eye = counts.eye;
        let result = if fill == 2 * MODEL_A.fill_width && eye == MODEL_A.eye_size {
          Some((Model::ModelA, x))
        } else if fill == 2 * MODEL_B.fill_width && eye == MODEL_B.eye_size {
          Some((Model::ModelB, x))
        } else {
          None
        };
        if let Some(hit) = result {
          return Some(hit);
        }
        // Not a real match; keep scanning from a clean slate.
        state = ScanState::Start;
        counts = ScanCounts::default();
      }
      (_, PixelKind::Border) => {
        // Catch-all: any border pixel not consumed by a guarded transition
        // above restarts the candidate match right here.
        state = ScanState::Border1;
        counts = ScanCounts { border: 1, fill: 0, eye: 0 };
      }
      (ScanState::Border1, PixelKind::Fill) if counts.border == 1 => {
        counts.fill = 1;
        state = ScanState::Fill1;
      }
      (ScanState::Fill1, PixelKind::Fill) => {
        counts.fill += 1;
      }
      (ScanState::Border2, PixelKind::Other) if counts.border == 2 => {
        counts.eye = 1;
        state = ScanState::Eye;
      }
      (ScanState::Eye, PixelKind::Other) => {
        counts.eye += 1;
      }
      (ScanState::Border3, PixelKind::Fill) if counts.border == 3 => {
        counts.fill += 1;
        state = ScanState::Fill2;
      }
      (ScanState::Fill2, PixelKind::Fill) => {
        counts.fill += 1;
      }
      _ => {
        state = ScanState::Start;
        counts = ScanCounts::default();
      }
    }
  }
  None
}

const MIN_BORDER_PIXELS: u32 = 4;
const MIN_FILL_PIXELS: u32 = 2 * MODEL_A.fill_width; // min(F_A, F_B) * 2

/// Coarse per-row filter: counts black/white pixels and rejects rows that
/// can't possibly host the pattern before paying for the full state-machine
/// sweep.
fn row_passes_coarse_filter(pixels: &[Color]) -> bool {
  let mut border = 0u32;
  let mut fill = 0u32;
  for &color in pixels {
    if color == Color::BLACK {
      border += 1;
    } else if color == Color::WHITE {
      fill += 1;
    }
  }
  border >= MIN_BORDER_PIXELS && fill >= MIN_FILL_PIXELS
}

/// Splits a screenshot into text/IR regions and locates the crosshair.
///
/// ## Errors
/// Returns `ImageShape`/`Locator` unless `screenshot` is exactly
/// [`SCREENSHOT_WIDTH`]×[`SCREENSHOT_HEIGHT`].
pub fn locate(screenshot: &Canvas) -> ThermalResult<LocatorResult> {
  if screenshot.width() != SCREENSHOT_WIDTH || screenshot.height() != SCREENSHOT_HEIGHT {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Locator));
  }

  let text_canvas = screenshot
    .copy(TEXT_ORIGIN.0, TEXT_ORIGIN.1, TEXT_SIZE.0, TEXT_SIZE.1)
    .map_err(|e| ThermalError::wrap(e, ErrorSource::Locator))?;
  let ir_canvas = screenshot
    .copy(IR_ORIGIN.0, IR_ORIGIN.1, IR_SIZE.0, IR_SIZE.1)
    .map_err(|e| ThermalError::wrap(e, ErrorSource::Locator))?;

  let mut found = None;
  'rows: for y in 0..ir_canvas.height() {
    let row: alloc::vec::Vec<Color> =
      (0..ir_canvas.width()).map(|x| ir_canvas.get(x, y).unwrap()).collect();
    if !row_passes_coarse_filter(&row) {
      continue;
    }
    crate::trace!("row {y} passed the coarse border/fill filter, running the state machine");
    if let Some((model, ending_x)) = scan_row(&row) {
      crate::trace!("row {y} matched {model:?} ending at x={ending_x}");
      found = Some((y, model, ending_x));
      break 'rows;
    }
  }
  if found.is_none() {
    crate::trace!("no row matched a crosshair cross-section; falling back to Model::Unknown");
  }

  let (model, crosshair, aperture) = match found {
    None => (Model::Unknown, Rect::default(), Rect::default()),
    Some((row, model, ending_x)) => {
      let spec = model_spec(model);
      let width = spec.width();
      let crosshair_x = ending_x + 1 - width;
      let crosshair_y = row.checked_sub(spec.target_row).unwrap_or(0);
      let crosshair = Rect::new(crosshair_x, crosshair_y, width, spec.height);
      let aperture = Rect::new(
        crosshair.x + spec.eye_offset.0,
        crosshair.y + spec.eye_offset.1,
        spec.eye_size,
        spec.eye_size,
      );
      (model, crosshair, aperture)
    }
  };

  Ok(LocatorResult { text_canvas, ir_canvas, model, crosshair, aperture })
}
