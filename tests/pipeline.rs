//! End-to-end tests driving the public pipeline: BMP decode, locate, OCR-free
//! palette determination, two-pass processing, export, and BMP encode.

use thermview::bmp::{self, BitDepth};
use thermview::locator::{self, Model, IR_ORIGIN, IR_SIZE, SCREENSHOT_HEIGHT, SCREENSHOT_WIDTH};
use thermview::palette::{self, MaxErrors, PaletteIndex};
use thermview::thermal::{Interpolation, Quantization, ThermalContext};
use thermview::{Canvas, Color};

fn blank_screenshot() -> Canvas {
  Canvas::create(SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT).unwrap()
}

fn fill_ir_region(shot: &mut Canvas, color: Color) {
  for y in 0..IR_SIZE.1 {
    for x in 0..IR_SIZE.0 {
      shot.set(IR_ORIGIN.0 + x, IR_ORIGIN.1 + y, color);
    }
  }
}

/// Paints a Model A crosshair cross-section (`BORDER FILL{7} BORDER EYE{5}
/// BORDER FILL{7} BORDER`) on a single row, anchored at `origin` in
/// screenshot-global coordinates.
fn paint_model_a_row(shot: &mut Canvas, origin: (u32, u32)) {
  const FILL_WIDTH: u32 = 7;
  const EYE_SIZE: u32 = 5;
  let y = origin.1;
  let mut x = origin.0;
  shot.set(x, y, Color::BLACK);
  x += 1;
  for _ in 0..FILL_WIDTH {
    shot.set(x, y, Color::WHITE);
    x += 1;
  }
  shot.set(x, y, Color::BLACK);
  x += 1;
  for _ in 0..EYE_SIZE {
    shot.set(x, y, Color::from_rgb8(0, 128, 0));
    x += 1;
  }
  shot.set(x, y, Color::BLACK);
  x += 1;
  for _ in 0..FILL_WIDTH {
    shot.set(x, y, Color::WHITE);
    x += 1;
  }
  shot.set(x, y, Color::BLACK);
}

#[test]
fn bmp_round_trip_feeds_a_blank_screenshot_through_the_locator() {
  let shot = blank_screenshot();
  let bytes = bmp::save(&shot, BitDepth::Bpp24);
  let reloaded = bmp::load(&bytes).unwrap();

  let located = locator::locate(&reloaded).unwrap();
  assert_eq!(located.model(), Model::Unknown);
  assert_eq!((located.ir_canvas().width(), located.ir_canvas().height()), IR_SIZE);
}

#[test]
fn full_pipeline_recovers_a_solid_iron_fill_and_repairs_the_crosshair() {
  let palette_index = PaletteIndex::Iron;
  let background = palette_index.entries()[5].color;

  let mut shot = blank_screenshot();
  fill_ir_region(&mut shot, background);
  // Crosshair sits inside the IR region, well clear of its edges.
  paint_model_a_row(&mut shot, (IR_ORIGIN.0 + 40, IR_ORIGIN.1 + 40));

  let located = locator::locate(&shot).unwrap();
  assert_eq!(located.model(), Model::ModelA);

  let mut ctx = ThermalContext::create(located).unwrap();
  let determined = ctx.determine_palette(MaxErrors::Count(16)).unwrap();
  assert_eq!(determined, palette_index);

  ctx.process(Interpolation::SquareSmall, Quantization::Floor).unwrap();

  // Every pixel under the crosshair must have been repaired to some value;
  // a second `process` call on the same context is rejected.
  let image = ctx.intensity_image().unwrap();
  assert_eq!(image.points().len(), (IR_SIZE.0 * IR_SIZE.1) as usize);
  assert!(ctx.process(Interpolation::SquareSmall, Quantization::Floor).is_err());

  let (min, max) = ctx.value_range().unwrap();
  assert!(min <= max);
  assert!(ctx.mean_value().is_some());

  let rendered = ctx.export(palette_index).unwrap();
  assert_eq!((rendered.width(), rendered.height()), IR_SIZE);

  // The background everywhere outside the crosshair's bounding box must
  // round-trip back to the same color it was recovered from.
  let corner = rendered.get(0, 0).unwrap();
  assert_eq!(corner, background);

  let out_bytes = bmp::save(&rendered, BitDepth::Bpp24);
  let reloaded = bmp::load(&out_bytes).unwrap();
  assert_eq!(reloaded.get(0, 0), Some(background));
}

#[test]
fn zero_interpolation_leaves_repaired_pixels_at_the_floor() {
  let palette_index = PaletteIndex::Grayscale;
  let background = palette_index.entries()[8].color;

  let mut shot = blank_screenshot();
  fill_ir_region(&mut shot, background);
  paint_model_a_row(&mut shot, (IR_ORIGIN.0 + 30, IR_ORIGIN.1 + 30));

  let located = locator::locate(&shot).unwrap();
  let mut ctx = ThermalContext::create(located).unwrap();
  ctx.determine_palette(MaxErrors::Count(16)).unwrap();
  ctx.process(Interpolation::Zero, Quantization::Floor).unwrap();

  let rendered = ctx.export(palette_index).unwrap();
  // The crosshair's bounding box sits at local (30, 19); (35, 24) is 5
  // pixels in from its top-left corner, inside the opaque top-left ring
  // rectangle (not the transparent center aperture). Repaired with `Zero`,
  // it renders back to whatever palette entry covers intensity 0.
  let crosshair_pixel = rendered.get(35, 24).unwrap();
  assert_eq!(crosshair_pixel, palette_index.entries()[0].color);
}

#[test]
fn determine_palette_rejects_an_ambiguous_tie_through_the_context() {
  // The rest of the IR region stays default black, which `determine` skips
  // entirely; the tie comes from exactly one pixel each of a color unique
  // to IRON and a color unique to GRAYSCALE, leaving both at one hit and
  // RAINBOW at zero.
  let mut shot = blank_screenshot();
  shot.set(IR_ORIGIN.0, IR_ORIGIN.1, PaletteIndex::Iron.entries()[2].color);
  shot.set(IR_ORIGIN.0 + 1, IR_ORIGIN.1, PaletteIndex::Grayscale.entries()[3].color);

  let located = locator::locate(&shot).unwrap();
  let mut ctx = ThermalContext::create(located).unwrap();
  assert!(ctx.determine_palette(MaxErrors::Ignore).is_err());
}

#[test]
fn processing_before_a_palette_is_determined_is_rejected() {
  let shot = blank_screenshot();
  let located = locator::locate(&shot).unwrap();
  let mut ctx = ThermalContext::create(located).unwrap();
  assert!(ctx.process(Interpolation::Min, Quantization::Floor).is_err());
}

#[test]
fn unknown_model_still_yields_a_usable_context() {
  let mut shot = blank_screenshot();
  fill_ir_region(&mut shot, PaletteIndex::Rainbow.entries()[3].color);

  let located = locator::locate(&shot).unwrap();
  assert_eq!(located.model(), Model::Unknown);

  let mut ctx = ThermalContext::create(located).unwrap();
  let determined = ctx.determine_palette(MaxErrors::Count(0)).unwrap();
  assert_eq!(determined, PaletteIndex::Rainbow);
  ctx.process(Interpolation::Med, Quantization::Floor).unwrap();
  assert!(ctx.export(PaletteIndex::Rainbow).is_ok());
}

#[test]
fn palette_determine_matches_the_context_level_result_directly() {
  let mut shot = blank_screenshot();
  fill_ir_region(&mut shot, PaletteIndex::Grayscale.entries()[12].color);
  let located = locator::locate(&shot).unwrap();
  let ir_canvas_index = palette::determine(located.ir_canvas(), MaxErrors::Ignore).unwrap();
  assert_eq!(ir_canvas_index, PaletteIndex::Grayscale);
}
