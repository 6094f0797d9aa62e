//! Thin CLI driver over the `thermview` library: loads a screenshot BMP,
//! runs the recovery pipeline, and writes a rendered BMP (or prints the
//! OCR'd readings). Argument parsing is hand-rolled, as befits a small
//! debug harness rather than the crate's core concern — not worth pulling
//! in an argument-parsing dependency for.

use std::env;
use std::process::ExitCode;

use thermview::locator;
use thermview::palette::{MaxErrors, PaletteIndex};
use thermview::thermal::{Interpolation, Quantization, ThermalContext};
use thermview::{bmp, Color};

fn main() -> ExitCode {
  let args: Vec<String> = env::args().collect();
  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(message) => {
      eprintln!("thermview: {message}");
      ExitCode::FAILURE
    }
  }
}

fn run(args: &[String]) -> Result<(), String> {
  match args.get(1).map(String::as_str) {
    Some("recover") => recover(&args[2..]),
    Some("info") => info(&args[2..]),
    _ => Err(usage()),
  }
}

fn usage() -> String {
  "usage:\n  \
   thermview recover <input.bmp> <output.bmp> [--palette iron|grayscale|rainbow] \
   [--interp zero|min|max|med|square-small|square-weight|square-large] \
   [--quant exact|floor|ceiling|median-low|median-high] [--restamp]\n  \
   thermview info <input.bmp>"
    .into()
}

fn recover(args: &[String]) -> Result<(), String> {
  let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
  let (input, output) = match positional.as_slice() {
    [input, output] => (input.as_str(), output.as_str()),
    _ => return Err(usage()),
  };

  let palette = parse_flag(args, "--palette")
    .map(parse_palette)
    .transpose()?
    .unwrap_or(PaletteIndex::Iron);
  let interpolation = parse_flag(args, "--interp")
    .map(parse_interpolation)
    .transpose()?
    .unwrap_or(Interpolation::SquareSmall);
  let quantization = parse_flag(args, "--quant")
    .map(parse_quantization)
    .transpose()?
    .unwrap_or(Quantization::Floor);
  let restamp = args.iter().any(|a| a == "--restamp");

  let bytes = std::fs::read(input).map_err(|e| format!("reading {input}: {e}"))?;
  let screenshot = bmp::load(&bytes).map_err(|e| format!("decoding {input}: {e}"))?;
  let located = locator::locate(&screenshot).map_err(|e| format!("locating crosshair: {e}"))?;
  let mut ctx = ThermalContext::create(located).map_err(|e| format!("building context: {e}"))?;

  ctx
    .determine_palette(MaxErrors::Count(16))
    .map_err(|e| format!("determining palette: {e}"))?;
  // OCR failures are common on synthetic/cropped inputs; recovery of the
  // intensity image doesn't depend on it, so a bad reading is reported but
  // doesn't abort the pipeline.
  if let Err(e) = ctx.ocr() {
    eprintln!("thermview: warning: OCR failed: {e}");
  }
  ctx.process(interpolation, quantization).map_err(|e| format!("processing: {e}"))?;

  let mut rendered = ctx.export(palette).map_err(|e| format!("exporting: {e}"))?;
  if restamp {
    ctx
      .crosshair(Color::BLACK, Color::WHITE, &mut rendered)
      .map_err(|e| format!("restamping crosshair: {e}"))?;
  }

  let out_bytes = bmp::save(&rendered, bmp::BitDepth::Bpp24);
  std::fs::write(output, out_bytes).map_err(|e| format!("writing {output}: {e}"))?;

  if let (Some(temp), Some(emissivity)) = (ctx.temperature_tenths_c(), ctx.emissivity_percent()) {
    println!("model: {:?}, spot: {:.1}C, emissivity: {}%", ctx.model(), f64::from(temp) / 10.0, emissivity);
  }
  Ok(())
}

fn info(args: &[String]) -> Result<(), String> {
  let input = args.first().ok_or_else(usage)?;
  let bytes = std::fs::read(input).map_err(|e| format!("reading {input}: {e}"))?;
  let screenshot = bmp::load(&bytes).map_err(|e| format!("decoding {input}: {e}"))?;
  let located = locator::locate(&screenshot).map_err(|e| format!("locating crosshair: {e}"))?;
  let model = located.model();
  let mut ctx = ThermalContext::create(located).map_err(|e| format!("building context: {e}"))?;
  ctx.ocr().map_err(|e| format!("OCR: {e}"))?;

  println!("model: {model:?}");
  if let Some(temp) = ctx.temperature_tenths_c() {
    println!("spot temperature: {:.1}C", f64::from(temp) / 10.0);
  }
  if let Some(emissivity) = ctx.emissivity_percent() {
    println!("emissivity: {emissivity}%");
  }
  Ok(())
}

fn parse_flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
  args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).map(String::as_str)
}

fn parse_palette(s: &str) -> Result<PaletteIndex, String> {
  match s {
    "iron" => Ok(PaletteIndex::Iron),
    "grayscale" => Ok(PaletteIndex::Grayscale),
    "rainbow" => Ok(PaletteIndex::Rainbow),
    other => Err(format!("unknown palette {other:?}")),
  }
}

fn parse_interpolation(s: &str) -> Result<Interpolation, String> {
  match s {
    "zero" => Ok(Interpolation::Zero),
    "min" => Ok(Interpolation::Min),
    "max" => Ok(Interpolation::Max),
    "med" => Ok(Interpolation::Med),
    "square-small" => Ok(Interpolation::SquareSmall),
    "square-weight" => Ok(Interpolation::SquareWeight),
    "square-large" => Ok(Interpolation::SquareLarge),
    other => Err(format!("unknown interpolation mode {other:?}")),
  }
}

fn parse_quantization(s: &str) -> Result<Quantization, String> {
  match s {
    "exact" => Ok(Quantization::Exact),
    "floor" => Ok(Quantization::Floor),
    "ceiling" => Ok(Quantization::Ceiling),
    "median-low" => Ok(Quantization::MedianLow),
    "median-high" => Ok(Quantization::MedianHigh),
    other => Err(format!("unknown quantization mode {other:?}")),
  }
}
