#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! Reverse-engineers thermal screenshots produced by two handheld infrared
//! camera models and recovers a semantic thermal image from the rendered
//! pixels.
//!
//! The input is a fixed-geometry bitmap combining a textual on-screen-display
//! strip, a false-color infrared image, and a superimposed crosshair overlay.
//! [`locator`] splits the screenshot and finds the crosshair and device
//! model, [`ocr`] reads the temperature/emissivity strip, [`palette`]
//! determines and inverts the IR color palette, and [`thermal`] composes all
//! of that into a recovered intensity image that can be re-rendered with any
//! supported palette.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Prints a trace message when the `trace` feature is enabled; compiles away
/// entirely otherwise.
#[macro_export]
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")] {
      ::std::print!("{file}:{line}> ", file = file!(), line = line!());
      ::std::println!($($arg)*);
    }
  }
}

pub mod bmp;
pub mod canvas;
pub mod color;
pub mod error;
pub mod locator;
pub mod ocr;
pub mod palette;
pub mod thermal;

pub use canvas::Canvas;
pub use color::Color;
pub use error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};
