//! Decodes a BMP file's bytes into a [`Canvas`].

use alloc::vec;
use alloc::vec::Vec;

use super::header::{
  try_pull_pod, BitmapFileHeader, BitmapInfoHeader, BI_BITFIELDS, BI_RGB, INFO_HEADER_SIZE,
  MASK_B16, MASK_G16, MASK_R16,
};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};

fn format_err() -> ThermalError {
  ThermalError::new(ErrorReason::Format, ErrorSource::Bitmap)
}

/// Decodes a full BMP file's bytes.
///
/// Handles exactly the three depths this crate contracts for: 16bpp
/// `BI_BITFIELDS` with masks `0xF800/0x07E0/0x001F`, 24bpp `BI_RGB`, 32bpp
/// `BI_RGB`. Negative DIB height (top-down) is canonical; a positive-height
/// (bottom-up) file is flipped into top-down order on load.
///
/// ## Errors
/// `Format`/`Bitmap` for a short file, a bad magic, a non-40-byte info
/// header, an unsupported bit depth or compression/mask combination, or
/// pixel data too short for the declared geometry. `ImageShape`/`Bitmap` if
/// the declared width or height is zero.
pub fn decode(bytes: &[u8]) -> ThermalResult<Canvas> {
  let (file_header, rest) = try_pull_pod::<BitmapFileHeader>(bytes)?;
  if file_header.magic != [b'B', b'M'] {
    return Err(format_err());
  }
  let (info, rest) = try_pull_pod::<BitmapInfoHeader>(rest)?;
  if info.size.get() != INFO_HEADER_SIZE as u32 {
    return Err(format_err());
  }

  let width = info.width.get();
  let raw_height = info.height.get();
  if width <= 0 || raw_height == 0 {
    return Err(ThermalError::new(ErrorReason::ImageShape, ErrorSource::Bitmap));
  }
  let width = width as u32;
  let height = raw_height.unsigned_abs();
  let top_down = raw_height < 0;

  let bits_per_pixel = info.bits_per_pixel.get();
  let compression = info.compression.get();

  let pixel_reader: fn(&[u8]) -> Color = match (bits_per_pixel, compression) {
    (16, BI_BITFIELDS) => {
      let (masks, _) = try_pull_pod::<[pack1::U32LE; 3]>(rest)?;
      let (r, g, b) = (masks[0].get(), masks[1].get(), masks[2].get());
      if (r, g, b) != (MASK_R16, MASK_G16, MASK_B16) {
        return Err(format_err());
      }
      read_pixel_16
    }
    (24, BI_RGB) => read_pixel_24,
    (32, BI_RGB) => read_pixel_32,
    _ => return Err(format_err()),
  };
  let bytes_per_pixel = (bits_per_pixel / 8) as usize;

  let pixel_offset = file_header.pixel_offset.get() as usize;
  let pixel_data = bytes.get(pixel_offset..).ok_or_else(format_err)?;

  let row_stride = padded_row_stride(width, bits_per_pixel);
  let needed = row_stride.checked_mul(height as usize).ok_or_else(format_err)?;
  if pixel_data.len() < needed {
    return Err(format_err());
  }

  let mut pixels = vec![Color::BLACK; (width as usize) * (height as usize)];
  for file_row in 0..height {
    let row_bytes = &pixel_data[(file_row as usize) * row_stride..][..row_stride];
    // The file's rows run bottom-up unless `top_down`; either way, convert
    // to this crate's top-down-always in-memory convention.
    let dest_row = if top_down { file_row } else { height - 1 - file_row };
    for x in 0..width {
      let start = (x as usize) * bytes_per_pixel;
      let color = pixel_reader(&row_bytes[start..start + bytes_per_pixel]);
      pixels[(dest_row * width + x) as usize] = color;
    }
  }

  Canvas::from_pixels(width, height, pixels)
}

#[inline]
fn padded_row_stride(width: u32, bits_per_pixel: u16) -> usize {
  let bits_per_row = (width as usize) * (bits_per_pixel as usize);
  let bytes_per_row = bits_per_row.div_ceil(8);
  bytes_per_row.div_ceil(4) * 4
}

fn read_pixel_16(bytes: &[u8]) -> Color {
  Color(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_pixel_24(bytes: &[u8]) -> Color {
  // BMP's direct-color byte order is `[b, g, r]`.
  Color::from_rgb8(bytes[2], bytes[1], bytes[0])
}

fn read_pixel_32(bytes: &[u8]) -> Color {
  Color::from_rgb8(bytes[2], bytes[1], bytes[0])
}
