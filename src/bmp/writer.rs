//! Encodes a [`Canvas`] into BMP file bytes.

use alloc::vec;
use alloc::vec::Vec;

use pack1::{I32LE, U16LE, U32LE};

use super::header::{
  BitmapFileHeader, BitmapInfoHeader, BITFIELDS_SIZE, BI_BITFIELDS, BI_RGB, FILE_HEADER_SIZE,
  INFO_HEADER_SIZE, MASK_B16, MASK_G16, MASK_R16,
};
use crate::canvas::Canvas;
use crate::color::Color;

/// Output pixel depth for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
  /// 16bpp, `BI_BITFIELDS` with masks `0xF800/0x07E0/0x001F` — a direct
  /// dump of [`Color`]'s own bit layout.
  Bpp16,
  /// 24bpp, `BI_RGB`, `[b, g, r]` byte order.
  Bpp24,
  /// 32bpp, `BI_RGB`, `[b, g, r, 0]` byte order.
  Bpp32,
}
impl BitDepth {
  #[inline]
  #[must_use]
  const fn bits(self) -> u16 {
    match self {
      Self::Bpp16 => 16,
      Self::Bpp24 => 24,
      Self::Bpp32 => 32,
    }
  }
}

#[inline]
fn padded_row_stride(width: u32, bits_per_pixel: u16) -> usize {
  let bits_per_row = (width as usize) * (bits_per_pixel as usize);
  let bytes_per_row = bits_per_row.div_ceil(8);
  bytes_per_row.div_ceil(4) * 4
}

fn push_pixel(out: &mut Vec<u8>, color: Color, depth: BitDepth) {
  match depth {
    BitDepth::Bpp16 => out.extend_from_slice(&color.to_u16().to_le_bytes()),
    BitDepth::Bpp24 => out.extend_from_slice(&[color.b8(), color.g8(), color.r8()]),
    BitDepth::Bpp32 => out.extend_from_slice(&[color.b8(), color.g8(), color.r8(), 0]),
  }
}

/// Encodes `canvas` as a BMP file at the given bit depth.
///
/// Always writes a negative (top-down) DIB height — there's no reason for
/// this crate's own output to ever need the bottom-up legacy layout a
/// reader must also tolerate.
#[must_use]
pub fn encode(canvas: &Canvas, depth: BitDepth) -> Vec<u8> {
  let width = canvas.width();
  let height = canvas.height();
  let bits_per_pixel = depth.bits();
  let row_stride = padded_row_stride(width, bits_per_pixel);
  let extra_header = if depth == BitDepth::Bpp16 { BITFIELDS_SIZE } else { 0 };
  let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + extra_header;
  let image_size = row_stride * (height as usize);
  let file_size = pixel_offset + image_size;

  let file_header = BitmapFileHeader {
    magic: [b'B', b'M'],
    file_size: U32LE::from(file_size as u32),
    reserved1: U16LE::from(0),
    reserved2: U16LE::from(0),
    pixel_offset: U32LE::from(pixel_offset as u32),
  };
  let info_header = BitmapInfoHeader {
    size: U32LE::from(INFO_HEADER_SIZE as u32),
    width: I32LE::from(width as i32),
    height: I32LE::from(-(height as i32)),
    planes: U16LE::from(1),
    bits_per_pixel: U16LE::from(bits_per_pixel),
    compression: U32LE::from(if depth == BitDepth::Bpp16 { BI_BITFIELDS } else { BI_RGB }),
    image_size: U32LE::from(image_size as u32),
    pixels_per_meter_x: I32LE::from(0),
    pixels_per_meter_y: I32LE::from(0),
    colors_used: U32LE::from(0),
    important_colors: U32LE::from(0),
  };

  let mut out = Vec::with_capacity(file_size);
  out.extend_from_slice(bytemuck::bytes_of(&file_header));
  out.extend_from_slice(bytemuck::bytes_of(&info_header));
  if depth == BitDepth::Bpp16 {
    for mask in [MASK_R16, MASK_G16, MASK_B16] {
      out.extend_from_slice(&mask.to_le_bytes());
    }
  }

  for y in 0..height {
    let row_start = out.len();
    for x in 0..width {
      let color = canvas.get(x, y).unwrap_or(Color::BLACK);
      push_pixel(&mut out, color, depth);
    }
    let written = out.len() - row_start;
    out.resize(row_start + row_stride, 0);
    debug_assert!(written <= row_stride);
  }

  out
}
