//! Raw, byte-exact BMP header layouts.
//!
//! `#[repr(C)]` structs of `pack1` little-endian integer types, derived
//! `bytemuck::Pod` so a header can be pulled out of a byte slice with one
//! alignment-free read instead of hand-rolled `u32::from_le_bytes` calls
//! per field. Covers exactly the three depths this crate needs: 16bpp
//! `BI_BITFIELDS`, 24bpp `BI_RGB`, 32bpp `BI_RGB`.

use bytemuck::{Pod, Zeroable};
use pack1::{I32LE, U16LE, U32LE};

use crate::error::{ErrorReason, ErrorSource, ThermalError, ThermalResult};

pub(super) const BI_RGB: u32 = 0;
pub(super) const BI_BITFIELDS: u32 = 3;

/// The `0xF800 / 0x07E0 / 0x001F` bitfield masks contracted for 16bpp
/// files — the same layout [`crate::color::Color`] already uses in-memory,
/// so a 16bpp file round-trips without any channel shuffling.
pub(super) const MASK_R16: u32 = 0xF800;
pub(super) const MASK_G16: u32 = 0x07E0;
pub(super) const MASK_B16: u32 = 0x001F;

pub(super) const FILE_HEADER_SIZE: usize = 14;
pub(super) const INFO_HEADER_SIZE: usize = 40;
pub(super) const BITFIELDS_SIZE: usize = 12;

/// `BITMAPFILEHEADER`, 14 bytes.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub(super) struct BitmapFileHeader {
  pub magic: [u8; 2],
  pub file_size: U32LE,
  pub reserved1: U16LE,
  pub reserved2: U16LE,
  pub pixel_offset: U32LE,
}

/// `BITMAPINFOHEADER`, 40 bytes — the only info-header version this crate
/// reads or writes.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub(super) struct BitmapInfoHeader {
  pub size: U32LE,
  pub width: I32LE,
  pub height: I32LE,
  pub planes: U16LE,
  pub bits_per_pixel: U16LE,
  pub compression: U32LE,
  pub image_size: U32LE,
  pub pixels_per_meter_x: I32LE,
  pub pixels_per_meter_y: I32LE,
  pub colors_used: U32LE,
  pub important_colors: U32LE,
}

/// Pulls a `Pod` value off the front of `bytes`, returning it plus the
/// remaining tail.
///
/// Reads a header struct directly out of a byte slice via `bytemuck`
/// instead of pulling each field out by hand.
pub(super) fn try_pull_pod<T: Pod>(bytes: &[u8]) -> ThermalResult<(T, &[u8])> {
  let size = core::mem::size_of::<T>();
  if bytes.len() < size {
    return Err(ThermalError::new(ErrorReason::Format, ErrorSource::Bitmap));
  }
  let (head, tail) = bytes.split_at(size);
  Ok((bytemuck::pod_read_unaligned(head), tail))
}
