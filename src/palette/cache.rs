//! A bounded recency cache in front of one palette's linear scan.

use crate::color::Color;
use crate::palette::{find_color_raw, find_value_raw, PaletteEntry, PaletteIndex};

const CAPACITY: usize = 4;

/// Caches up to four recently matched [`PaletteEntry`] values for a single
/// palette.
///
/// Replacement is strict round-robin by write cursor once the cache is
/// full — a cache hit never reorders the buffer, only a fresh palette-scan
/// hit advances the cursor and overwrites the oldest-by-position slot. A
/// true LRU (reordering on hit) would probably do better, but this matches
/// the replacement policy the camera firmware itself implements, so we keep
/// it rather than silently improving on the spec.
///
/// A cache is tied to the palette it was built for; looking entries up
/// against a different palette than the one it was constructed with is a
/// caller bug (the cache has no way to detect the mismatch, so don't reuse
/// one cache across two different palettes).
#[derive(Debug, Clone)]
pub struct PaletteCache {
  palette: PaletteIndex,
  slots: [Option<PaletteEntry>; CAPACITY],
  len: usize,
  cursor: usize,
}
impl PaletteCache {
  /// Builds an empty cache for `palette`.
  #[inline]
  #[must_use]
  pub const fn new(palette: PaletteIndex) -> Self {
    Self { palette, slots: [None; CAPACITY], len: 0, cursor: 0 }
  }

  /// The palette this cache was built for.
  #[inline]
  #[must_use]
  pub const fn palette(&self) -> PaletteIndex {
    self.palette
  }

  fn insert(&mut self, entry: PaletteEntry) {
    if self.len < CAPACITY {
      self.slots[self.len] = Some(entry);
      self.len += 1;
    } else {
      self.slots[self.cursor] = Some(entry);
      self.cursor = (self.cursor + 1) % CAPACITY;
    }
  }

  /// Cache-first, then palette-scan, lookup by rendered color.
  ///
  /// On a fresh palette hit, the entry is written into the cache (see
  /// [`Self::insert`]'s round-robin policy).
  pub fn find_color(&mut self, color: Color) -> Option<PaletteEntry> {
    if let Some(hit) = self.slots.iter().flatten().find(|e| e.color == color) {
      return Some(*hit);
    }
    let entry = find_color_raw(self.palette.entries(), color)?;
    self.insert(entry);
    Some(entry)
  }

  /// Cache-first, then palette-scan, lookup by intensity.
  ///
  /// On a fresh palette hit, the entry is written into the cache (see
  /// [`Self::insert`]'s round-robin policy).
  pub fn find_value(&mut self, value: u8) -> Option<PaletteEntry> {
    if let Some(hit) = self.slots.iter().flatten().find(|e| e.covers(value)) {
      return Some(*hit);
    }
    let entry = find_value_raw(self.palette.entries(), value)?;
    self.insert(entry);
    Some(entry)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn misses_fall_through_to_the_palette_scan() {
    let mut cache = PaletteCache::new(PaletteIndex::Iron);
    let entries = PaletteIndex::Iron.entries();
    let found = cache.find_color(entries[3].color).unwrap();
    assert_eq!(found, entries[3]);
  }

  #[test]
  fn hits_do_not_reorder_the_cache() {
    let mut cache = PaletteCache::new(PaletteIndex::Iron);
    let entries = PaletteIndex::Iron.entries();
    cache.find_color(entries[0].color);
    cache.find_color(entries[1].color);
    let before = cache.slots;
    cache.find_color(entries[0].color); // a hit, not a fresh scan match
    assert_eq!(cache.slots, before);
  }

  #[test]
  fn replacement_is_round_robin_once_full() {
    let mut cache = PaletteCache::new(PaletteIndex::Iron);
    let entries = PaletteIndex::Iron.entries();
    for e in &entries[0..CAPACITY] {
      cache.find_color(e.color);
    }
    assert_eq!(cache.len, CAPACITY);
    // A fifth distinct hit evicts slot 0 (the first-written slot), not
    // whichever slot was most recently used.
    cache.find_color(entries[CAPACITY].color);
    assert_eq!(cache.slots[0], Some(entries[CAPACITY]));
  }

  #[test]
  fn value_lookup_uses_the_same_cache_first_policy() {
    let mut cache = PaletteCache::new(PaletteIndex::Grayscale);
    let entries = PaletteIndex::Grayscale.entries();
    let found = cache.find_value(entries[2].base).unwrap();
    assert_eq!(found, entries[2]);
    assert_eq!(cache.len, 1);
  }
}
