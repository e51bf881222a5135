//! Dense bitset over a `width x height` grid.
//!
//! Cells are addressed as `y * width + x` and packed into 64-bit words. The
//! replay input stream stores one row per frame and one column per input
//! binding.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-size grid of bits backed by `u64` words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMask {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl BitMask {
    /// Create a cleared mask covering `width * height` cells.
    pub fn new(width: u32, height: u32) -> Self {
        let words = vec![0; Self::words_for(width, height)];
        Self {
            width,
            height,
            words,
        }
    }

    /// Rebuild a mask from previously exported words.
    ///
    /// `words` is truncated or zero-extended to the length the grid needs.
    pub fn from_words(width: u32, height: u32, words: &[u64]) -> Self {
        let mut mask = Self::new(width, height);
        let count = mask.words.len().min(words.len());
        mask.words[..count].copy_from_slice(&words[..count]);
        mask
    }

    /// Number of words needed for a `width x height` grid.
    pub fn words_for(width: u32, height: u32) -> usize {
        let area = width as usize * height as usize;
        area.div_ceil(WORD_BITS)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The backing words, lowest cell index first.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Read a cell. Out-of-bounds coordinates read as `false`.
    pub fn get(&self, x: i32, y: i32) -> bool {
        match self.index_of(x, y) {
            Some(index) => self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0,
            None => false,
        }
    }

    /// Write a cell. Out-of-bounds coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        let Some(index) = self.index_of(x, y) else {
            return;
        };
        let bit = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Reset every cell to `false`.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}
