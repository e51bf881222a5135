//! Input recording and the binary replay format.
//!
//! An [`InputStream`] is a capped circular log of which bindings were held on
//! each frame, stored as a [`BitMask`] with one column per binding and one row
//! per frame. Alongside the bits it keeps a per-binding consumption barrier so
//! an edge that gameplay already acted on is not reported again while it is
//! still inside the caller's buffer window.
//!
//! A [`Replay`] is an immutable snapshot of a stream that has not wrapped,
//! plus the seed the run was started with. It encodes to:
//!
//! ```text
//! offset  size  field
//! 0       5     "ltlrr"
//! 5       4     seed, u32 big-endian
//! 9       1     total bindings, u8
//! 10      4     length in frames, u32 big-endian
//! 14      N     bit mask words, u64 little-endian, ceil(bindings * length / 64) of them
//! ```
//!
//! ```
//! use ltl_engine::replay::{InputStream, Replay};
//!
//! let mut stream = InputStream::new(2, 64);
//! stream.push(&[true, false]);
//! stream.push(&[true, true]);
//!
//! let replay = Replay::try_from_input_stream(7, &stream).unwrap();
//! let decoded = Replay::try_from_bytes(&replay.to_bytes()).unwrap();
//! assert_eq!(decoded, replay);
//! ```

use ltl_ecs::bit_mask::BitMask;

/// Largest frame count whose mask still fits a `u32` word count at 255
/// bindings.
pub const MAX_REPLAY_LENGTH: u32 = 1_077_952_576;

/// Leading bytes of every encoded replay.
pub const REPLAY_SIGNATURE: &[u8; 5] = b"ltlrr";

/// Size of the fixed header preceding the mask payload.
pub const REPLAY_HEADER_SIZE: usize = 14;

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

/// Errors produced while building or decoding a [`Replay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("The given InputStream cannot be a valid Replay as it has wrapped around on itself.")]
    InvalidatedInputStream,

    #[error("Too few bytes were given to possibly construct a Replay.")]
    TooFewBytes,

    #[error("The first few bytes do no match the signature of a valid Replay file.")]
    SignatureMismatch,
}

// ---------------------------------------------------------------------------
// InputStream
// ---------------------------------------------------------------------------

/// Circular per-frame log of held bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStream {
    total_bindings: u8,
    capacity: u32,
    length: u32,
    barriers: Vec<u32>,
    bits: BitMask,
}

impl InputStream {
    /// Create an empty stream.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds [`MAX_REPLAY_LENGTH`].
    pub fn new(total_bindings: u8, capacity: u32) -> Self {
        assert!(
            capacity > 0 && capacity <= MAX_REPLAY_LENGTH,
            "input stream capacity must be in 1..={MAX_REPLAY_LENGTH}, got {capacity}"
        );
        Self {
            total_bindings,
            capacity,
            length: 0,
            barriers: vec![0; usize::from(total_bindings)],
            bits: BitMask::new(u32::from(total_bindings), capacity),
        }
    }

    #[inline]
    pub fn total_bindings(&self) -> u8 {
        self.total_bindings
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Frames pushed so far, including any that have been overwritten.
    #[inline]
    pub fn len(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether pushes have started overwriting the oldest frames.
    pub fn has_wrapped(&self) -> bool {
        self.length >= self.capacity
    }

    fn wrap(&self, frame: i64) -> i32 {
        frame.rem_euclid(i64::from(self.capacity)) as i32
    }

    /// Append one frame. Missing bindings in `payload` read as not held.
    pub fn push(&mut self, payload: &[bool]) {
        let row = self.wrap(i64::from(self.length));
        for binding in 0..usize::from(self.total_bindings) {
            let held = payload.get(binding).copied().unwrap_or(false);
            self.bits.set(binding as i32, row, held);
        }
        self.length = self.length.wrapping_add(1);
    }

    /// Whether `binding` was held on `frame`.
    pub fn pressing(&self, binding: u8, frame: u32) -> bool {
        self.pressing_at(binding, i64::from(frame))
    }

    fn pressing_at(&self, binding: u8, frame: i64) -> bool {
        if frame < 0 {
            return false;
        }
        self.bits.get(i32::from(binding), self.wrap(frame))
    }

    fn barrier(&self, binding: u8) -> i64 {
        i64::from(self.barriers.get(usize::from(binding)).copied().unwrap_or(0))
    }

    /// Whether `binding` is held on `frame` after being up at some point in
    /// the preceding `buffer` frames that has not been consumed.
    pub fn pressed(&self, binding: u8, buffer: usize, frame: u32) -> bool {
        self.edge(binding, buffer, frame, true)
    }

    /// Whether `binding` is up on `frame` after being held at some point in
    /// the preceding `buffer` frames that has not been consumed.
    pub fn released(&self, binding: u8, buffer: usize, frame: u32) -> bool {
        self.edge(binding, buffer, frame, false)
    }

    fn edge(&self, binding: u8, buffer: usize, frame: u32, pressed: bool) -> bool {
        let frame = i64::from(frame);
        if self.pressing_at(binding, frame) != pressed {
            return false;
        }

        let barrier = self.barrier(binding);
        for offset in 1..=buffer as i64 {
            let previous = frame - offset;
            if previous >= 0 && previous < barrier {
                return false;
            }
            if self.pressing_at(binding, previous) != pressed {
                return true;
            }
        }

        false
    }

    /// Mark `binding`'s edges before `frame` as handled.
    pub fn consume(&mut self, binding: u8, frame: u32) {
        if let Some(barrier) = self.barriers.get_mut(usize::from(binding)) {
            *barrier = frame;
        }
    }

    /// Replace this stream's contents with `replay`. Returns `false`, leaving
    /// the stream untouched, if the replay has more bindings than the stream
    /// or does not fit without wrapping.
    #[must_use]
    pub fn load_replay(&mut self, replay: &Replay) -> bool {
        if replay.total_bindings > self.total_bindings || replay.length >= self.capacity {
            return false;
        }

        self.bits.clear();
        for frame in 0..replay.length as i32 {
            for binding in 0..i32::from(replay.total_bindings) {
                self.bits.set(binding, frame, replay.pressing(binding as u8, frame as u32));
            }
        }
        self.length = replay.length;
        self.barriers.fill(0);
        true
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// A recorded run: seed plus every frame's held bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    seed: u32,
    total_bindings: u8,
    length: u32,
    bits: BitMask,
}

impl Replay {
    /// Snapshot `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidatedInputStream`] if the stream has
    /// wrapped and its oldest frames are lost.
    pub fn try_from_input_stream(seed: u32, stream: &InputStream) -> Result<Self, ReplayError> {
        if stream.has_wrapped() {
            return Err(ReplayError::InvalidatedInputStream);
        }

        let bits = BitMask::from_words(
            u32::from(stream.total_bindings),
            stream.length,
            stream.bits.words(),
        );

        Ok(Self {
            seed,
            total_bindings: stream.total_bindings,
            length: stream.length,
            bits,
        })
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    pub fn total_bindings(&self) -> u8 {
        self.total_bindings
    }

    /// Number of recorded frames.
    #[inline]
    pub fn len(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn bits(&self) -> &BitMask {
        &self.bits
    }

    /// Whether `binding` was held on `frame`.
    pub fn pressing(&self, binding: u8, frame: u32) -> bool {
        self.bits.get(i32::from(binding), frame as i32)
    }

    /// Encode to the binary replay format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let words = self.bits.words();
        let mut bytes = Vec::with_capacity(REPLAY_HEADER_SIZE + words.len() * 8);

        bytes.extend_from_slice(REPLAY_SIGNATURE);
        bytes.extend_from_slice(&self.seed.to_be_bytes());
        bytes.push(self.total_bindings);
        bytes.extend_from_slice(&self.length.to_be_bytes());
        for word in words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }

        bytes
    }

    /// Decode the binary replay format. Trailing bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::TooFewBytes`] if `bytes` is shorter than the
    /// header or the payload the header announces, and
    /// [`ReplayError::SignatureMismatch`] if the signature is wrong.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        if bytes.len() < REPLAY_SIGNATURE.len() {
            return Err(ReplayError::TooFewBytes);
        }
        if &bytes[..REPLAY_SIGNATURE.len()] != REPLAY_SIGNATURE {
            return Err(ReplayError::SignatureMismatch);
        }
        if bytes.len() < REPLAY_HEADER_SIZE {
            return Err(ReplayError::TooFewBytes);
        }

        let seed = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let total_bindings = bytes[9];
        let length = u32::from_be_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        let word_count = BitMask::words_for(u32::from(total_bindings), length);
        let payload = &bytes[REPLAY_HEADER_SIZE..];
        if payload.len() / 8 < word_count {
            return Err(ReplayError::TooFewBytes);
        }

        let words: Vec<u64> = payload
            .chunks_exact(8)
            .take(word_count)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect();

        Ok(Self {
            seed,
            total_bindings,
            length,
            bits: BitMask::from_words(u32::from(total_bindings), length, &words),
        })
    }
}
