//! Input collaborator and the stream-backed implementation.
//!
//! Gameplay only ever asks an [`Input`] about the current frame. Devices are
//! out of scope; a host samples its devices into a set of held [`Binding`]s,
//! records them with [`StreamInput::record`], and hands the same adapter to
//! the tick loop. Playing a [`Replay`] back uses the exact same path.

use crate::replay::{InputStream, Replay, ReplayError, MAX_REPLAY_LENGTH};

/// Frames a buffered jump press stays live.
pub const JUMP_BUFFER_FRAMES: usize = 8;

/// Default recording capacity: one hour at 60 frames per second.
pub const DEFAULT_STREAM_CAPACITY: u32 = 60 * 60 * 60;

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// A logical game input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Left,
    Right,
    Jump,
    Select,
}

impl Binding {
    pub const ALL: [Binding; 4] = [Binding::Left, Binding::Right, Binding::Jump, Binding::Select];

    pub const TOTAL: u8 = Self::ALL.len() as u8;

    /// Column of this binding in the input stream.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// How many earlier frames an edge on this binding stays visible for.
    pub const fn buffer(self) -> usize {
        match self {
            Binding::Jump => JUMP_BUFFER_FRAMES,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// What the simulation may ask about the current frame's input.
pub trait Input {
    /// The binding is held this frame.
    fn pressing(&self, binding: Binding) -> bool;

    /// The binding went down this frame, or within its buffer window without
    /// being consumed.
    fn pressed(&self, binding: Binding) -> bool;

    /// The binding went up this frame, or within its buffer window without
    /// being consumed.
    fn released(&self, binding: Binding) -> bool;

    /// Mark the binding's pending edge as handled.
    fn consume(&mut self, binding: Binding);
}

/// An input that is never pressed. Useful for headless stepping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInput;

impl Input for NullInput {
    fn pressing(&self, _binding: Binding) -> bool {
        false
    }

    fn pressed(&self, _binding: Binding) -> bool {
        false
    }

    fn released(&self, _binding: Binding) -> bool {
        false
    }

    fn consume(&mut self, _binding: Binding) {}
}

// ---------------------------------------------------------------------------
// StreamInput
// ---------------------------------------------------------------------------

/// [`Input`] over an [`InputStream`], positioned at one frame.
///
/// A zero buffer window still needs one frame of history to see an edge, so
/// windows are widened to at least one.
#[derive(Debug, Clone)]
pub struct StreamInput {
    stream: InputStream,
    frame: u32,
}

impl StreamInput {
    /// A recorder with room for `capacity` frames.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`InputStream::new`].
    pub fn new(capacity: u32) -> Self {
        Self {
            stream: InputStream::new(Binding::TOTAL, capacity),
            frame: 0,
        }
    }

    /// A player positioned on the first frame of `replay`. Returns `None` if
    /// the replay carries more bindings than this adapter knows or more
    /// frames than a stream can hold.
    pub fn from_replay(replay: &Replay) -> Option<Self> {
        if replay.len() >= MAX_REPLAY_LENGTH {
            return None;
        }
        let mut stream = InputStream::new(Binding::TOTAL, replay.len().saturating_add(1));
        if !stream.load_replay(replay) {
            return None;
        }
        Some(Self { stream, frame: 0 })
    }

    /// Append a frame in which exactly `held` are down and make it current.
    pub fn record(&mut self, held: &[Binding]) {
        let mut payload = [false; Binding::ALL.len()];
        for binding in held {
            payload[usize::from(binding.index())] = true;
        }
        self.stream.push(&payload);
        self.frame = self.stream.len().saturating_sub(1);
    }

    /// Move to the next recorded frame. Returns `false` once past the end.
    pub fn step(&mut self) -> bool {
        self.frame = self.frame.saturating_add(1);
        self.frame < self.stream.len()
    }

    /// Index of the current frame.
    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Whether the current frame has been recorded.
    #[inline]
    pub fn has_frame(&self) -> bool {
        self.frame < self.stream.len()
    }

    #[inline]
    pub fn stream(&self) -> &InputStream {
        &self.stream
    }

    /// Snapshot everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidatedInputStream`] if the recording
    /// outgrew its capacity.
    pub fn to_replay(&self, seed: u32) -> Result<Replay, ReplayError> {
        Replay::try_from_input_stream(seed, &self.stream)
    }

    /// Consume the recorder into a replay.
    ///
    /// # Errors
    ///
    /// See [`StreamInput::to_replay`].
    pub fn into_replay(self, seed: u32) -> Result<Replay, ReplayError> {
        self.to_replay(seed)
    }
}

impl Default for StreamInput {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_CAPACITY)
    }
}

impl Input for StreamInput {
    fn pressing(&self, binding: Binding) -> bool {
        self.stream.pressing(binding.index(), self.frame)
    }

    fn pressed(&self, binding: Binding) -> bool {
        self.stream
            .pressed(binding.index(), binding.buffer().max(1), self.frame)
    }

    fn released(&self, binding: Binding) -> bool {
        self.stream
            .released(binding.index(), binding.buffer().max(1), self.frame)
    }

    fn consume(&mut self, binding: Binding) {
        self.stream.consume(binding.index(), self.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbuffered_press_is_one_frame() {
        let mut input = StreamInput::new(16);
        input.record(&[]);
        input.record(&[Binding::Left]);
        assert!(input.pressed(Binding::Left));
        assert!(input.pressing(Binding::Left));
        input.record(&[Binding::Left]);
        assert!(!input.pressed(Binding::Left));
        input.record(&[]);
        assert!(input.released(Binding::Left));
    }

    #[test]
    fn jump_is_buffered_until_consumed() {
        let mut input = StreamInput::new(32);
        input.record(&[Binding::Jump]);
        input.record(&[Binding::Jump]);
        input.record(&[Binding::Jump]);
        assert!(input.pressed(Binding::Jump));

        input.consume(Binding::Jump);
        assert!(!input.pressed(Binding::Jump));
        input.record(&[Binding::Jump]);
        assert!(!input.pressed(Binding::Jump));
    }

    #[test]
    fn jump_buffer_expires() {
        let mut input = StreamInput::new(32);
        input.record(&[]);
        input.record(&[Binding::Jump]);
        for _ in 0..JUMP_BUFFER_FRAMES - 1 {
            input.record(&[Binding::Jump]);
        }
        assert!(input.pressed(Binding::Jump));
        input.record(&[Binding::Jump]);
        assert!(!input.pressed(Binding::Jump));
    }

    #[test]
    fn playback_walks_recorded_frames() {
        let mut recorder = StreamInput::new(16);
        recorder.record(&[Binding::Right]);
        recorder.record(&[Binding::Right, Binding::Jump]);
        recorder.record(&[]);
        let replay = recorder.into_replay(42).unwrap();
        assert_eq!(replay.seed(), 42);

        let mut player = StreamInput::from_replay(&replay).unwrap();
        assert!(player.pressing(Binding::Right));
        assert!(!player.pressing(Binding::Jump));
        assert!(player.step());
        assert!(player.pressed(Binding::Jump));
        assert!(player.step());
        assert!(player.released(Binding::Right));
        assert!(!player.step());
        assert!(!player.has_frame());
    }

    #[test]
    fn null_input_is_idle() {
        let mut input = NullInput;
        input.consume(Binding::Jump);
        assert!(Binding::ALL.iter().all(|&b| !input.pressing(b) && !input.pressed(b)));
    }
}
