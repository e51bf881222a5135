//! Integration tests for input streams and the replay codec.
//!
//! Covers edge detection over a held window, byte round trips under
//! proptest, and loading decoded replays back into a stream.

use ltl_ecs::prelude::*;
use ltl_engine::input::StreamInput;
use ltl_engine::replay::{InputStream, Replay, ReplayError, REPLAY_HEADER_SIZE, REPLAY_SIGNATURE};
use ltl_engine::tick::{play_replay, TickConfig, TickLoop};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One binding held on frames `[start, end)` of `total` frames.
fn held_window(start: u32, end: u32, total: u32) -> InputStream {
    let mut stream = InputStream::new(1, 64);
    for frame in 0..total {
        stream.push(&[(start..end).contains(&frame)]);
    }
    stream
}

// ---------------------------------------------------------------------------
// Edge detection
// ---------------------------------------------------------------------------

#[test]
fn held_window_edges() {
    let stream = held_window(5, 10, 15);

    assert!(stream.pressed(0, 2, 5));
    assert!(stream.pressed(0, 2, 6));
    assert!(!stream.pressed(0, 2, 7));
    assert!(stream.pressing(0, 7));
    assert!(!stream.released(0, 2, 9));

    assert!(stream.released(0, 2, 10));
    assert!(stream.released(0, 2, 11));
    assert!(!stream.released(0, 2, 12));
}

#[test]
fn consume_hides_buffered_press() {
    let mut stream = held_window(5, 10, 15);
    stream.consume(0, 5);

    assert!(!stream.pressed(0, 2, 6));
    assert!(stream.pressing(0, 6));
}

#[test]
fn edges_survive_the_codec() {
    let stream = held_window(5, 10, 15);
    let replay = Replay::try_from_input_stream(3, &stream).unwrap();
    let decoded = Replay::try_from_bytes(&replay.to_bytes()).unwrap();

    let mut reloaded = InputStream::new(1, 64);
    assert!(reloaded.load_replay(&decoded));
    for frame in 0..15 {
        assert_eq!(reloaded.pressed(0, 2, frame), stream.pressed(0, 2, frame));
        assert_eq!(reloaded.released(0, 2, frame), stream.released(0, 2, frame));
    }
}

// ---------------------------------------------------------------------------
// Codec failures
// ---------------------------------------------------------------------------

#[test]
fn truncated_payload_is_too_few_bytes() {
    let stream = held_window(0, 40, 40);
    let bytes = Replay::try_from_input_stream(0, &stream).unwrap().to_bytes();
    assert_eq!(bytes.len(), REPLAY_HEADER_SIZE + 8);

    let error = Replay::try_from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(error, ReplayError::TooFewBytes));
}

#[test]
fn wrapped_stream_cannot_be_saved() {
    let mut stream = InputStream::new(1, 4);
    for _ in 0..5 {
        stream.push(&[true]);
    }
    let error = Replay::try_from_input_stream(0, &stream).unwrap_err();
    assert!(matches!(error, ReplayError::InvalidatedInputStream));
}

#[test]
fn oversized_header_length_fails_playback_cleanly() {
    // No bindings means no payload words, so any length decodes.
    let mut bytes = REPLAY_SIGNATURE.to_vec();
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());
    let replay = Replay::try_from_bytes(&bytes).unwrap();
    assert_eq!(replay.len(), u32::MAX);
    assert!(StreamInput::from_replay(&replay).is_none());

    let mut tick_loop = TickLoop::new(Scene::default(), TickConfig::default());
    let error = play_replay(&mut tick_loop, &replay).unwrap_err();
    assert!(format!("{error:#}").contains("frames"));
    assert_eq!(tick_loop.tick_count(), 0);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

fn frames_strategy() -> impl Strategy<Value = (u8, Vec<Vec<bool>>)> {
    (1u8..=8).prop_flat_map(|bindings| {
        let frame = prop::collection::vec(any::<bool>(), usize::from(bindings));
        (Just(bindings), prop::collection::vec(frame, 0..200))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bytes_round_trip(seed in any::<u32>(), (bindings, frames) in frames_strategy()) {
        let mut stream = InputStream::new(bindings, frames.len() as u32 + 1);
        for frame in &frames {
            stream.push(frame);
        }

        let replay = Replay::try_from_input_stream(seed, &stream).unwrap();
        let decoded = Replay::try_from_bytes(&replay.to_bytes()).unwrap();

        prop_assert_eq!(decoded.seed(), seed);
        prop_assert_eq!(decoded.total_bindings(), bindings);
        prop_assert_eq!(decoded.len(), frames.len() as u32);
        prop_assert_eq!(decoded.bits().words(), replay.bits().words());
        for (index, frame) in frames.iter().enumerate() {
            for (binding, &held) in frame.iter().enumerate() {
                prop_assert_eq!(decoded.pressing(binding as u8, index as u32), held);
            }
        }
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Replay::try_from_bytes(&bytes);
    }
}
