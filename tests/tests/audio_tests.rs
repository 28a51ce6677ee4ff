//! Audio integration tests for `stream-feed-audio`.
//!
//! These tests validate:
//! - Ogg/Opus decoding of real libopus packets containerized by an independent Ogg writer
//! - Pre-skip trimming and per-stream decoder resets
//! - Recovery from undecodable packets and from joining a stream mid-page
//! - Concurrent feed and render threads sharing one session
//! - `RodioSourceAdapter`
//!
//! Unlike the chat tests, which stop at text, these go all the way to rendered PCM samples.


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use stream_feed::{EndReason, FeedSettings, FeedTask, HttpChunkSource, MemoryChunkSource};
use stream_feed_audio::{AudioSession, AudioSettings, RenderOutcome};

use fixtures::audio::{
    OpusFixture, SpeechServer, FRAMES_PER_PACKET, INVALID_PACKET, PRE_SKIP, RATE,
};
use fixtures::setup;

async fn feed_memory(data: Vec<u8>, chunk_len: usize) -> AudioSession {
    let session = AudioSession::new(AudioSettings::default()).unwrap();
    let task = FeedTask::spawn(
        Box::new(MemoryChunkSource::chunked(data, chunk_len)),
        session,
        FeedSettings::default(),
    );
    let (session, report) = task.join().await.unwrap();
    assert_eq!(report.end, EndReason::Completed);
    session
}

#[rstest]
#[case(1)]
#[case(17)]
#[case(4096)]
#[tokio::test]
async fn opus_stream_decodes_to_expected_sample_count(#[case] chunk_len: usize) {
    setup::init_tracing();
    let packets = 12;
    let session = feed_memory(OpusFixture::speech(7, packets), chunk_len).await;

    assert!(session.is_finished());
    assert!(session.has_audio());
    assert_eq!(session.buffered_samples(), OpusFixture::expected_samples(packets));

    let stats = session.stats();
    // Two header packets plus the audio.
    assert_eq!(stats.decoded_packets, packets as u64 + 2);
    assert_eq!(stats.decode_errors, 0);
    assert_eq!(stats.demux.bad_pages, 0);
    assert_eq!(stats.ring.dropped, 0);
}

#[tokio::test]
async fn undecodable_packet_is_skipped_and_playback_continues() {
    setup::init_tracing();
    let mut packets = OpusFixture::tone_packets(440.0, 4);
    packets[1] = INVALID_PACKET.to_vec();
    let data = OpusFixture::ogg_stream(3, &packets, true, 2);

    let session = feed_memory(data, 64).await;
    let stats = session.stats();
    assert_eq!(stats.decode_errors, 1);
    assert_eq!(stats.decoded_packets, 2 + 3);
    assert_eq!(
        session.buffered_samples(),
        3 * FRAMES_PER_PACKET - PRE_SKIP
    );
}

#[tokio::test]
async fn joining_mid_stream_still_produces_audio() {
    setup::init_tracing();
    let data = OpusFixture::speech(5, 30);
    // Land inside a page so the demuxer has to resynchronize.
    let mut offset = data.len() / 3;
    if data[offset..].starts_with(b"OggS") {
        offset += 1;
    }
    let joined = data[offset..].to_vec();

    let session = feed_memory(joined, 100).await;
    let stats = session.stats();
    assert!(stats.demux.skipped_bytes > 0);
    assert_eq!(stats.decode_errors, 0);
    assert!(session.buffered_samples() > 0);
    // No OpusHead seen, so nothing is trimmed.
    assert_eq!(session.buffered_samples() % FRAMES_PER_PACKET, 0);
}

#[tokio::test]
async fn consecutive_streams_are_both_played() {
    setup::init_tracing();
    let mut data = OpusFixture::speech(1, 6);
    data.extend(OpusFixture::speech(2, 4));

    let session = feed_memory(data, 33).await;
    assert_eq!(
        session.buffered_samples(),
        OpusFixture::expected_samples(6) + OpusFixture::expected_samples(4)
    );
    assert_eq!(session.stats().decode_errors, 0);
}

#[tokio::test]
async fn http_feed_with_concurrent_render_plays_every_sample() {
    setup::init_tracing();
    let packets = 25;
    let server = SpeechServer::new(
        &OpusFixture::speech(9, packets),
        200,
        Duration::from_millis(5),
    );
    let url = server.start().await;

    let session = AudioSession::new(AudioSettings::default()).unwrap();
    let mut render = session.render_callback();
    let period = render.period_samples();
    let done = Arc::new(AtomicBool::new(false));

    let render_thread = {
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut out = vec![0.0f32; period];
            let mut played = Vec::new();
            loop {
                match render.render(&mut out) {
                    RenderOutcome::Full => played.extend_from_slice(&out),
                    RenderOutcome::Underrun { filled } => played.extend_from_slice(&out[..filled]),
                    RenderOutcome::Silent => {
                        if done.load(Ordering::Acquire) && !render.is_ready() {
                            break;
                        }
                        std::thread::sleep(Duration::from_millis(1));
                    }
                }
            }
            (played, render.stats())
        })
    };

    let task = FeedTask::spawn(
        Box::new(HttpChunkSource::get(url)),
        session,
        FeedSettings::default(),
    );
    let (session, report) = task.join().await.unwrap();
    assert_eq!(report.end, EndReason::Completed);
    done.store(true, Ordering::Release);

    let (played, playback) = tokio::task::spawn_blocking(move || render_thread.join().unwrap())
        .await
        .unwrap();

    let stats = session.stats();
    assert_eq!(played.len() as u64, stats.decoded_samples);
    assert_eq!(played.len(), OpusFixture::expected_samples(packets));
    assert!(OpusFixture::verify_samples_not_silence(&played));
    assert!(playback.periods > 0);
    assert_eq!(session.buffered_samples(), 0);
}

#[tokio::test]
async fn rodio_adapter_yields_decoded_audio() {
    use rodio::Source;
    use stream_feed_audio::RodioSourceAdapter;

    setup::init_tracing();
    let session = feed_memory(OpusFixture::speech(4, 10), 512).await;
    let adapter = RodioSourceAdapter::new(session.render_callback());

    assert_eq!(adapter.channels(), 1);
    assert_eq!(adapter.sample_rate(), RATE);
    assert_eq!(adapter.total_duration(), None);

    let samples: Vec<f32> = adapter.take(2048).collect();
    assert_eq!(samples.len(), 2048);
    assert!(OpusFixture::verify_samples_not_silence(&samples));
}
