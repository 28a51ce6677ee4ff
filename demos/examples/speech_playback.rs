use std::env;
use std::error::Error;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use rodio::{OutputStreamBuilder, Sink};
use stream_feed::{FeedSettings, FeedTask, HttpChunkSource};
use stream_feed_audio::{AudioSession, AudioSettings, RodioSourceAdapter};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn speech_url() -> String {
    env::var("SPEECH_URL").unwrap_or_else(|_| "https://api.openai.com/v1/audio/speech".to_string())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::default()
                .add_directive("stream_feed=info".parse()?)
                .add_directive("stream_feed_audio=info".parse()?)
                .add_directive(LevelFilter::INFO.into()),
        )
        .with_line_number(true)
        .with_file(true)
        .init();

    let text = env::args()
        .nth(1)
        .unwrap_or_else(|| "Wings level. Now roll into a forty five degree bank.".to_string());
    let api_key = env::var("API_KEY")?;

    // Opus at 24 kHz mono is what speech endpoints stream; decode straight to that.
    let session = AudioSession::new(AudioSettings::default())?;

    // Setup rodio output before any bytes arrive; it plays silence until audio is ready.
    let stream_handle =
        OutputStreamBuilder::open_default_stream().expect("open default audio stream");
    let sink = Sink::connect_new(&stream_handle.mixer());
    let render = session.render_callback();
    sink.append(RodioSourceAdapter::new(render.clone()));
    sink.play();

    let body = serde_json::json!({
        "model": env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini-tts".to_string()),
        "voice": "alloy",
        "input": text,
        "response_format": "opus",
    });
    let client = reqwest::Client::new();
    let request = client
        .post(speech_url())
        .bearer_auth(api_key)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body)?)
        .build()?;

    let task = FeedTask::spawn(
        Box::new(HttpChunkSource::new(client, request)),
        session,
        FeedSettings::default().with_idle_timeout(Duration::from_secs(10)),
    );
    let (session, report) = task.join().await?;
    tracing::info!(end = %report.end, stats = ?session.stats(), "synthesis stream ended");

    // The adapter never ends; wait for the ring to drain instead.
    while render.is_ready() || session.buffered_samples() > 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    sink.stop();

    tracing::info!(playback = ?render.stats(), "playback finished");
    Ok(())
}
