use std::env;
use std::error::Error;
use std::io::Write;

use reqwest::header::CONTENT_TYPE;
use stream_feed::{FeedSettings, HttpChunkSource};
use stream_feed_chat::{ChatSettings, Exchange, MessageKind};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn base_url() -> String {
    env::var("COMPLETIONS_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::default()
                .add_directive("stream_feed=info".parse()?)
                .add_directive("stream_feed_chat=info".parse()?)
                .add_directive(LevelFilter::WARN.into()),
        )
        .with_line_number(true)
        .with_file(true)
        .init();

    let prompt = env::args()
        .nth(1)
        .unwrap_or_else(|| "Talk me through a steep turn in two sentences.".to_string());
    let api_key = env::var("API_KEY")?;
    let model = env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let mut exchange = Exchange::new(ChatSettings::default());
    exchange.push_completed(MessageKind::UserTranscription, prompt.clone())?;
    let reply = exchange.begin_generated()?;

    let body = serde_json::json!({
        "model": model,
        "stream": true,
        "messages": [{ "role": "user", "content": prompt }],
    });
    let client = reqwest::Client::new();
    let request = client
        .post(base_url())
        .bearer_auth(api_key)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body)?)
        .build()?;

    let task = reply.stream_from(
        Box::new(HttpChunkSource::new(client, request)),
        FeedSettings::default(),
    )?;

    // Print only what was appended since the last update.
    let mut updates = reply.updates();
    let mut printed = 0;
    let mut out = std::io::stdout();
    while updates.changed().await.is_ok() {
        let progress = *updates.borrow_and_update();
        let text = reply.text();
        write!(out, "{}", &text[printed..])?;
        out.flush()?;
        printed = text.len();
        if !progress.in_progress {
            break;
        }
    }
    writeln!(out)?;

    let (_, report) = task.join().await?;
    tracing::info!(chunks = report.chunks, bytes = report.bytes, end = %report.end, "done");
    Ok(())
}
