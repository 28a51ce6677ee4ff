//! Runnable examples for the `stream-feed` workspace live under `examples/`.
