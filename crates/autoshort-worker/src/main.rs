//! Narrated clip batch binary.

use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoshort_media::{check_ffmpeg, check_ffprobe};
use autoshort_worker::{
    load_stories, shared_rng, sweep, BatchRunner, ClipPipeline, Engines, WorkerConfig,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for terminals, JSON for log collectors
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoshort=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting autoshort");

    std::process::exit(run().await);
}

async fn run() -> i32 {
    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        return e.exit_code();
    }
    info!("Config: {:?}", config);

    for check in [check_ffmpeg(), check_ffprobe()] {
        if let Err(e) = check {
            warn!("{}; clip composition will fail", e);
        }
    }

    // Ctrl-C flips the flag: running FFmpeg is killed, no further clips start
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = cancel_tx.send(true);
        }
    });

    let engines = match Engines::from_config(&config, cancel_rx.clone()) {
        Ok(engines) => engines,
        Err(e) => {
            error!("Failed to set up engines: {}", e);
            return e.exit_code();
        }
    };

    let stories = match load_stories(
        &config.stories_dir,
        &config.story_prefix,
        &config.story_extension,
    )
    .await
    {
        Ok(stories) => stories,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };
    info!(count = stories.len(), "Stories loaded");

    let pipeline = ClipPipeline::new(
        engines,
        config.clip_options(),
        &config.temp_dir,
        &config.work_dir,
        shared_rng(config.seed),
    )
    .with_fonts_dir(config.fonts_dir.clone())
    .with_cancel(cancel_rx.clone());

    let batch = BatchRunner::new(
        pipeline,
        &config.backgrounds_dir,
        &config.background_extension,
        &config.results_dir,
    )
    .with_cancel(cancel_rx);

    let summary = batch.run(&stories).await;

    match sweep(&config.temp_dir).await {
        Ok(0) => {}
        Ok(removed) => warn!(removed, "Removed leftover transient files"),
        Err(e) => warn!("Failed to sweep {}: {}", config.temp_dir.display(), e),
    }

    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(report) => info!(
                story = %outcome.story,
                output = %report.output.display(),
                duration = report.window.duration,
                "Clip ready"
            ),
            Err(e) => error!(story = %outcome.story, "Clip failed: {}", e),
        }
    }

    info!("Shutdown complete");
    summary.exit_code()
}
