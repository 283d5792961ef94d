use std::path::Path;
use std::process::Command;

use autoshort_worker::{TtsEngine, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env()?;
    config.validate()?;

    println!(
        "autoshort-selfcheck: stories={} backgrounds={} results={}",
        config.stories_dir.display(),
        config.backgrounds_dir.display(),
        config.results_dir.display()
    );
    ensure_dir_exists(&config.stories_dir)?;
    ensure_dir_exists(&config.backgrounds_dir)?;
    ensure_writable_dir(&config.results_dir).await?;
    ensure_writable_dir(&config.temp_dir).await?;
    ensure_tool("ffmpeg")?;
    ensure_tool("ffprobe")?;

    if config.tts_engine == TtsEngine::Command {
        let program = config
            .tts_command
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("AUTOSHORT_TTS_COMMAND is not set"))?;
        which_tool(program)?;
    }

    if let Some(banner) = &config.banner {
        ensure_file_exists(banner)?;
    }

    println!("autoshort-selfcheck: ok");
    Ok(())
}

fn ensure_dir_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_dir() {
        return Err(anyhow::anyhow!("missing directory {}", path.display()));
    }
    Ok(())
}

fn ensure_file_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(anyhow::anyhow!("missing file {}", path.display()));
    }
    Ok(())
}

async fn ensure_writable_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    let probe = path.join(".autoshort-selfcheck");
    tokio::fs::write(&probe, b"ok").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_tool(tool: &str) -> anyhow::Result<()> {
    let output = Command::new(tool)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", tool, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("{} -version failed: {:?}", tool, output.status));
    }
    Ok(())
}

fn which_tool(program: &str) -> anyhow::Result<()> {
    which::which(program).map_err(|e| anyhow::anyhow!("TTS program {} not found: {}", program, e))?;
    Ok(())
}
