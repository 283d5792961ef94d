//! Speech synthesis engines.
//!
//! # Architecture
//!
//! - `Synthesizer`: capability trait the pipeline depends on
//! - `GoogleTranslateTts`: HTTP engine (Google Translate voice, MP3 output)
//! - `CommandSynthesizer`: any local TTS program that reads text on stdin
//!   (piper, espeak-ng, ...)
//!
//! Synthesis is never retried here. Skipping a failed line would shift
//! every later caption against the audio, so failures propagate.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

use crate::command::{wait_cancelled, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Longest text the Google Translate endpoint accepts per request.
pub const GOOGLE_TTS_MAX_CHARS: usize = 100;

/// Default top-level domain (regional accent) for Google Translate TTS.
pub const DEFAULT_TLD: &str = "ca";

const GOOGLE_TTS_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Converts one line of text into an audio file.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Write narration for `text` in language `lang` to `output`.
    async fn synthesize(&self, text: &str, lang: &str, output: &Path) -> MediaResult<()>;
}

/// Google Translate text-to-speech over HTTPS.
#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    client: reqwest::Client,
    tld: String,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl GoogleTranslateTts {
    /// Create an engine for the given regional domain (e.g. "com", "ca", "co.uk").
    pub fn new(tld: impl Into<String>, timeout: Option<Duration>) -> MediaResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(GOOGLE_TTS_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MediaError::synthesis_failed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            tld: tld.into(),
            cancel_rx: None,
        })
    }

    /// Abort in-flight requests when the flag turns `true`.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn fetch_chunk(&self, url: Url) -> MediaResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MediaError::synthesis_failed(format!("TTS request failed: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::synthesis_failed(format!("TTS response read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Build the request URL for one chunk.
    fn request_url(&self, chunk: &str, lang: &str, idx: usize, total: usize) -> MediaResult<Url> {
        let base = format!("https://translate.google.{}/translate_tts", self.tld);
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        Url::parse_with_params(
            &base,
            &[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", lang),
                ("client", "tw-ob"),
                ("ttsspeed", "1"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| MediaError::invalid_argument(format!("Invalid TTS URL for tld '{}': {}", self.tld, e)))
    }
}

#[async_trait]
impl Synthesizer for GoogleTranslateTts {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(&self, text: &str, lang: &str, output: &Path) -> MediaResult<()> {
        let chunks = chunk_text(text, GOOGLE_TTS_MAX_CHARS);
        if chunks.is_empty() {
            return Err(MediaError::invalid_argument("Cannot synthesize empty text"));
        }

        // MP3 frames from consecutive requests can be appended as-is
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            if self.is_cancelled() {
                return Err(MediaError::Cancelled);
            }
            let url = self.request_url(chunk, lang, idx, chunks.len())?;
            debug!(chunk = idx, total = chunks.len(), "Requesting TTS chunk");

            let bytes = tokio::select! {
                bytes = self.fetch_chunk(url) => bytes?,
                _ = wait_cancelled(self.cancel_rx.clone()) => return Err(MediaError::Cancelled),
            };
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(MediaError::synthesis_failed("TTS returned no audio"));
        }

        tokio::fs::write(output, &audio).await?;
        info!(
            output = %output.display(),
            bytes = audio.len(),
            chunks = chunks.len(),
            "Synthesized narration"
        );
        Ok(())
    }
}

/// Local TTS program fed through stdin.
///
/// `{output}` and `{lang}` in the argument list are replaced per call, e.g.
/// `piper --model en_US-amy-medium.onnx --output_file {output}`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    runner: FfmpegRunner,
}

impl CommandSynthesizer {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            runner: FfmpegRunner::new(),
        }
    }

    /// Kill the program after `timeout` (whole seconds, at least one).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.runner = self
            .runner
            .with_optional_timeout(timeout.map(|t| t.as_secs().max(1)));
        self
    }

    /// Kill the program when the flag turns `true`.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }

    /// Arguments with placeholders substituted.
    fn build_args(&self, lang: &str, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{output}", &output).replace("{lang}", lang))
            .collect()
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn synthesize(&self, text: &str, lang: &str, output: &Path) -> MediaResult<()> {
        if text.trim().is_empty() {
            return Err(MediaError::invalid_argument("Cannot synthesize empty text"));
        }

        if self.runner.is_cancelled() {
            return Err(MediaError::Cancelled);
        }
        which::which(&self.program).map_err(|_| MediaError::ToolNotFound(self.program.clone()))?;

        let args = self.build_args(lang, output);
        debug!("Running TTS: {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(stdin) = child.stdin.take() {
            feed_stdin(stdin, text).await?;
        }

        let result = self.runner.wait_for_output(child).await?;

        if !result.status.success() {
            return Err(MediaError::synthesis_failed(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        if !output.exists() {
            return Err(MediaError::synthesis_failed(format!(
                "{} did not write {}",
                self.program,
                output.display()
            )));
        }

        Ok(())
    }
}

/// Write `text` and close the pipe. A program that exits without reading
/// stdin is not an error here; its exit status decides.
async fn feed_stdin<W: AsyncWrite + Unpin>(mut stdin: W, text: &str) -> std::io::Result<()> {
    let written = match stdin.write_all(text.as_bytes()).await {
        Ok(()) => stdin.shutdown().await,
        Err(e) => Err(e),
    };
    match written {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            debug!("TTS program closed stdin early");
            Ok(())
        }
        other => other,
    }
}

/// Split text into pieces of at most `max_chars` characters on word boundaries.
///
/// Words longer than `max_chars` are split mid-word.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
