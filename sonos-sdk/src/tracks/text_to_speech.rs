//! Spoken announcements
//!
//! Speech is synthesised once into a directory the speakers can read over
//! SMB. The file name is derived from provider, language and text, so the
//! same announcement is never synthesised twice.

use std::io::Read;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use super::{Playable, Track};
use crate::error::{Result, SdkError};

const VOICERSS_ENDPOINT: &str = "http://api.voicerss.org/";

/// Turns text into MP3 audio
pub trait Synthesizer {
    /// Stable provider name, part of the cache key
    fn name(&self) -> &str;

    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// The VoiceRSS web service
#[derive(Debug, Clone)]
pub struct VoiceRss {
    api_key: String,
    endpoint: String,
    agent: ureq::Agent,
}

impl VoiceRss {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: VOICERSS_ENDPOINT.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(Duration::from_secs(30))
                .build(),
        }
    }

    /// Point at another server speaking the VoiceRSS protocol
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Synthesizer for VoiceRss {
    fn name(&self) -> &str {
        "voicerss"
    }

    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("key", &self.api_key)
            .query("hl", language)
            .query("src", text)
            .query("c", "MP3")
            .call()
            .map_err(|e| SdkError::Synthesis(e.to_string()))?;

        let mut audio = Vec::new();
        response.into_reader().read_to_end(&mut audio)?;

        // VoiceRSS reports failures as a 200 with a text body
        if audio.starts_with(b"ERROR") {
            return Err(SdkError::Synthesis(
                String::from_utf8_lossy(&audio).trim().to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(SdkError::Synthesis("empty response".to_string()));
        }
        Ok(audio)
    }
}

/// A local directory that speakers see as `//{share}/{subdirectory}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    filesystem_path: PathBuf,
    share: String,
    subdirectory: String,
}

impl Directory {
    pub fn new(
        filesystem_path: impl Into<PathBuf>,
        share: impl Into<String>,
        subdirectory: impl Into<String>,
    ) -> Self {
        Self {
            filesystem_path: filesystem_path.into(),
            share: share.into().trim_matches('/').to_string(),
            subdirectory: subdirectory.into().trim_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.filesystem_path
    }

    /// The `x-file-cifs` URI of `file` inside this directory
    pub fn uri(&self, file: &str) -> String {
        if self.subdirectory.is_empty() {
            format!("x-file-cifs://{}/{}", self.share, file)
        } else {
            format!("x-file-cifs://{}/{}/{}", self.share, self.subdirectory, file)
        }
    }
}

/// An announcement resolved lazily into an MP3 on a share
pub struct TextToSpeech<S: Synthesizer = VoiceRss> {
    text: String,
    language: String,
    directory: Directory,
    provider: S,
    resolved: OnceLock<Track>,
}

impl<S: Synthesizer> TextToSpeech<S> {
    pub fn new(text: impl Into<String>, directory: Directory, provider: S) -> Self {
        Self {
            text: text.into(),
            language: "en-gb".to_string(),
            directory,
            provider,
            resolved: OnceLock::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self.resolved = OnceLock::new();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Content-derived file name, `{md5}.mp3`
    pub fn filename(&self) -> String {
        let key = format!("{}|{}|{}", self.provider.name(), self.language, self.text);
        format!("{:x}.mp3", md5::compute(key.as_bytes()))
    }

    fn synthesize_to_directory(&self) -> Result<Track> {
        if self.text.trim().is_empty() {
            return Err(SdkError::InvalidArgument("no text to speak".to_string()));
        }

        let filename = self.filename();
        let path = self.directory.path().join(&filename);
        if path.exists() {
            tracing::debug!(file = %path.display(), "reusing synthesised speech");
        } else {
            let audio = self.provider.synthesize(&self.text, &self.language)?;
            std::fs::create_dir_all(self.directory.path())?;
            std::fs::write(&path, audio)?;
            tracing::info!(file = %path.display(), provider = self.provider.name(), "synthesised speech");
        }

        Ok(Track::network_file(self.directory.uri(&filename)).with_title(self.text.clone()))
    }
}

impl<S: Synthesizer> Playable for TextToSpeech<S> {
    fn resolve(&self) -> Result<Track> {
        if let Some(track) = self.resolved.get() {
            return Ok(track.clone());
        }
        let track = self.synthesize_to_directory()?;
        let _ = self.resolved.set(track.clone());
        Ok(track)
    }
}

impl<S: Synthesizer> std::fmt::Debug for TextToSpeech<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextToSpeech")
            .field("text", &self.text)
            .field("language", &self.language)
            .field("provider", &self.provider.name())
            .field("directory", &self.directory)
            .finish()
    }
}
