//! Text-to-speech through an external program.
//!
//! The program receives the text on stdin and writes a WAV file to the path
//! substituted for `{output}` in its argument list. Results are cached by
//! content hash, so repeated requests for the same text are served from disk.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::{TtsSettings, TTS_MAX_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
  #[error("Text to speak is empty")]
  EmptyText,

  #[error("Text is longer than {max} characters")]
  TooLong { max: usize },

  #[error("Could not start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Speech synthesis timed out after {0} seconds")]
  Timeout(u64),

  #[error("Speech synthesis failed (exit code {code:?}): {stderr}")]
  Failed { code: Option<i32>, stderr: String },

  #[error("Speech synthesizer produced no audio")]
  MissingOutput,

  #[error("Audio cache error: {0}")]
  Io(#[from] std::io::Error),
}

pub struct TtsEngine {
  settings: TtsSettings,
}

impl TtsEngine {
  pub fn new(settings: TtsSettings) -> Self {
    Self { settings }
  }

  pub fn program(&self) -> &str {
    &self.settings.program
  }

  /// Cache path for a piece of text. The key covers the program and its
  /// arguments so switching voices does not serve stale audio.
  pub fn cache_path(&self, text: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(self.settings.program.as_bytes());
    for arg in &self.settings.args {
      hasher.update([0u8]);
      hasher.update(arg.as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    self
      .settings
      .cache_dir
      .join(format!("{}.wav", hex::encode(hasher.finalize())))
  }

  /// Synthesize `text` and return WAV bytes
  pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
    let text = validate_text(text)?;

    let output = self.cache_path(text);
    if let Ok(bytes) = tokio::fs::read(&output).await {
      tracing::debug!("TTS cache hit {}", output.display());
      return Ok(bytes);
    }

    tokio::fs::create_dir_all(&self.settings.cache_dir).await?;
    // Each request writes its own file; concurrent requests for the same text
    // both rename onto the cache path and the last one wins
    let partial = output.with_extension(format!("{:016x}.partial.wav", rand::random::<u64>()));
    if let Err(e) = self.run_program(text, &partial).await {
      let _ = tokio::fs::remove_file(&partial).await;
      return Err(e);
    }

    let bytes = match tokio::fs::read(&partial).await {
      Ok(bytes) if !bytes.is_empty() => bytes,
      _ => {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(TtsError::MissingOutput);
      }
    };
    if let Err(e) = tokio::fs::rename(&partial, &output).await {
      let _ = tokio::fs::remove_file(&partial).await;
      return Err(e.into());
    }
    Ok(bytes)
  }

  async fn run_program(&self, text: &str, output: &Path) -> Result<(), TtsError> {
    let output_arg = output.to_string_lossy();
    let args: Vec<String> = self
      .settings
      .args
      .iter()
      .map(|a| a.replace("{output}", &output_arg))
      .collect();

    tracing::debug!("Running {} for {} chars of speech", self.settings.program, text.len());
    let mut child = Command::new(&self.settings.program)
      .args(&args)
      .stdin(Stdio::piped())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| TtsError::Spawn {
        program: self.settings.program.clone(),
        source,
      })?;

    if let Some(mut stdin) = child.stdin.take() {
      // A program that ignores stdin may already have exited; its status decides
      if let Err(e) = stdin.write_all(text.as_bytes()).await {
        tracing::debug!("TTS stdin write failed: {}", e);
      }
    }

    let result = tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await;
    let finished = match result {
      Ok(finished) => finished?,
      Err(_) => return Err(TtsError::Timeout(self.settings.timeout.as_secs())),
    };

    if !finished.status.success() {
      let stderr = String::from_utf8_lossy(&finished.stderr);
      return Err(TtsError::Failed {
        code: finished.status.code(),
        stderr: stderr.trim().chars().take(300).collect(),
      });
    }
    Ok(())
  }
}

/// Trimmed text if it is speakable
pub fn validate_text(text: &str) -> Result<&str, TtsError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(TtsError::EmptyText);
  }
  if text.chars().count() > TTS_MAX_CHARS {
    return Err(TtsError::TooLong { max: TTS_MAX_CHARS });
  }
  Ok(text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use tempfile::TempDir;

  fn engine(temp: &TempDir, script: &str, timeout: Duration) -> TtsEngine {
    TtsEngine::new(TtsSettings {
      program: "sh".into(),
      args: vec!["-c".into(), script.into(), "{output}".into()],
      timeout,
      cache_dir: temp.path().join("tts"),
    })
  }

  #[test]
  fn test_validate_text() {
    assert!(matches!(validate_text("   "), Err(TtsError::EmptyText)));
    assert!(matches!(
      validate_text(&"a".repeat(TTS_MAX_CHARS + 1)),
      Err(TtsError::TooLong { .. })
    ));
    assert_eq!(validate_text("  hello ").unwrap(), "hello");
  }

  #[test]
  fn test_cache_path_depends_on_text_and_args() {
    let temp = TempDir::new().unwrap();
    let a = engine(&temp, "true", Duration::from_secs(1));
    let b = engine(&temp, "false", Duration::from_secs(1));
    assert_eq!(a.cache_path("hi"), a.cache_path("hi"));
    assert_ne!(a.cache_path("hi"), a.cache_path("ho"));
    assert_ne!(a.cache_path("hi"), b.cache_path("hi"));
    assert!(a.cache_path("hi").extension().is_some_and(|e| e == "wav"));
  }

  #[tokio::test]
  async fn test_synthesize_reads_stdin_and_caches() {
    let temp = TempDir::new().unwrap();
    // Echo the text back as the "audio" so stdin delivery is observable
    let tts = engine(&temp, "cat > \"$0\"", Duration::from_secs(5));
    let bytes = tts.synthesize("Hello there").await.unwrap();
    assert_eq!(bytes, b"Hello there");
    assert!(tts.cache_path("Hello there").exists());

    // Cached copy is served even if the program would now fail
    let broken = TtsEngine::new(TtsSettings {
      program: "sh".into(),
      args: vec!["-c".into(), "cat > \"$0\"".into(), "{output}".into()],
      timeout: Duration::from_secs(5),
      cache_dir: temp.path().join("tts"),
    });
    std::fs::write(broken.cache_path("Hello there"), b"cached").unwrap();
    assert_eq!(broken.synthesize("Hello there").await.unwrap(), b"cached");
  }

  #[tokio::test]
  async fn test_failure_exit_code() {
    let temp = TempDir::new().unwrap();
    let tts = engine(&temp, "echo bad voice >&2; exit 3", Duration::from_secs(5));
    match tts.synthesize("hi").await {
      Err(TtsError::Failed { code, stderr }) => {
        assert_eq!(code, Some(3));
        assert_eq!(stderr, "bad voice");
      }
      other => panic!("unexpected {:?}", other.map(|b| b.len())),
    }
  }

  fn cache_files(temp: &TempDir) -> Vec<String> {
    std::fs::read_dir(temp.path().join("tts"))
      .map(|dir| {
        dir
          .filter_map(|entry| entry.ok())
          .map(|entry| entry.file_name().to_string_lossy().into_owned())
          .collect()
      })
      .unwrap_or_default()
  }

  #[tokio::test]
  async fn test_concurrent_requests_for_same_text() {
    let temp = TempDir::new().unwrap();
    let tts = engine(&temp, "cat > \"$0\"; sleep 0.2", Duration::from_secs(5));
    let (a, b) = tokio::join!(tts.synthesize("hello there"), tts.synthesize("hello there"));
    assert_eq!(a.unwrap(), b"hello there");
    assert_eq!(b.unwrap(), b"hello there");
    let files = cache_files(&temp);
    assert_eq!(files.len(), 1, "{:?}", files);
    assert!(!files[0].contains("partial"));
  }

  #[tokio::test]
  async fn test_failed_run_removes_partial_output() {
    let temp = TempDir::new().unwrap();
    let tts = engine(&temp, "printf RIFF > \"$0\"; exit 3", Duration::from_secs(5));
    assert!(matches!(tts.synthesize("hi").await, Err(TtsError::Failed { .. })));
    assert!(cache_files(&temp).is_empty());

    let slow = engine(&temp, "printf RIFF > \"$0\"; sleep 5", Duration::from_millis(300));
    assert!(matches!(slow.synthesize("hi").await, Err(TtsError::Timeout(_))));
    assert!(cache_files(&temp).is_empty());
  }

  #[tokio::test]
  async fn test_missing_output() {
    let temp = TempDir::new().unwrap();
    let tts = engine(&temp, "cat > /dev/null", Duration::from_secs(5));
    assert!(matches!(tts.synthesize("hi").await, Err(TtsError::MissingOutput)));
  }

  #[tokio::test]
  async fn test_timeout() {
    let temp = TempDir::new().unwrap();
    let tts = engine(&temp, "sleep 5", Duration::from_millis(200));
    assert!(matches!(tts.synthesize("hi").await, Err(TtsError::Timeout(_))));
  }

  #[tokio::test]
  async fn test_missing_program() {
    let temp = TempDir::new().unwrap();
    let tts = TtsEngine::new(TtsSettings {
      program: "definitely-not-a-tts-binary".into(),
      args: vec![],
      timeout: Duration::from_secs(1),
      cache_dir: temp.path().join("tts"),
    });
    assert!(matches!(tts.synthesize("hi").await, Err(TtsError::Spawn { .. })));
  }
}
