use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub const DEFAULT_OUTPUT_PREFIX: &str = "id_card_";
pub const OUTPUT_EXTENSION: &str = "jpeg";
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("output file name is empty")]
    MissingFileName,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Final encoded image handed to the output consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedOutput {
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl CroppedOutput {
    pub fn jpeg(prefix: &str, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            file_name: output_file_name(prefix, unix_millis()),
            mime_type: OUTPUT_MIME_TYPE,
            width,
            height,
            bytes,
        }
    }
}

/// Receives committed output; wrapping it as a file object or uploading it is the consumer's job.
pub trait OutputConsumer {
    fn consume(&mut self, output: &CroppedOutput) -> StorageResult<()>;
}

/// Writes outputs into a directory, one file per save.
#[derive(Debug, Clone)]
pub struct DirectoryOutput {
    output_dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectoryOutput {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            saved: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn saved_paths(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn target_path(&self, output: &CroppedOutput) -> StorageResult<PathBuf> {
        if output.file_name.is_empty() {
            return Err(StorageError::MissingFileName);
        }
        Ok(self.output_dir.join(&output.file_name))
    }
}

impl OutputConsumer for DirectoryOutput {
    fn consume(&mut self, output: &CroppedOutput) -> StorageResult<()> {
        let target = self.target_path(output)?;
        fs::create_dir_all(&self.output_dir)?;
        fs::write(&target, &output.bytes)?;
        tracing::info!(
            path = %target.display(),
            width = output.width,
            height = output.height,
            "cropped output saved"
        );
        self.saved.push(target);
        Ok(())
    }
}

/// Keeps outputs in memory; useful for hosts that forward bytes themselves.
#[derive(Debug, Default, Clone)]
pub struct MemoryOutput {
    pub outputs: Vec<CroppedOutput>,
}

impl OutputConsumer for MemoryOutput {
    fn consume(&mut self, output: &CroppedOutput) -> StorageResult<()> {
        self.outputs.push(output.clone());
        Ok(())
    }
}

pub fn output_file_name(prefix: &str, millis: u128) -> String {
    format!("{prefix}{millis}.{OUTPUT_EXTENSION}")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
