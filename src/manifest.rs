use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

/// One JSONL line per saved brief.
#[derive(Debug, Serialize, Clone)]
pub struct ManifestRecord<'a> {
    pub id: u64,
    pub run_id: &'a str,
    pub topic: &'a str,
    pub text: &'a str,
    pub chars: usize,
    pub created_at: String,
}

pub struct ManifestWriter {
    file: Arc<Mutex<tokio::fs::File>>,
}

impl ManifestWriter {
    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        Ok(Self { file: Arc::new(Mutex::new(file)) })
    }

    pub async fn append(&self, rec: &ManifestRecord<'_>) -> anyhow::Result<()> {
        let mut f = self.file.lock().await;
        let line = serde_json::to_vec(rec)?;
        f.write_all(&line).await?;
        f.write_all(b"\n").await?;
        f.flush().await?;
        Ok(())
    }
}
