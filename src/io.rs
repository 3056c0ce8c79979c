use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};

#[derive(Serialize)]
struct Sidecar<'a> {
    id: u64,
    run_id: &'a str,
    topic: &'a str,
    text: &'a str,
    chars: usize,
    created_at: String,
}

/// Writes one brief as `NNNNNN.txt` plus a JSON sidecar, both via tmp-rename
/// so a crash never leaves a half-written file behind.
pub async fn save_brief(
    out_dir: &Path,
    id: u64,
    run_id: &str,
    topic: &str,
    text: &str,
) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).await?;

    let txt_tmp = out_dir.join(format!("{:06}.txt.tmp", id));
    let txt = out_dir.join(format!("{:06}.txt", id));
    let json_tmp = out_dir.join(format!("{:06}.json.tmp", id));
    let json = out_dir.join(format!("{:06}.json", id));

    {
        let mut f = fs::File::create(&txt_tmp).await?;
        f.write_all(text.as_bytes()).await?;
        let _ = f.sync_all().await; // best-effort
    }
    fs::rename(&txt_tmp, &txt).await?;

    let sidecar = Sidecar {
        id,
        run_id,
        topic,
        text,
        chars: text.chars().count(),
        created_at: Utc::now().to_rfc3339(),
    };
    let sidecar_bytes = serde_json::to_vec_pretty(&sidecar)?;
    {
        let mut f = fs::File::create(&json_tmp).await?;
        f.write_all(&sidecar_bytes).await?;
        let _ = f.sync_all().await;
    }
    fs::rename(&json_tmp, &json).await?;
    Ok(())
}
