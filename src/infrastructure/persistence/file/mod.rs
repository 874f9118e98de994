//! File Persistence - 基于目录的单元库

mod unit_store;

pub use unit_store::FileUnitStore;

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// 先写入同目录下的临时文件，再 rename 覆盖目标文件
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial: PathBuf = path.with_file_name(format!(".{}.{}.partial", file_name, Uuid::new_v4()));

    fs::write(&partial, data).await?;
    if let Err(e) = fs::rename(&partial, path).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(())
}
