// storage.rs - Whole-file JSON persistence shared by the stores
// Every store reads its full document and rewrites it pretty-printed on each change

use crate::error::{StoreError, StoreResult};
use serde::{de::DeserializeOwned, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read and parse the whole document at `path`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    // Hand-edited files on Windows tend to carry a BOM
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    serde_json::from_str(content).map_err(|e| StoreError::CorruptData {
        path: path.to_path_buf(),
        source: e,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `value` pretty-printed and replace `path` with it.
/// The document goes to a sibling temp file first and is renamed over `path`,
/// so readers see either the old or the new document, never a partial one.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let temp = temp_path(path);

    tokio::fs::write(&temp, json)
        .await
        .map_err(|e| StoreError::Io {
            path: temp.clone(),
            source: e,
        })?;

    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

/// Seed `path` with `empty` if it does not exist yet. Returns true when the file was created.
pub async fn ensure_file<T: Serialize + ?Sized>(path: &Path, empty: &T) -> StoreResult<bool> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
    }

    write_json(path, empty).await?;
    log::info!("📂 Created empty data file {}", path.display());
    Ok(true)
}
