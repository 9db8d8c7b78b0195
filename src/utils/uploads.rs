use actix_multipart::Field;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::warn;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Local-disk image storage. Files are written under a fixed directory and
/// referenced by their public `/uploads/<name>` path.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        UploadStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Millisecond timestamp plus a random suffix, keeping the uploaded
    /// file's extension. Collision-resistant, not collision-proof.
    fn unique_name(original: &str) -> String {
        let ext = Path::new(original)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let millis = Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("{}-{}{}", millis, suffix, ext)
    }

    /// Streams one multipart file field to disk and returns its public path.
    /// Content type and size are not inspected; whatever arrives is stored.
    pub async fn save_field(&self, field: &mut Field) -> Result<String, AppError> {
        let original = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_owned();
        let name = Self::unique_name(&original);
        let path = self.dir.join(&name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|err| AppError::Internal(format!("create {}: {}", path.display(), err)))?;
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| AppError::BadRequest(format!("malformed upload: {}", err)))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|err| AppError::Internal(format!("write {}: {}", path.display(), err)))?;
        }

        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    /// Best-effort removal of a previously stored image. Only bare file names
    /// under the public prefix are touched; failures are logged, not returned.
    pub fn remove(&self, public_path: &str) {
        let name = match public_path.strip_prefix(&format!("{}/", PUBLIC_PREFIX)) {
            Some(name) => name,
            None => {
                warn!("not an upload path, skipping delete: {}", public_path);
                return;
            }
        };
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            warn!("refusing to delete suspicious upload name: {}", name);
            return;
        }
        let full = self.dir.join(name);
        if let Err(err) = fs::remove_file(&full) {
            warn!("failed to delete image {}: {}", full.display(), err);
        }
    }
}
