//! Filesystem helpers for work and output directories.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Create `dir` (and parents) if it does not exist yet.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> MediaResult<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir).await?;
        tracing::debug!(dir = %dir.display(), "Created directory");
    } else if !dir.is_dir() {
        return Err(MediaError::internal(format!(
            "{} exists but is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

/// Move a file from `src` to `dst`. An existing `dst` is never replaced.
///
/// Tries a rename first. Across filesystems (EXDEV) it copies to a sibling
/// temp file of `dst`, renames that into place and removes `src`.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        ensure_dir(parent).await?;
    }

    if fs::try_exists(dst).await? {
        return Err(MediaError::OutputExists(dst.to_path_buf()));
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, copying instead"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = dst.with_extension("partial");

    if let Err(e) = fs::copy(src, &tmp_dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        tracing::error!(src = %src.display(), error = %e, "Copy failed during move");
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        tracing::error!(dst = %dst.display(), error = %e, "Rename failed during move");
        return Err(e.into());
    }

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(src = %src.display(), error = %e, "Could not remove source after move");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_move_file_same_filesystem() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("segment-001").join("short.mp4");
        let dst = dir.path().join("short_video_1.mp4");

        fs::create_dir(src.parent().unwrap()).await.unwrap();
        fs::write(&src, b"composed").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "composed");
    }

    #[tokio::test]
    async fn test_move_file_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("short.mp4");
        let dst = dir.path().join("out").join("nested").join("short_video_2.mp4");

        fs::write(&src, b"x").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(dst.exists());
    }

    #[tokio::test]
    async fn test_move_file_keeps_existing_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("short.mp4");
        let dst = dir.path().join("short_video_1.mp4");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"earlier run").await.unwrap();

        let result = move_file(&src, &dst).await;

        assert!(matches!(result, Err(MediaError::OutputExists(p)) if p == dst));
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "earlier run");
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_move_file_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = move_file(dir.path().join("nope.mp4"), dir.path().join("dst.mp4")).await;
        assert!(matches!(result, Err(MediaError::Io(_))));
    }

    #[tokio::test]
    async fn test_ensure_dir() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work").join("run");
        assert_ok!(ensure_dir(&work).await);
        assert!(work.is_dir());
        assert_ok!(ensure_dir(&work).await);

        let file = dir.path().join("file");
        fs::write(&file, b"x").await.unwrap();
        assert_err!(ensure_dir(&file).await);
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
