//! Filesystem helpers for moving artifacts out of the scratch workspace.
//!
//! The workspace usually lives under the system temp directory, which is
//! often a different filesystem than the output root. A plain rename then
//! fails with EXDEV and has to become copy + delete.

use std::path::Path;
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::MediaResult;

/// EXDEV on Linux and macOS.
const EXDEV: i32 = 18;

/// Move `src` to `dst`, creating the destination directory if needed.
///
/// ```ignore
/// use clipstorm_media::fs_utils::move_file;
///
/// move_file(job_dir.join("final.mp4"), output_dir.join("promo_h_v.mp4")).await?;
/// ```
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    ensure_parent(dst).await?;

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, falling back to copy + delete"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Copy `src` to `dst`, creating the destination directory if needed.
pub async fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<u64> {
    let dst = dst.as_ref();
    ensure_parent(dst).await?;
    Ok(fs::copy(src.as_ref(), dst).await?)
}

async fn ensure_parent(path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(EXDEV)
}

/// Copy next to `dst`, rename into place, then delete `src`.
async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let partial = dst.with_extension("partial");

    if let Err(e) = fs::copy(src, &partial).await {
        error!(
            src = %src.display(),
            dst = %partial.display(),
            error = %e,
            "Copy failed during cross-device move"
        );
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&partial, dst).await {
        error!(
            src = %partial.display(),
            dst = %dst.display(),
            error = %e,
            "Rename failed during cross-device move"
        );
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }

    // The workspace is removed at batch end anyway
    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), error = %e, "Failed to remove source after move");
    }

    Ok(())
}
