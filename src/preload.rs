// Readiness barrier: every frame is fetched concurrently; the first failure aborts the wait.

use std::future::Future;

use futures::future::try_join_all;

use crate::error::ViewerError;
use crate::frames::FrameSet;

/// Fetches a single frame. Resolves once the resource is fetched and decodable.
pub trait FramePreloader {
    type Load: Future<Output = Result<(), ViewerError>>;

    fn load(&self, frame: &str) -> Self::Load;
}

/// Wait until every frame has loaded. No completion order is assumed.
pub async fn preload_all<P: FramePreloader>(
    preloader: &P,
    frames: &FrameSet,
) -> Result<(), ViewerError> {
    log::debug!("Preloading {} frames", frames.len());
    let loads = frames.iter().map(|frame| preloader.load(frame));
    try_join_all(loads).await.map_err(|err| {
        log::warn!("Frame preload failed: {}", err);
        err
    })?;
    log::debug!("All {} frames preloaded", frames.len());
    Ok(())
}
