//! Hook into the host's frame/idle scheduling.
//!
//! Some calls only complete once the host has had a chance to flush pending
//! visual updates. The hook only delays completion; it never changes data.

use std::future::Future;
use std::pin::Pin;

pub type FrameFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

pub trait FrameScheduler: Send + Sync {
    /// Resolves once the host has reached its next frame
    fn next_frame(&self) -> FrameFuture<'_>;
}

/// Completes immediately. Used when there is no UI to wait for.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateFrames;

impl FrameScheduler for ImmediateFrames {
    fn next_frame(&self) -> FrameFuture<'_> {
        Box::pin(std::future::ready(()))
    }
}

/// Yields once to the tokio scheduler so other tasks get to run.
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldFrames;

impl FrameScheduler for YieldFrames {
    fn next_frame(&self) -> FrameFuture<'_> {
        Box::pin(tokio::task::yield_now())
    }
}
