//! Capture feeds deliver snapshots to a session one at a time.

use super::capture::read_capture;
use crate::session::Snapshot;
use crate::utils::error::ParseError;
use log::debug;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Source of captured snapshots
///
/// Returns `None` once the source is exhausted.
pub trait CaptureFeed {
    fn next_capture(&mut self) -> Option<Result<Snapshot, ParseError>>;
}

/// Feed reading capture files in the order given
#[derive(Debug, Clone, Default)]
pub struct FileFeed {
    paths: VecDeque<PathBuf>,
}

impl FileFeed {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Captures not yet delivered
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl CaptureFeed for FileFeed {
    fn next_capture(&mut self) -> Option<Result<Snapshot, ParseError>> {
        let path = self.paths.pop_front()?;
        debug!("Feeding capture {}", path.display());
        Some(read_capture(&path))
    }
}

impl<F: CaptureFeed + ?Sized> CaptureFeed for &mut F {
    fn next_capture(&mut self) -> Option<Result<Snapshot, ParseError>> {
        (**self).next_capture()
    }
}
