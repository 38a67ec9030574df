//! Background grid generation.
//!
//! A [`GenerationJob`] builds tiles on a worker thread in its own buffers and hands the result
//! back over a channel. The owning thread applies it with
//! [`crate::grid::GridStore::apply_generated`], so queries never see a half-built grid.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
};

use bevy::{log, platform::collections::HashMap};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    error::GenerationError,
    grid::{ColumnIndex, GridSettings},
    index::Index3,
    macros::timed,
    tile::{Tile, TileKind},
};

/// Which tiles of the bounds a job fills. Every generated tile is `Normal` at z = 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Every `(x, y)` in bounds.
    #[default]
    Full,
    /// Only the outer ring of the bounds.
    Border,
}

impl GenerationMode {
    fn includes(self, settings: &GridSettings, x: i32, y: i32) -> bool {
        match self {
            GenerationMode::Full => true,
            GenerationMode::Border => {
                x == 0 || y == 0 || x == settings.count_x - 1 || y == settings.count_y - 1
            }
        }
    }
}

/// A finished grid waiting to be applied to a [`crate::grid::GridStore`].
#[derive(Debug, Clone)]
pub struct GeneratedGrid {
    pub(crate) settings: GridSettings,
    pub(crate) tiles: HashMap<Index3, Tile>,
    pub(crate) columns: ColumnIndex,
}

impl GeneratedGrid {
    fn new(settings: GridSettings) -> Self {
        GeneratedGrid {
            settings,
            tiles: HashMap::new(),
            columns: ColumnIndex::new(),
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, index: Index3) -> bool {
        self.tiles.contains_key(&index)
    }

    fn insert(&mut self, tile: Tile) {
        let index = tile.index;
        self.tiles.insert(index, tile);
        self.columns.entry(index.column()).or_default().insert(index.z);
    }
}

/// Handle to a grid being built on a worker thread.
///
/// # Example
/// ```
/// use tactical_grid::prelude::*;
///
/// let settings = GridSettingsBuilder::new(8, 8).build();
/// let job = GenerationJob::spawn(settings, GenerationMode::Full);
///
/// let mut grid = GridStore::new(settings);
/// grid.apply_generated(job.wait().unwrap());
/// assert_eq!(grid.len(), 64);
/// ```
pub struct GenerationJob {
    cancel: Arc<AtomicBool>,
    receiver: Receiver<Result<GeneratedGrid, GenerationError>>,
    handle: Option<JoinHandle<()>>,
}

impl GenerationJob {
    /// Starts building a grid for `settings` on a new thread.
    pub fn spawn(settings: GridSettings, mode: GenerationMode) -> Self {
        let (sender, receiver) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        log::info!(
            "Generating {}x{} grid ({:?})",
            settings.count_x(),
            settings.count_y(),
            mode
        );

        let handle = thread::spawn(move || {
            let result = timed!("generate", { generate(settings, mode, &flag) });
            // The job may have been dropped. Nobody is left to care.
            let _ = sender.send(result);
        });

        GenerationJob {
            cancel,
            receiver,
            handle: Some(handle),
        }
    }

    /// Asks the worker to stop. Checked between rows.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// True once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Polls for the result without blocking. `None` while the worker is still running.
    pub fn try_recv(&mut self) -> Option<Result<GeneratedGrid, GenerationError>> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GenerationError::WorkerDisconnected)),
        }
    }

    /// Blocks until the worker delivers its result.
    pub fn wait(mut self) -> Result<GeneratedGrid, GenerationError> {
        let result = self
            .receiver
            .recv()
            .map_err(|_| GenerationError::WorkerDisconnected)?;
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Generation worker panicked after sending its result");
            }
        }
    }
}

/// A dropped job can never be received, so the worker is told to stop.
impl Drop for GenerationJob {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn generate(
    settings: GridSettings,
    mode: GenerationMode,
    cancel: &AtomicBool,
) -> Result<GeneratedGrid, GenerationError> {
    let mut generated = GeneratedGrid::new(settings);

    for x in 0..settings.count_x() {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("Generation cancelled at row {}", x);
            return Err(GenerationError::Cancelled);
        }

        for tile in build_row(&settings, mode, x) {
            generated.insert(tile);
        }
    }

    log::debug!("Generated {} tiles", generated.len());

    Ok(generated)
}

fn build_row(settings: &GridSettings, mode: GenerationMode, x: i32) -> Vec<Tile> {
    #[cfg(feature = "parallel")]
    let ys = (0..settings.count_y()).into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let ys = 0..settings.count_y();

    ys.filter(|&y| mode.includes(settings, x, y))
        .map(|y| {
            let index = Index3::new(x, y, 0);
            Tile::new(index, TileKind::Normal, settings.canonical_placement(index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridSettingsBuilder, GridStore};

    #[test]
    fn test_full_generation() {
        let settings = GridSettingsBuilder::new(6, 4).build();
        let generated = GenerationJob::spawn(settings, GenerationMode::Full)
            .wait()
            .unwrap();

        assert_eq!(generated.len(), 24);
        assert!(generated.contains(Index3::new(5, 3, 0)));
        assert!(!generated.contains(Index3::new(6, 0, 0)));

        let mut grid = GridStore::new(GridSettingsBuilder::new(2, 2).build());
        grid.bulk_add(&[Index3::new(1, 1, 4)]);
        grid.apply_generated(generated);

        assert_eq!(grid.len(), 24);
        assert_eq!(grid.settings().count_x(), 6);
        assert!(!grid.contains(Index3::new(1, 1, 4)));
        assert_eq!(
            grid.get(Index3::new(2, 1, 0)).unwrap().placement,
            settings.canonical_placement(Index3::new(2, 1, 0))
        );
        grid.check_invariants();
    }

    #[test]
    fn test_border_generation() {
        let settings = GridSettingsBuilder::new(5, 4).build();
        let generated = GenerationJob::spawn(settings, GenerationMode::Border)
            .wait()
            .unwrap();

        // 2 * 5 + 2 * (4 - 2)
        assert_eq!(generated.len(), 14);
        assert!(generated.contains(Index3::new(0, 2, 0)));
        assert!(generated.contains(Index3::new(4, 3, 0)));
        assert!(!generated.contains(Index3::new(2, 2, 0)));
    }

    #[test]
    fn test_poll_until_finished() {
        let settings = GridSettingsBuilder::new(3, 3).build();
        let mut job = GenerationJob::spawn(settings, GenerationMode::Full);

        let result = loop {
            if let Some(result) = job.try_recv() {
                break result;
            }
            thread::yield_now();
        };

        assert_eq!(result.unwrap().len(), 9);
        assert!(job.is_finished());
        assert_eq!(job.try_recv().unwrap().err(), Some(GenerationError::WorkerDisconnected));
    }

    #[test]
    fn test_cancelled_before_first_row() {
        let settings = GridSettingsBuilder::new(4, 4).build();
        let cancel = AtomicBool::new(true);

        assert_eq!(
            generate(settings, GenerationMode::Full, &cancel).err(),
            Some(GenerationError::Cancelled)
        );
    }

    #[test]
    fn test_cancel_job() {
        let settings = GridSettingsBuilder::new(256, 256).build();
        let job = GenerationJob::spawn(settings, GenerationMode::Full);
        job.cancel();

        assert!(job.is_cancelled());
        // The worker may finish before it sees the flag.
        match job.wait() {
            Ok(generated) => assert_eq!(generated.len(), 256 * 256),
            Err(e) => assert_eq!(e, GenerationError::Cancelled),
        }
    }

    #[test]
    fn test_drop_cancels_worker() {
        let settings = GridSettingsBuilder::new(256, 256).build();
        let job = GenerationJob::spawn(settings, GenerationMode::Full);
        let flag = job.cancel.clone();
        assert!(!flag.load(Ordering::Relaxed));

        drop(job);

        assert!(flag.load(Ordering::Relaxed));
    }
}
