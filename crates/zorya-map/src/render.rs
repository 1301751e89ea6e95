//! Parallel map rendering.
//!
//! Drives one map per worker over a caller-sized rayon pool. Composition is
//! strictly sequential within a worker - each canvas is exclusively owned by
//! the worker that allocated it - and the sink only ever receives finished
//! canvases, so a failed map can never leave a partial composite behind.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use zorya_common::Raster;

use crate::composite::{compose, RasterSource};
use crate::manifest::Map;
use crate::{Error, Result};

/// Worker concurrency for map rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// One worker per map, no cap.
    Unbounded,
    /// At most `n` workers (values below 1 are clamped to 1).
    Limit(usize),
}

/// Statistics from a render run.
///
/// Per-map failures are carried here rather than aborting the run - one bad
/// map must not take its siblings down with it.
#[derive(Debug)]
pub struct RenderStats {
    /// Number of maps successfully rendered.
    pub rendered: usize,
    /// Total number of maps attempted.
    pub total: usize,
    /// (map name, error) for each failed map.
    pub failures: Vec<(String, Error)>,
}

impl RenderStats {
    /// Check if every map rendered successfully.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.rendered == self.total
    }
}

/// Parallel map renderer.
pub struct MapRenderer {
    concurrency: Concurrency,
}

impl MapRenderer {
    /// Create a renderer with unbounded concurrency.
    pub fn new() -> Self {
        Self {
            concurrency: Concurrency::Unbounded,
        }
    }

    /// Set the worker concurrency.
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Compose every map and hand each finished canvas to `sink`.
    ///
    /// The progress callback receives (completed, total) counts. Failures
    /// are collected per map; sibling maps keep rendering.
    pub fn render_all<S, W, F>(
        &self,
        maps: &[Map],
        source: &S,
        sink: W,
        mut progress: F,
    ) -> Result<RenderStats>
    where
        S: RasterSource,
        W: Fn(&Map, &Raster) -> Result<()> + Sync,
        F: FnMut(usize, usize) + Send,
    {
        let total = maps.len();
        let threads = match self.concurrency {
            Concurrency::Unbounded => total.max(1),
            Concurrency::Limit(n) => n.max(1),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let rendered = AtomicUsize::new(0);
        let failures: Mutex<Vec<(String, Error)>> = Mutex::new(Vec::new());
        let progress = Mutex::new(&mut progress);

        pool.install(|| {
            maps.par_iter().for_each(|map| {
                // Decode-and-blit for one map stays on this worker; the
                // canvas is never shared
                let result = compose(map, source).and_then(|canvas| sink(map, &canvas));

                let done = match result {
                    Ok(()) => rendered.fetch_add(1, Ordering::Relaxed) + 1,
                    Err(err) => {
                        let mut failed = failures.lock();
                        failed.push((map.name().to_string(), err));
                        rendered.load(Ordering::Relaxed) + failed.len()
                    }
                };

                if let Some(mut p) = progress.try_lock() {
                    (*p)(done, total);
                }
            });
        });

        // Final progress update
        (*progress.lock())(total, total);

        Ok(RenderStats {
            rendered: rendered.load(Ordering::Relaxed),
            total,
            failures: failures.into_inner(),
        })
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}
