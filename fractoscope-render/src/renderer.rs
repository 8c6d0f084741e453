use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;
use tracing::error;

use fractoscope_core::{
    shade, ColorScheme, Fractal, FractalVariant, Julia, Mandelbrot, ViewState, Viewport,
};

use crate::buffer::PixelBuffer;

// ---------------------------------------------------------------------------
// Render control
// ---------------------------------------------------------------------------

/// Shared state between the engine and its in-flight render jobs.
///
/// Advancing the generation tells every row of older jobs to stop early.
/// The in-flight counter backs the `Idle`/`Rendering` phase, and the
/// progress counters let a UI poll instead of subscribing to callbacks.
///
/// The generation only changes under the `publish` lock, and jobs publish
/// progress and results under it too (see
/// [`publish_if_current`](Self::publish_if_current)). A job that has been
/// superseded therefore never publishes after its successor was started.
#[derive(Debug)]
pub struct RenderControl {
    generation: AtomicU64,
    in_flight: AtomicUsize,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
    publish: Mutex<()>,
}

impl RenderControl {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            progress_done: AtomicUsize::new(0),
            progress_total: AtomicUsize::new(0),
            publish: Mutex::new(()),
        }
    }

    /// Start a new generation, cancelling all older ones. Returns the new one.
    ///
    /// Waits for any publication in progress to finish first.
    pub fn advance(&self) -> u64 {
        let _publish = self.lock_publish();
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start a new generation for a render of `total` rows, resetting the
    /// progress counters in the same step.
    pub fn start(&self, total: usize) -> u64 {
        let _publish = self.lock_publish();
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `publish` only if `generation` is still current, holding off
    /// generation changes until it returns.
    ///
    /// `publish` must not start a new generation itself.
    pub fn publish_if_current<R>(
        &self,
        generation: u64,
        publish: impl FnOnce() -> R,
    ) -> Option<R> {
        let _publish = self.lock_publish();
        self.is_current(generation).then(publish)
    }

    fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Number of render jobs that have not finished yet, superseded ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Register a job unconditionally.
    pub fn begin(self: &Arc<Self>) -> JobGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        JobGuard {
            control: Arc::clone(self),
        }
    }

    /// Register a job only if no other job is in flight.
    pub fn try_begin_exclusive(self: &Arc<Self>) -> Option<JobGuard> {
        self.in_flight
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| JobGuard {
                control: Arc::clone(self),
            })
    }

    pub fn inc_progress(&self) {
        self.progress_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)` rows, both from the same
    /// generation.
    pub fn progress(&self) -> (usize, usize) {
        let _publish = self.lock_publish();
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a job as in flight until dropped.
#[derive(Debug)]
pub struct JobGuard {
    control: Arc<RenderControl>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.control.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Turns row completions into integer percentages for a callback.
///
/// Deliveries are strictly increasing even though rows finish on many
/// threads at once: the last delivered value lives under the same lock as
/// the sink.
pub struct ProgressReporter<P> {
    total: usize,
    done: AtomicUsize,
    reported: AtomicU8,
    sink: Mutex<(u8, P)>,
}

impl<P: FnMut(u8)> ProgressReporter<P> {
    pub fn new(total: usize, sink: P) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            reported: AtomicU8::new(0),
            sink: Mutex::new((0, sink)),
        }
    }

    pub fn row_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let percent = if self.total == 0 {
            100
        } else {
            (done.min(self.total) * 100 / self.total) as u8
        };
        self.emit(percent);
    }

    /// Deliver the final 100 if rows did not already get there.
    pub fn finish(&self) {
        self.emit(100);
    }

    fn emit(&self, percent: u8) {
        if self.reported.fetch_max(percent, Ordering::Relaxed) >= percent {
            return;
        }
        let mut guard = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let (last, sink) = &mut *guard;
        if percent > *last {
            *last = percent;
            sink(percent);
        }
    }
}

// ---------------------------------------------------------------------------
// Row tasks
// ---------------------------------------------------------------------------

/// Per-render row bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStats {
    pub rows_rendered: usize,
    /// Rows never started because the render was cancelled.
    pub rows_skipped: usize,
    /// Rows whose task panicked. They are left black.
    pub rows_failed: usize,
}

/// Run one task per buffer row on the current rayon pool.
///
/// Each task owns its row slice exclusively. `should_continue` is checked
/// once at the top of every row. A panicking row is logged and left black
/// without disturbing its siblings; `on_row_done` fires for rendered and
/// failed rows alike so progress still reaches the total.
fn fill_rows<K, C, D>(
    buffer: &mut PixelBuffer,
    should_continue: C,
    on_row_done: D,
    kernel: K,
) -> RowStats
where
    K: Fn(u32, &mut [u32]) + Sync,
    C: Fn() -> bool + Sync,
    D: Fn() + Sync,
{
    let width = buffer.width as usize;
    if width == 0 || buffer.height == 0 {
        return RowStats::default();
    }

    let rendered = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    buffer
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(py, row)| {
            if !should_continue() {
                skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| kernel(py as u32, &mut *row)));
            match outcome {
                Ok(()) => {
                    rendered.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    row.fill(0);
                    failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        row = py,
                        reason = panic_message(&*payload),
                        "Row task panicked; row left black"
                    );
                }
            }
            on_row_done();
        });

    RowStats {
        rows_rendered: rendered.into_inner(),
        rows_skipped: skipped.into_inner(),
        rows_failed: failed.into_inner(),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Iterate and shade every pixel of `buffer` for `fractal` seen through `viewport`.
///
/// Generic over the fractal type for static dispatch in the pixel loop.
pub fn render_rows<F, C, D>(
    fractal: &F,
    viewport: &Viewport,
    scheme: ColorScheme,
    buffer: &mut PixelBuffer,
    should_continue: C,
    on_row_done: D,
) -> RowStats
where
    F: Fractal + Sync,
    C: Fn() -> bool + Sync,
    D: Fn() + Sync,
{
    let (width, height) = (buffer.width, buffer.height);
    let max_iterations = fractal.max_iterations();
    fill_rows(buffer, should_continue, on_row_done, |py, row| {
        for (px, pixel) in row.iter_mut().enumerate() {
            let point = viewport.pixel_to_complex(px as u32, py, width, height);
            *pixel = shade(fractal.iterate(point), max_iterations, scheme);
        }
    })
}

/// Render a view snapshot into `buffer`, choosing the kernel from its variant.
pub fn render_view<C, D>(
    view: &ViewState,
    buffer: &mut PixelBuffer,
    should_continue: C,
    on_row_done: D,
) -> RowStats
where
    C: Fn() -> bool + Sync,
    D: Fn() + Sync,
{
    let max_iterations = view.max_iterations();
    let scheme = view.color_scheme();
    match view.variant() {
        FractalVariant::Mandelbrot => render_rows(
            &Mandelbrot::new(max_iterations),
            view.viewport(),
            scheme,
            buffer,
            should_continue,
            on_row_done,
        ),
        FractalVariant::Julia => render_rows(
            &Julia::new(view.julia_c(), max_iterations),
            view.viewport(),
            scheme,
            buffer,
            should_continue,
            on_row_done,
        ),
    }
}
