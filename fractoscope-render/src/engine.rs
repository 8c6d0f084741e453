use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use fractoscope_core::{ColorScheme, Complex, FractalVariant, ViewState};

use crate::buffer::PixelBuffer;
use crate::error::RenderError;
use crate::renderer::{panic_message, render_view, ProgressReporter, RenderControl};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What to do when a render is requested while another is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPolicy {
    /// Cancel the running render and start the new one.
    #[default]
    Supersede,
    /// Ignore the new request until the running render finishes.
    DropWhileBusy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker threads; `0` means one per available hardware thread.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub policy: RenderPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Rendering,
}

impl RenderPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Rendering => "Rendering\u{2026}",
        }
    }
}

/// Receiver for the implicit re-renders triggered by view mutations.
pub trait RenderListener: Send + Sync {
    fn on_progress(&self, _percent: u8) {}

    fn on_complete(&self, buffer: PixelBuffer);
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the view state and a long-lived worker pool, and turns render
/// requests into pixel buffers.
///
/// Every render works on a copy of the view taken when it was requested.
/// Mutating setters re-render to the attached [`RenderListener`] at the
/// size last given to [`resize`](Self::resize).
pub struct Engine {
    view: ViewState,
    pool: Option<ThreadPool>,
    threads: usize,
    control: Arc<RenderControl>,
    policy: RenderPolicy,
    listener: Option<Arc<dyn RenderListener>>,
    size: Option<(u32, u32)>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        let threads = if config.threads == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            config.threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fractoscope-worker-{i}"))
            .panic_handler(|payload| {
                error!(reason = panic_message(&*payload), "Render job panicked");
            })
            .build()?;
        info!(threads, policy = ?config.policy, "Render engine started");

        Ok(Self {
            view: ViewState::default(),
            pool: Some(pool),
            threads,
            control: Arc::new(RenderControl::new()),
            policy: config.policy,
            listener: None,
            size: None,
        })
    }

    /// Start from an existing view instead of the default one.
    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn policy(&self) -> RenderPolicy {
        self.policy
    }

    pub fn phase(&self) -> RenderPhase {
        if self.control.in_flight() > 0 {
            RenderPhase::Rendering
        } else {
            RenderPhase::Idle
        }
    }

    /// Rows finished out of rows requested for the latest async render.
    pub fn progress(&self) -> (usize, usize) {
        self.control.progress()
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_none()
    }

    pub fn attach(&mut self, listener: Arc<dyn RenderListener>) {
        self.listener = Some(listener);
    }

    pub fn detach(&mut self) {
        self.listener = None;
    }

    // -- View mutations ----------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        self.ensure_running()?;
        self.size = Some((width, height));
        self.request_render().map(|_| ())
    }

    pub fn set_fractal_variant(&mut self, variant: FractalVariant) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.set_variant(variant);
        self.request_render().map(|_| ())
    }

    /// A Mandelbrot view does not depend on the constant, so it is only
    /// re-rendered while showing a Julia set.
    pub fn set_julia_constant(&mut self, re: f64, im: f64) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.set_julia_constant(Complex::new(re, im))?;
        if self.view.variant() == FractalVariant::Julia {
            self.request_render()?;
        }
        Ok(())
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.set_color_scheme(scheme);
        self.request_render().map(|_| ())
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.set_max_iterations(max_iterations);
        self.request_render().map(|_| ())
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.pan(dx, dy)?;
        self.request_render().map(|_| ())
    }

    pub fn zoom(&mut self, factor: f64) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.zoom_by(factor)?;
        self.request_render().map(|_| ())
    }

    pub fn reset_view(&mut self) -> crate::Result<()> {
        self.ensure_running()?;
        self.view.reset_view();
        self.request_render().map(|_| ())
    }

    /// Switch a Mandelbrot view to the Julia set of the point under
    /// `(px, py)` on a `width × height` panel. Returns whether it switched.
    pub fn select_julia_point(
        &mut self,
        px: f64,
        py: f64,
        width: u32,
        height: u32,
    ) -> crate::Result<bool> {
        self.ensure_running()?;
        let switched = self.view.select_julia_point(px, py, width, height)?;
        if switched {
            debug!(c = %self.view.julia_c(), "Selected Julia constant");
            self.request_render()?;
        }
        Ok(switched)
    }

    // -- Rendering ---------------------------------------------------------

    /// Re-render to the attached listener at the last known size.
    ///
    /// Returns `Ok(None)` when there is no listener or size yet, or when the
    /// request was not started (see [`render_async`](Self::render_async)).
    pub fn request_render(&self) -> crate::Result<Option<u64>> {
        let (Some(listener), Some((width, height))) = (&self.listener, self.size) else {
            return Ok(None);
        };
        let progress_listener = Arc::clone(listener);
        let complete_listener = Arc::clone(listener);
        self.render_async(
            width,
            height,
            move |percent| progress_listener.on_progress(percent),
            move |buffer| complete_listener.on_complete(buffer),
        )
    }

    /// Render the current view in the background.
    ///
    /// `on_progress` receives strictly increasing percentages ending at 100;
    /// `on_complete` receives the finished buffer. Both run on a worker
    /// thread. A render that is superseded or cancelled by shutdown calls
    /// neither of them again and its buffer is dropped.
    ///
    /// The next render request waits while either callback is running, so
    /// the callbacks must not request a render themselves.
    ///
    /// Returns the job's generation, or `None` when nothing was started:
    /// a zero dimension, or a busy engine under
    /// [`RenderPolicy::DropWhileBusy`].
    pub fn render_async<P, C>(
        &self,
        width: u32,
        height: u32,
        on_progress: P,
        on_complete: C,
    ) -> crate::Result<Option<u64>>
    where
        P: FnMut(u8) + Send + 'static,
        C: FnOnce(PixelBuffer) + Send + 'static,
    {
        let pool = self.pool.as_ref().ok_or(RenderError::ShutDown)?;
        if width == 0 || height == 0 {
            debug!(width, height, "Ignoring render request for an empty raster");
            return Ok(None);
        }

        let guard = match self.policy {
            RenderPolicy::Supersede => self.control.begin(),
            RenderPolicy::DropWhileBusy => match self.control.try_begin_exclusive() {
                Some(guard) => guard,
                None => {
                    debug!("Render already in flight; dropping request");
                    return Ok(None);
                }
            },
        };
        let generation = self.control.start(height as usize);

        let view = self.view;
        let control = Arc::clone(&self.control);
        debug!(
            generation,
            width,
            height,
            max_iter = view.max_iterations(),
            zoom = view.viewport().zoom(),
            variant = view.variant().label(),
            "Requesting render"
        );

        pool.spawn(move || {
            let start = Instant::now();
            let reporter = ProgressReporter::new(height as usize, on_progress);
            let mut buffer = PixelBuffer::new(width, height);

            let stats = render_view(
                &view,
                &mut buffer,
                || control.is_current(generation),
                || {
                    control.publish_if_current(generation, || {
                        control.inc_progress();
                        reporter.row_done();
                    });
                },
            );

            let delivered = control.publish_if_current(generation, || {
                reporter.finish();
                info!(
                    generation,
                    elapsed_ms = start.elapsed().as_millis(),
                    rows_rendered = stats.rows_rendered,
                    rows_failed = stats.rows_failed,
                    "Render complete"
                );
                drop(guard);
                on_complete(buffer);
            });
            if delivered.is_none() {
                debug!(
                    generation,
                    rows_rendered = stats.rows_rendered,
                    rows_skipped = stats.rows_skipped,
                    "Render superseded; buffer discarded"
                );
            }
        });

        Ok(Some(generation))
    }

    /// Render the current view at an arbitrary size, blocking until done.
    ///
    /// Runs on the same pool as interactive renders but is never superseded
    /// by them. Returns `None` for a zero dimension.
    pub fn render_sync(&self, width: u32, height: u32) -> crate::Result<Option<PixelBuffer>> {
        let pool = self.pool.as_ref().ok_or(RenderError::ShutDown)?;
        if width == 0 || height == 0 {
            debug!(width, height, "Ignoring render request for an empty raster");
            return Ok(None);
        }

        let view = self.view;
        let start = Instant::now();
        let (buffer, stats) = pool.install(|| {
            let mut buffer = PixelBuffer::new(width, height);
            let stats = render_view(&view, &mut buffer, || true, || {});
            (buffer, stats)
        });
        info!(
            width,
            height,
            elapsed_ms = start.elapsed().as_millis(),
            rows_failed = stats.rows_failed,
            "Blocking render complete"
        );
        Ok(Some(buffer))
    }

    /// Cancel in-flight work and release the worker pool. Idempotent.
    ///
    /// Rows already running finish; everything else is abandoned and no
    /// completion callback fires. Later render calls fail with
    /// [`RenderError::ShutDown`].
    pub fn shutdown(&mut self) {
        if let Some(pool) = self.pool.take() {
            self.control.advance();
            drop(pool);
            info!("Render engine shut down");
        }
    }

    fn ensure_running(&self) -> crate::Result<()> {
        if self.pool.is_none() {
            return Err(RenderError::ShutDown);
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
