use serde::{Deserialize, Serialize};

use crate::color::ColorScheme;
use crate::complex::Complex;
use crate::fractal::FractalVariant;
use crate::viewport::{validate_point, Viewport};

/// Everything a render depends on.
///
/// A `ViewState` is a plain value: the engine owns one, mutates it through
/// the validating setters below and hands a copy to every render job, so
/// row tasks never observe a half-applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    viewport: Viewport,
    max_iterations: u32,
    variant: FractalVariant,
    julia_c: Complex,
    color_scheme: ColorScheme,
}

impl<'de> Deserialize<'de> for ViewState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            viewport: Viewport,
            #[serde(default = "default_max_iterations")]
            max_iterations: u32,
            #[serde(default)]
            variant: FractalVariant,
            #[serde(default = "default_julia_c")]
            julia_c: Complex,
            #[serde(default)]
            color_scheme: ColorScheme,
        }
        let raw = Raw::deserialize(deserializer)?;
        validate_point(raw.julia_c).map_err(serde::de::Error::custom)?;
        Ok(Self {
            viewport: raw.viewport,
            max_iterations: raw.max_iterations,
            variant: raw.variant,
            julia_c: raw.julia_c,
            color_scheme: raw.color_scheme,
        })
    }
}

fn default_max_iterations() -> u32 {
    ViewState::DEFAULT_MAX_ITERATIONS
}

fn default_julia_c() -> Complex {
    ViewState::DEFAULT_JULIA_C
}

impl ViewState {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 250;
    /// Slider range offered by interactive front-ends. Not enforced.
    pub const MIN_RECOMMENDED_ITERATIONS: u32 = 25;
    pub const MAX_RECOMMENDED_ITERATIONS: u32 = 10_000;
    pub const DEFAULT_JULIA_C: Complex = Complex { re: -0.4, im: 0.6 };

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[inline]
    pub fn variant(&self) -> FractalVariant {
        self.variant
    }

    #[inline]
    pub fn julia_c(&self) -> Complex {
        self.julia_c
    }

    #[inline]
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn set_zoom(&mut self, zoom: f64) -> crate::Result<()> {
        self.viewport.set_zoom(zoom)
    }

    pub fn set_offset(&mut self, offset: Complex) -> crate::Result<()> {
        self.viewport.set_offset(offset)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        self.viewport.pan(dx, dy)
    }

    pub fn zoom_by(&mut self, factor: f64) -> crate::Result<()> {
        self.viewport.zoom_by(factor)
    }

    /// Any `u32` is accepted: `0` makes every pixel "inside".
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
    }

    /// Whether the iteration bound lies in the recommended slider range.
    pub fn has_recommended_iterations(&self) -> bool {
        (Self::MIN_RECOMMENDED_ITERATIONS..=Self::MAX_RECOMMENDED_ITERATIONS)
            .contains(&self.max_iterations)
    }

    pub fn set_variant(&mut self, variant: FractalVariant) {
        self.variant = variant;
    }

    pub fn set_julia_constant(&mut self, c: Complex) -> crate::Result<()> {
        validate_point(c)?;
        self.julia_c = c;
        Ok(())
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
    }

    /// The complex point under pixel `(px, py)`, using the same mapping as
    /// the kernel.
    pub fn pick_julia_constant(&self, px: f64, py: f64, width: u32, height: u32) -> Complex {
        self.viewport.to_complex(px, py, width, height)
    }

    /// Clicking a Mandelbrot view opens the Julia set for the clicked point.
    ///
    /// Returns `false` (and changes nothing) when already showing a Julia set.
    pub fn select_julia_point(
        &mut self,
        px: f64,
        py: f64,
        width: u32,
        height: u32,
    ) -> crate::Result<bool> {
        if self.variant != FractalVariant::Mandelbrot {
            return Ok(false);
        }
        self.set_julia_constant(self.pick_julia_constant(px, py, width, height))?;
        self.variant = FractalVariant::Julia;
        Ok(true)
    }

    /// Back to the initial zoom, offset and iteration bound.
    ///
    /// Variant, Julia constant and color scheme are left as they are.
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::default();
        self.max_iterations = Self::DEFAULT_MAX_ITERATIONS;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            variant: FractalVariant::Mandelbrot,
            julia_c: Self::DEFAULT_JULIA_C,
            color_scheme: ColorScheme::Red,
        }
    }
}
