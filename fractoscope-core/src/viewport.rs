use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Multiplicative zoom applied per wheel notch or `+`/`-` key press.
pub const ZOOM_STEP: f64 = 1.1;

/// Pixels panned per arrow-key press.
pub const PAN_STEP_PX: f64 = 10.0;

/// Affine mapping between pixel space and the complex plane.
///
/// `zoom` is measured in pixels per complex-plane unit and `offset` is the
/// point shown at the centre of the raster. The raster size is not part of
/// the viewport: the same view can be rendered interactively at the panel
/// size and exported at any other resolution.
///
/// Pixel-y grows downward and so does the imaginary part. Anything that
/// turns a pixel into a complex point (the kernel, point picking) must go
/// through [`to_complex`](Self::to_complex) so the two never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    zoom: f64,
    offset: Complex,
}

impl<'de> Deserialize<'de> for Viewport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            zoom: f64,
            offset: Complex,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.zoom, raw.offset).map_err(serde::de::Error::custom)
    }
}

impl Viewport {
    pub const DEFAULT_ZOOM: f64 = 250.0;
    pub const DEFAULT_OFFSET: Complex = Complex { re: -1.0, im: 0.0 };

    pub fn new(zoom: f64, offset: Complex) -> crate::Result<Self> {
        validate_zoom(zoom)?;
        validate_point(offset)?;
        Ok(Self { zoom, offset })
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline]
    pub fn offset(&self) -> Complex {
        self.offset
    }

    pub fn set_zoom(&mut self, zoom: f64) -> crate::Result<()> {
        validate_zoom(zoom)?;
        self.zoom = zoom;
        Ok(())
    }

    pub fn set_offset(&mut self, offset: Complex) -> crate::Result<()> {
        validate_point(offset)?;
        self.offset = offset;
        Ok(())
    }

    /// Map fractional pixel coordinates on a `width × height` raster to a
    /// complex-plane point.
    #[inline]
    pub fn to_complex(&self, x: f64, y: f64, width: u32, height: u32) -> Complex {
        Complex::new(
            (x - width as f64 / 2.0) / self.zoom + self.offset.re,
            (y - height as f64 / 2.0) / self.zoom + self.offset.im,
        )
    }

    /// Integer-pixel form of [`to_complex`](Self::to_complex).
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32, width: u32, height: u32) -> Complex {
        self.to_complex(px as f64, py as f64, width, height)
    }

    /// Drag the view by a pixel delta: content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        let offset = Complex::new(
            self.offset.re - dx / self.zoom,
            self.offset.im - dy / self.zoom,
        );
        self.set_offset(offset)
    }

    /// Multiply the zoom by `factor`. Values above 1 zoom in.
    pub fn zoom_by(&mut self, factor: f64) -> crate::Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(CoreError::InvalidZoomFactor(factor));
        }
        self.set_zoom(self.zoom * factor)
    }

    pub fn zoom_in(&mut self) -> crate::Result<()> {
        self.zoom_by(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> crate::Result<()> {
        self.zoom_by(1.0 / ZOOM_STEP)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
            offset: Self::DEFAULT_OFFSET,
        }
    }
}

fn validate_zoom(zoom: f64) -> crate::Result<()> {
    if zoom <= 0.0 || !zoom.is_finite() {
        return Err(CoreError::InvalidZoom(zoom));
    }
    Ok(())
}

pub(crate) fn validate_point(p: Complex) -> crate::Result<()> {
    if !p.is_finite() {
        return Err(CoreError::NonFiniteCoordinate { re: p.re, im: p.im });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn centre_pixel_maps_to_offset_exactly() {
        let vp = Viewport::new(250.0, Complex::new(-1.0, 0.0)).unwrap();
        assert_eq!(vp.pixel_to_complex(400, 300, 800, 600), Complex::new(-1.0, 0.0));

        let vp = Viewport::new(3.7, Complex::new(0.123, -4.5)).unwrap();
        assert_eq!(vp.to_complex(50.0, 25.0, 100, 50), vp.offset());
    }

    #[test]
    fn corners_follow_pixel_axes() {
        let vp = Viewport::new(1.0, Complex::ZERO).unwrap();

        // Top-left pixel → negative real, negative imaginary.
        let tl = vp.pixel_to_complex(0, 0, 100, 100);
        assert!((tl.re + 50.0).abs() < EPSILON);
        assert!((tl.im + 50.0).abs() < EPSILON);

        let br = vp.pixel_to_complex(99, 99, 100, 100);
        assert!((br.re - 49.0).abs() < EPSILON);
        assert!((br.im - 49.0).abs() < EPSILON);
    }

    #[test]
    fn pan_moves_offset_against_drag() {
        let mut vp = Viewport::new(100.0, Complex::ZERO).unwrap();
        vp.pan(50.0, -20.0).unwrap();
        assert!((vp.offset().re + 0.5).abs() < EPSILON);
        assert!((vp.offset().im - 0.2).abs() < EPSILON);
    }

    #[test]
    fn arrow_key_pan_moves_one_step_of_pixels() {
        let mut vp = Viewport::new(50.0, Complex::ZERO).unwrap();
        vp.pan(PAN_STEP_PX, 0.0).unwrap();
        assert!((vp.offset().re + 0.2).abs() < EPSILON);
        vp.pan(-PAN_STEP_PX, -PAN_STEP_PX).unwrap();
        assert!(vp.offset().re.abs() < EPSILON);
        assert!((vp.offset().im - 0.2).abs() < EPSILON);
    }

    #[test]
    fn zoom_is_multiplicative_and_invertible() {
        let mut vp = Viewport::default();
        vp.zoom_by(3.0).unwrap();
        assert!((vp.zoom() - 750.0).abs() < EPSILON);
        vp.zoom_by(1.0 / 3.0).unwrap();
        assert!((vp.zoom() - 250.0).abs() < 1e-9);

        vp.zoom_in().unwrap();
        vp.zoom_out().unwrap();
        assert!((vp.zoom() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_zoom() {
        assert!(Viewport::new(0.0, Complex::ZERO).is_err());
        assert!(Viewport::new(-1.0, Complex::ZERO).is_err());
        assert!(Viewport::new(f64::NAN, Complex::ZERO).is_err());

        let mut vp = Viewport::default();
        assert_eq!(vp.zoom_by(0.0), Err(CoreError::InvalidZoomFactor(0.0)));
        assert!(vp.zoom_by(f64::INFINITY).is_err());
        assert_eq!(vp.zoom(), Viewport::DEFAULT_ZOOM, "failed zoom must not mutate");
    }

    #[test]
    fn non_finite_offset_rejected() {
        assert!(Viewport::new(1.0, Complex::new(f64::NAN, 0.0)).is_err());
        let mut vp = Viewport::default();
        assert!(vp.set_offset(Complex::new(0.0, f64::INFINITY)).is_err());
        assert_eq!(vp.offset(), Viewport::DEFAULT_OFFSET);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Viewport =
            serde_json::from_str(r#"{"zoom": 10.0, "offset": {"re": 0.5, "im": 0.25}}"#).unwrap();
        assert_eq!(ok.zoom(), 10.0);

        let bad = serde_json::from_str::<Viewport>(r#"{"zoom": 0.0, "offset": {"re": 0, "im": 0}}"#);
        assert!(bad.is_err());
    }
}
