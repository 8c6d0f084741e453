use fractoscope_core::{
    shade, Complex, Fractal, FractalVariant, Julia, Mandelbrot, ViewState, Viewport,
};

/// Iterate every pixel of a `width × height` raster into a flat Vec.
fn render_grid<F: Fractal>(fractal: &F, viewport: &Viewport, width: u32, height: u32) -> Vec<u32> {
    let mut counts = Vec::with_capacity((width * height) as usize);
    for py in 0..height {
        for px in 0..width {
            counts.push(fractal.iterate(viewport.pixel_to_complex(px, py, width, height)));
        }
    }
    counts
}

#[test]
fn headless_mandelbrot_render() {
    let view = ViewState::default();
    let mandelbrot = Mandelbrot::new(view.max_iterations());
    let counts = render_grid(&mandelbrot, view.viewport(), 100, 100);

    assert_eq!(counts.len(), 100 * 100);
    assert!(counts.iter().all(|&n| n <= 250));

    let interior = counts.iter().filter(|&&n| n == 250).count();
    assert!(interior > 0, "should have some interior points");
    assert!(interior < counts.len(), "should have some escaped points");

    // Centre pixel maps to c = -1, the centre of the period-2 bulb.
    let centre = counts[50 * 100 + 50];
    assert_eq!(centre, 250);
    assert_eq!(shade(centre, 250, view.color_scheme()), 0);
}

#[test]
fn headless_julia_render() {
    let mut view = ViewState::default();
    view.set_variant(FractalVariant::Julia);
    view.set_offset(Complex::ZERO).unwrap();
    view.set_zoom(25.0).unwrap();

    let julia = Julia::new(view.julia_c(), view.max_iterations());
    let counts = render_grid(&julia, view.viewport(), 100, 100);

    // Pixel (50, 50) is the plane origin.
    assert_eq!(counts[50 * 100 + 50], 26);
    assert!(counts.iter().any(|&n| n == 0), "corners lie outside the radius");
}

#[test]
fn zero_bound_renders_all_black() {
    let mut view = ViewState::default();
    view.set_max_iterations(0);
    let mandelbrot = Mandelbrot::new(0);
    let counts = render_grid(&mandelbrot, view.viewport(), 32, 32);
    assert!(counts
        .iter()
        .all(|&n| n == 0 && shade(n, 0, view.color_scheme()) == 0));
}
