//! PNG export with embedded view metadata (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use fractoscope_core::{FractalVariant, ViewState};
use fractoscope_render::PixelBuffer;

use crate::error::CliError;

const SOFTWARE: &str = "Fractoscope";

/// Write a rendered buffer as an 8-bit RGB PNG, tagged with the view it
/// was rendered from so the image can be reproduced later.
pub fn export_png(buffer: &PixelBuffer, view: &ViewState, path: &Path) -> Result<(), CliError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(CliError::EmptyRaster {
            width: buffer.width,
            height: buffer.height,
        });
    }
    let file = File::create(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), SOFTWARE.to_string())?;
    encoder.add_text_chunk("Description".to_string(), describe(view))?;
    for (key, value) in metadata_pairs(view) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&buffer.to_rgb8())?;
    writer.finish()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

fn describe(view: &ViewState) -> String {
    let vp = view.viewport();
    let mut desc = format!(
        "{} - Center: {}, Zoom: {}, Iterations: {}",
        view.variant().label(),
        vp.offset(),
        vp.zoom(),
        view.max_iterations(),
    );
    if view.variant() == FractalVariant::Julia {
        desc.push_str(&format!(", Julia C: {}", view.julia_c()));
    }
    desc
}

fn metadata_pairs(view: &ViewState) -> Vec<(String, String)> {
    let vp = view.viewport();
    let mut pairs = vec![
        ("Fractoscope.Variant".into(), view.variant().label().into()),
        ("Fractoscope.OffsetRe".into(), vp.offset().re.to_string()),
        ("Fractoscope.OffsetIm".into(), vp.offset().im.to_string()),
        ("Fractoscope.Zoom".into(), vp.zoom().to_string()),
        ("Fractoscope.MaxIterations".into(), view.max_iterations().to_string()),
        ("Fractoscope.ColorScheme".into(), view.color_scheme().label().into()),
    ];
    if view.variant() == FractalVariant::Julia {
        pairs.push(("Fractoscope.JuliaRe".into(), view.julia_c().re.to_string()));
        pairs.push(("Fractoscope.JuliaIm".into(), view.julia_c().im.to_string()));
    }
    pairs
}
