//! Settings file for headless exports.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fractoscope_core::{Complex, ViewState};
use fractoscope_render::EngineConfig;

use crate::error::CliError;

/// Contents of a `--config` JSON file. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub view: ViewState,
    #[serde(default)]
    pub engine: EngineConfig,
}

pub fn load(path: &Path) -> Result<Settings, CliError> {
    let file = File::open(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), ?settings, "Loaded settings");
    Ok(settings)
}

/// Parse `"re,im"` into a complex number.
pub fn parse_complex(s: &str) -> Result<Complex, String> {
    let (re, im) = s
        .split_once(',')
        .ok_or_else(|| format!("expected RE,IM but got {s:?}"))?;
    let re: f64 = re.trim().parse().map_err(|e| format!("bad real part {re:?}: {e}"))?;
    let im: f64 = im.trim().parse().map_err(|e| format!("bad imaginary part {im:?}: {e}"))?;
    Ok(Complex::new(re, im))
}
