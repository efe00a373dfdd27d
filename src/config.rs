use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/glassmesh.toml";
const ATLAS_META_ENV: &str = "GLASSMESH_ATLAS_META";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GlassMeshConfig {
    /// Atlas metadata JSON. A generated debug atlas is used when unset.
    pub atlas_metadata: Option<PathBuf>,
    /// Glass type definitions JSON. The built-in families are used when unset.
    pub glass_types: Option<PathBuf>,
    pub worker_threads: usize,
    /// Pseudo-random connectivity payloads requested per variant.
    pub signatures_per_variant: usize,
    pub seed: u64,
    pub metrics_output: Option<PathBuf>,
}

impl Default for GlassMeshConfig {
    fn default() -> Self {
        Self {
            atlas_metadata: None,
            glass_types: None,
            worker_threads: 4,
            signatures_per_variant: 8,
            seed: 0,
            metrics_output: None,
        }
    }
}

impl GlassMeshConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    ///
    /// `GLASSMESH_ATLAS_META` overrides the atlas path either way.
    pub fn load_from_path(path: &Path) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GlassMeshConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    GlassMeshConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Bake config not found at {}. Using defaults",
                        path.display()
                    );
                }
                GlassMeshConfig::default()
            }
        };
        if let Some(atlas) = env::var_os(ATLAS_META_ENV) {
            config.atlas_metadata = Some(PathBuf::from(atlas));
        }
        config
    }
}
