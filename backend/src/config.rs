use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub gradcam: GradCamConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Largest width or height, in pixels, an upload may decode to.
    pub max_image_side: u32,
    pub frontend_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub input_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradCamConfig {
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            gradcam: GradCamConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            max_upload_bytes: 10 * 1024 * 1024,
            max_image_side: 4096,
            frontend_dir: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/final_lung_disease_model.pt".to_string(),
            input_size: 224,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            threshold: 0.5,
        }
    }
}

impl Default for GradCamConfig {
    fn default() -> Self {
        Self { alpha: 0.4 }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl AppConfig {
    /// Loads the YAML config, then applies environment overrides.
    ///
    /// The file location comes from `RESPIRASCAN_CONFIG`, falling back to
    /// `config/respirascan.yaml` at the workspace root. A missing file is not an
    /// error: the built-in defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(&path)?
        } else {
            log::warn!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(config_str)?;
        Ok(config)
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RESPIRASCAN_CONFIG") {
            return PathBuf::from(path);
        }
        match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(manifest_dir) => PathBuf::from(format!(
                "{}/../config/respirascan.yaml",
                manifest_dir
            )),
            Err(_) => PathBuf::from("config/respirascan.yaml"),
        }
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = path;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = Some(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if self.model.path.trim().is_empty() {
            return Err(invalid("model.path", "must not be empty"));
        }
        if self.model.input_size == 0 {
            return Err(invalid("model.input_size", "must be positive"));
        }
        if self.model.std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(invalid("model.std", "every channel must be positive"));
        }
        if !(self.model.threshold > 0.0 && self.model.threshold < 1.0) {
            return Err(invalid("model.threshold", "must lie strictly between 0 and 1"));
        }
        if !(0.0..=1.0).contains(&self.gradcam.alpha) {
            return Err(invalid("gradcam.alpha", "must lie within [0, 1]"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(invalid("server.max_upload_bytes", "must be positive"));
        }
        if self.server.max_image_side == 0 {
            return Err(invalid("server.max_image_side", "must be positive"));
        }
        Ok(())
    }

    /// Directory holding the built frontend bundle, when one is available.
    pub fn frontend_dir(&self) -> Option<String> {
        if let Some(dir) = &self.server.frontend_dir {
            return Some(dir.clone());
        }
        let default_dir = match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(manifest_dir) => format!("{}/../frontend/dist", manifest_dir),
            Err(_) => "/usr/src/app/frontend/dist".to_string(),
        };
        Path::new(&default_dir).is_dir().then_some(default_dir)
    }
}
