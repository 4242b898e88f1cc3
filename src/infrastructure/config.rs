use crate::domain::{
    config::{DeviceConfig, GlobalConfig, LensConfig},
    error::{LensError, LensResult},
};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "lensctl";
const PROJECT_DIR: &str = ".lensctl";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Load configuration from files
    ///
    /// The global file provides the `[global]` table; devices from the
    /// global and project files are merged, project entries replacing
    /// global ones of the same name.
    pub fn load_config(&self) -> LensResult<LensConfig> {
        let mut config = LensConfig::default();

        if let Some(global_path) = &self.global_config_path {
            if global_path.exists() {
                let global_config = self.load_config_from_path(global_path)?;
                config.global = global_config.global;
                config.devices = global_config.devices;
            }
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project_config = self.load_config_from_path(project_path)?;
                if project_config.global.default_device.is_some() {
                    config.global.default_device = project_config.global.default_device;
                }
                for device in project_config.devices {
                    config.devices.retain(|existing| existing.name != device.name);
                    config.devices.push(device);
                }
            }
        }

        Ok(config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> LensResult<LensConfig> {
        let content = fs::read_to_string(path).map_err(|e| LensError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| LensError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &LensConfig) -> LensResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| LensError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| LensError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration
    pub fn init_project_config(&self, path: &Path) -> LensResult<PathBuf> {
        let config_dir = path.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(LensError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| LensError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_DIR, e),
        })?;

        let mut example = DeviceConfig::new("example_lens", "192.168.1.100", 10001);
        example.description = "Lens adapter behind a serial-to-Ethernet bridge".to_string();

        let default_config = LensConfig {
            global: GlobalConfig {
                default_device: Some(example.name.clone()),
                ..GlobalConfig::default()
            },
            devices: vec![example],
        };

        self.save_config_to_path(&config_file, &default_config)?;

        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> Option<&PathBuf> {
        self.global_config_path.as_ref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
