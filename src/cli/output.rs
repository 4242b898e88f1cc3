use crate::cli::args::OutputFormat;
use crate::core::device::LensReport;
use crate::domain::config::{DeviceConfig, LensConfig};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_value(&self, name: &str, value: &str) -> Result<(), OutputError>;
    fn write_report(&self, report: &LensReport) -> Result<(), OutputError>;
    fn write_config(&self, config: &LensConfig, sources: &ConfigSources) -> Result<(), OutputError>;
    fn write_devices(&self, devices: &[DeviceConfig]) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::LensError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Files the effective configuration was read from
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// `--config` path; when set the other files are not consulted
    pub explicit: Option<PathBuf>,
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigSources {
    fn lines(&self) -> Vec<String> {
        match &self.explicit {
            Some(path) => vec![format!("  Config file: {}", describe_path(Some(path)))],
            None => vec![
                format!("  Global file: {}", describe_path(self.global.as_deref())),
                format!("  Project file: {}", describe_path(self.project.as_deref())),
            ],
        }
    }
}

fn describe_path(path: Option<&Path>) -> String {
    match path {
        None => "-".to_string(),
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not found)", path.display()),
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render_value(&self, name: &str, value: &str) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => value.to_string(),
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "request": name,
                "value": value,
            }))?,
            OutputFormat::Table => Table::new([FieldRow::new(name, value)]).to_string(),
        })
    }

    pub fn render_report(&self, report: &LensReport) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => report
                .fields()
                .into_iter()
                .map(|(label, value)| format!("{:<14}{}", format!("{}:", label), value))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
            OutputFormat::Table => {
                let rows: Vec<FieldRow> = report
                    .fields()
                    .into_iter()
                    .map(|(label, value)| FieldRow::new(label, &value))
                    .collect();
                Table::new(rows).to_string()
            }
        })
    }

    pub fn render_config(&self, config: &LensConfig, sources: &ConfigSources) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => {
                let mut lines = vec!["LensCtl Configuration:".to_string()];
                lines.extend(sources.lines());
                lines.extend([
                    format!("  Log level: {}", config.global.log_level),
                    format!(
                        "  Default device: {}",
                        config.global.default_device.as_deref().unwrap_or("-")
                    ),
                ]);
                if !config.devices.is_empty() {
                    lines.push("  Devices:".to_string());
                    for device in &config.devices {
                        lines.push(format!("    {}: {}:{}", device.name, device.host, device.port));
                    }
                }
                lines.join("\n")
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(config)?;
                if let Some(map) = value.as_object_mut() {
                    map.insert("sources".to_string(), serde_json::to_value(sources)?);
                }
                serde_json::to_string_pretty(&value)?
            }
            OutputFormat::Table => {
                let mut lines = sources.lines();
                lines.push(self.render_devices(&config.devices)?);
                lines.join("\n")
            }
        })
    }

    pub fn render_devices(&self, devices: &[DeviceConfig]) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => devices
                .iter()
                .map(|device| {
                    let desc = if device.description.is_empty() { "No description" } else { &device.description };
                    format!(
                        "Device: {}\n  Description: {}\n  Address: {}:{}\n  Startup init: {}",
                        device.name, desc, device.host, device.port, device.initialize
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
            OutputFormat::Json => serde_json::to_string_pretty(devices)?,
            OutputFormat::Table => {
                let rows: Vec<DeviceTableRow> = devices.iter().map(DeviceTableRow::from).collect();
                Table::new(rows).to_string()
            }
        })
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_value(&self, name: &str, value: &str) -> Result<(), OutputError> {
        println!("{}", self.render_value(name, value)?);
        Ok(())
    }

    fn write_report(&self, report: &LensReport) -> Result<(), OutputError> {
        println!("{}", self.render_report(report)?);
        Ok(())
    }

    fn write_config(&self, config: &LensConfig, sources: &ConfigSources) -> Result<(), OutputError> {
        println!("{}", self.render_config(config, sources)?);
        Ok(())
    }

    fn write_devices(&self, devices: &[DeviceConfig]) -> Result<(), OutputError> {
        println!("{}", self.render_devices(devices)?);
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "message": message }));
            }
            _ => println!("{}", message),
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "error": error }));
            }
            _ => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Tabled)]
struct DeviceTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&DeviceConfig> for DeviceTableRow {
    fn from(device: &DeviceConfig) -> Self {
        Self {
            name: device.name.clone(),
            host: device.host.clone(),
            port: device.port,
            description: device.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::Reading;
    use crate::core::session::SessionStatus;

    fn sample_report() -> LensReport {
        LensReport {
            endpoint: "10.0.0.2:10001".to_string(),
            session_id: "abc".to_string(),
            status: SessionStatus::Ready,
            serial_number: Reading::value("10234".to_string()),
            version: Reading::value("10.0".to_string()),
            lens_present: Reading::value("1".to_string()),
            lens_info: Reading::failed("Communication timeout after 2s".to_string()),
            focus: Reading::value("1503".to_string()),
            aperture: Reading::value("12".to_string()),
        }
    }

    #[test]
    fn test_text_value_is_bare() {
        let writer = ConsoleWriter::new(OutputFormat::Text);
        assert_eq!(writer.render_value("pf", "1503").unwrap(), "1503");
    }

    #[test]
    fn test_json_value() {
        let writer = ConsoleWriter::new(OutputFormat::Json);
        let rendered = writer.render_value("pf", "1503").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["request"], "pf");
        assert_eq!(parsed["value"], "1503");
    }

    #[test]
    fn test_report_formats() {
        let report = sample_report();

        let text = ConsoleWriter::new(OutputFormat::Text).render_report(&report).unwrap();
        assert!(text.contains("Focus:"));
        assert!(text.contains("<Communication timeout after 2s>"));

        let json = ConsoleWriter::new(OutputFormat::Json).render_report(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["focus"]["value"], "1503");
        assert_eq!(parsed["status"], "Ready");
        assert!(parsed["lens_info"].get("value").is_none());

        let table = ConsoleWriter::new(OutputFormat::Table).render_report(&report).unwrap();
        assert!(table.contains("Serial number"));
        assert!(table.contains("10234"));
    }

    #[test]
    fn test_config_lists_sources() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let global = temp_dir.path().join("config.toml");
        std::fs::write(&global, "").unwrap();
        let sources = ConfigSources {
            explicit: None,
            global: Some(global.clone()),
            project: Some(temp_dir.path().join("missing.toml")),
        };
        let config = LensConfig::default();

        let text = ConsoleWriter::new(OutputFormat::Text).render_config(&config, &sources).unwrap();
        assert!(text.contains(&format!("Global file: {}\n", global.display())));
        assert!(text.contains("missing.toml (not found)"));

        let json = ConsoleWriter::new(OutputFormat::Json).render_config(&config, &sources).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["sources"]["global"], global.display().to_string());
        assert!(parsed["sources"]["explicit"].is_null());
        assert_eq!(parsed["global"]["log_level"], "info");
    }

    #[test]
    fn test_explicit_config_hides_search_paths() {
        let sources = ConfigSources {
            explicit: Some(PathBuf::from("/nonexistent/lens.toml")),
            global: Some(PathBuf::from("/nonexistent/global.toml")),
            project: None,
        };
        let text = ConsoleWriter::new(OutputFormat::Text)
            .render_config(&LensConfig::default(), &sources)
            .unwrap();
        assert!(text.contains("Config file: /nonexistent/lens.toml (not found)"));
        assert!(!text.contains("Global file"));
    }

    #[test]
    fn test_device_table() {
        let devices = vec![DeviceConfig::new("bench", "10.0.0.2", 10001)];
        let table = ConsoleWriter::new(OutputFormat::Table).render_devices(&devices).unwrap();
        assert!(table.contains("bench"));
        assert!(table.contains("10001"));
    }
}
