use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, MotorAction};
use crate::cli::output::{ConfigSources, ConsoleWriter, OutputWriter};
use crate::core::device::Lens;
use crate::domain::config::{DeviceConfig, LensConfig};
use crate::domain::error::{LensError, LensResult};
use crate::infrastructure::{config::ConfigManager, logging::init_logging};
use std::path::PathBuf;

/// Port the adapter's serial bridge listens on out of the box
const DEFAULT_PORT: u16 = 10001;

/// Execute CLI command
pub async fn execute_command(args: Args) -> Result<(), LensError> {
    let Args {
        verbose,
        quiet,
        config: config_path,
        device,
        host,
        port,
        no_init,
        output,
        command,
    } = args;

    let writer = ConsoleWriter::new(output);

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new();
    let config = if let Some(path) = &config_path {
        config_manager.load_config_from_path(path.as_ref())?
    } else {
        config_manager.load_config()?
    };

    if !quiet {
        init_logging(&config.global.log_level, verbose)?;
    }

    match command {
        Command::Config(config_args) => {
            let sources = ConfigSources {
                explicit: config_path.map(PathBuf::from),
                global: config_manager.get_global_config_path_ref().cloned(),
                project: config_manager.get_project_config_path().cloned(),
            };
            return execute_config_command(config_args, &writer, &config, &sources, &config_manager);
        }
        Command::About => {
            writer.write_message(&format!("lensctl {}", env!("CARGO_PKG_VERSION")))?;
            return Ok(());
        }
        _ => {}
    }

    let mut device = resolve_device(&config, device.as_deref(), host, port)?;
    if no_init {
        device.initialize = false;
    }

    let mut lens = Lens::connect(&device).await;
    let result = execute_lens_command(command, &mut lens, &writer).await;
    lens.close().await;
    result
}

/// Pick the device to talk to from configuration and command-line overrides
pub fn resolve_device(
    config: &LensConfig,
    name: Option<&str>,
    host: Option<String>,
    port: Option<u16>,
) -> LensResult<DeviceConfig> {
    let configured = match name {
        Some(name) => Some(
            config
                .device(name)
                .cloned()
                .ok_or_else(|| LensError::InvalidInput(format!("Unknown device '{}'", name)))?,
        ),
        None => config.default_device().cloned(),
    };

    let mut device = match (configured, host) {
        (Some(mut device), host) => {
            if let Some(host) = host {
                device.host = host;
            }
            device
        }
        (None, Some(host)) => DeviceConfig::new("command-line", host, DEFAULT_PORT),
        (None, None) => {
            return Err(LensError::InvalidInput(
                "No device selected: use --device, --host or set global.default_device".to_string(),
            ))
        }
    };

    if let Some(port) = port {
        device.port = port;
    }

    Ok(device)
}

async fn execute_lens_command(
    command: Command,
    lens: &mut Lens,
    writer: &ConsoleWriter,
) -> Result<(), LensError> {
    match command {
        Command::Focus(motor) => {
            let (request, value) = match motor.action {
                MotorAction::Get => ("focus", lens.get_focus().await?),
                MotorAction::Set { value } => ("set focus", lens.set_focus(value).await?),
            };
            writer.write_value(request, &value)?;
        }
        Command::Aperture(motor) => {
            let (request, value) = match motor.action {
                MotorAction::Get => ("aperture", lens.get_aperture().await?),
                MotorAction::Set { value } => ("set aperture", lens.set_aperture(value).await?),
            };
            writer.write_value(request, &value)?;
        }
        Command::Serial => {
            writer.write_value("serial number", &lens.serial_number().await?)?;
        }
        Command::Version => {
            writer.write_value("version", &lens.version().await?)?;
        }
        Command::LensInfo => {
            writer.write_value("lens info", &lens.lens_info().await?)?;
        }
        Command::LensPresent => {
            writer.write_value("lens present", &lens.lens_present().await?)?;
        }
        Command::Info => {
            writer.write_report(&lens.report().await)?;
        }
        Command::Raw { request } => {
            let value = lens.raw(&request).await?;
            writer.write_value(&request, &value)?;
        }
        Command::Config(_) | Command::About => {
            return Err(LensError::InvalidInput(
                "command does not use a lens connection".to_string(),
            ));
        }
    }
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &LensConfig,
    sources: &ConfigSources,
    config_manager: &ConfigManager,
) -> Result<(), LensError> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config, sources)?;
        }
        ConfigCommand::Init { path } => {
            let base = match path {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            let created = config_manager.init_project_config(&base)?;
            writer.write_message(&format!("Created {}", created.display()))?;
        }
        ConfigCommand::Devices => {
            if config.devices.is_empty() {
                writer.write_message("No devices configured")?;
            } else {
                writer.write_devices(&config.devices)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_devices() -> LensConfig {
        let mut config = LensConfig::default();
        config.devices.push(DeviceConfig::new("bench", "10.0.0.2", 10001));
        config.devices.push(DeviceConfig::new("rig", "10.0.0.3", 4001));
        config.global.default_device = Some("rig".to_string());
        config
    }

    #[test]
    fn test_resolve_named_device() {
        let device = resolve_device(&config_with_devices(), Some("bench"), None, None).unwrap();
        assert_eq!(device.host, "10.0.0.2");
    }

    #[test]
    fn test_resolve_default_device_with_overrides() {
        let device = resolve_device(
            &config_with_devices(),
            None,
            Some("192.168.7.7".to_string()),
            Some(23),
        )
        .unwrap();
        assert_eq!(device.name, "rig");
        assert_eq!(device.host, "192.168.7.7");
        assert_eq!(device.port, 23);
    }

    #[test]
    fn test_resolve_host_only() {
        let device = resolve_device(&LensConfig::default(), None, Some("lens.local".to_string()), None).unwrap();
        assert_eq!(device.endpoint().to_string(), "lens.local:10001");
        assert!(device.initialize);
    }

    #[test]
    fn test_resolve_errors() {
        assert!(matches!(
            resolve_device(&LensConfig::default(), None, None, None),
            Err(LensError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_device(&config_with_devices(), Some("missing"), None, None),
            Err(LensError::InvalidInput(_))
        ));
    }
}
