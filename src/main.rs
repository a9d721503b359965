//! Photobooth CLI
//!
//! Starts the live preview and waits for button presses. Exits 0 after a
//! quit request, non-zero if startup fails.

use clap::Parser;
use photobooth::{
    booth::{BoothError, BoothHandle, Photobooth},
    capture::CameraBackend,
    config::{ConfigError, FileConfig, SignalConfig},
    display::DisplayBackend,
    metrics::MetricsRegistry,
    signal,
    storage::PngStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Camera preview with button-triggered captures.
#[derive(Debug, Parser)]
#[command(name = "photobooth", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index of the camera to use from the detected list.
    #[arg(long)]
    camera_index: Option<u32>,

    /// Directory to save captures into.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Print the detected cameras and exit.
    #[arg(long)]
    list_cameras: bool,

    /// Also accept `c`/`q` commands on stdin.
    #[arg(long)]
    console: bool,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Photobooth v{}", photobooth::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut cameras = camera_backend();
    if args.list_cameras {
        return list_cameras(&mut cameras);
    }

    let result = run(&config, args.console, &mut cameras, &mut display_backend());
    ExitCode::from(exit_status(result))
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

/// Maps the outcome of [`run`] to the process status.
fn exit_status(result: Result<(), BoothError>) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("Startup failed: {}", e);
            EXIT_FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<FileConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    if let Some(index) = args.camera_index {
        config.capture.device_index = index;
    }
    if let Some(dir) = &args.save_dir {
        config.storage.save_directory = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn list_cameras<B: CameraBackend>(cameras: &mut B) -> ExitCode {
    match cameras.list_devices() {
        Ok(devices) if devices.is_empty() => {
            println!("No cameras detected.");
            ExitCode::FAILURE
        }
        Ok(devices) => {
            for device in devices {
                println!("{:<5} {}", device.index, device.name);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to enumerate cameras: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<CB, DB>(
    config: &FileConfig,
    console: bool,
    cameras: &mut CB,
    displays: &mut DB,
) -> Result<(), BoothError>
where
    CB: CameraBackend,
    DB: DisplayBackend,
{
    let mut booth = Photobooth::initialize(
        &config.capture,
        &config.storage,
        cameras,
        displays,
        PngStore::new(),
    )?;

    match MetricsRegistry::new() {
        Ok(registry) => {
            let registry = Arc::new(registry);
            serve_metrics(config.metrics.port, &registry);
            booth = booth.with_metrics(registry);
        }
        Err(e) => warn!("Metrics disabled: {}", e),
    }

    let handle = booth.handle();
    let _buttons = match install_buttons(&config.signals, &handle) {
        Ok(buttons) => buttons,
        Err(e) => {
            booth.shutdown();
            return Err(e);
        }
    };

    if let Err(e) = signal::install_interrupt_handler(handle.clone()) {
        warn!("Ctrl-C will not shut down cleanly: {}", e);
    }
    if console || !cfg!(feature = "gpio") {
        match signal::spawn_console_trigger(handle) {
            Ok(_) => info!("Console trigger enabled: 'c' captures, 'q' quits"),
            Err(e) => warn!("Console trigger unavailable: {}", e),
        }
    }

    let stats = booth.run();

    info!(
        "Saved {} captures ({} failed) over {} preview ticks",
        stats.captures_saved, stats.capture_failures, stats.ticks
    );
    Ok(())
}

#[cfg(feature = "camera")]
fn camera_backend() -> photobooth::capture::NokhwaBackend {
    photobooth::capture::NokhwaBackend::new()
}

#[cfg(not(feature = "camera"))]
fn camera_backend() -> photobooth::capture::MockBackend {
    warn!("Built without camera support; using synthetic frames");
    photobooth::capture::MockBackend::new()
}

#[cfg(feature = "display")]
fn display_backend() -> photobooth::display::MinifbBackend {
    photobooth::display::MinifbBackend::new()
}

#[cfg(not(feature = "display"))]
fn display_backend() -> photobooth::display::HeadlessBackend {
    warn!("Built without display support; preview is not shown");
    photobooth::display::HeadlessBackend::new()
}

#[cfg(feature = "gpio")]
fn install_buttons(
    config: &SignalConfig,
    handle: &BoothHandle,
) -> Result<signal::InputSignals<signal::RppalGpio>, BoothError> {
    let gpio = signal::RppalGpio::new()?;
    Ok(signal::InputSignals::install(gpio, config.bindings(), handle)?)
}

#[cfg(not(feature = "gpio"))]
fn install_buttons(config: &SignalConfig, _handle: &BoothHandle) -> Result<(), BoothError> {
    warn!(
        capture_pin = config.capture_pin,
        quit_pin = config.quit_pin,
        "Built without GPIO support; buttons are not wired"
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn serve_metrics(port: u16, registry: &Arc<MetricsRegistry>) {
    use photobooth::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return;
    }
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), Arc::clone(registry));
    if let Err(e) = server.spawn() {
        warn!("Metrics server not started: {}", e);
    }
}

#[cfg(not(feature = "metrics"))]
fn serve_metrics(_port: u16, _registry: &Arc<MetricsRegistry>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use photobooth::{capture::MockBackend, display::HeadlessBackend};

    #[test]
    fn test_no_camera_exits_non_zero() {
        let mut displays = HeadlessBackend::new();
        let result = run(
            &FileConfig::default(),
            false,
            &mut MockBackend::empty(),
            &mut displays,
        );

        assert!(matches!(result, Err(BoothError::NoCameraDetected)));
        assert_eq!(displays.created(), 0);
        assert_eq!(exit_status(result), EXIT_FAILURE);
    }

    #[test]
    fn test_clean_quit_exits_zero() {
        assert_eq!(exit_status(Ok(())), EXIT_SUCCESS);
    }
}
