//! # Gamepad Calibrator
//!
//! Walks the user through calibrating a connected game controller and
//! records the resulting physical-to-logical remaps in a properties file
//! that the engine's input-compatibility layer reads at startup.
//!
//! The binary is a thin shell: it pumps evdev events into the wizard at a
//! fixed tick rate, renders prompts and hold countdowns as log lines, and
//! persists the finished mapping set through the store, retrying a failed
//! save a few times before giving up.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};
use tracing_subscriber;

mod config;
mod error;
mod input;
mod preview;
mod store;
mod wizard;

use config::Config;
use input::linux::JoystickHub;
use preview::PreviewState;
use store::MappingStore;
use wizard::{CalibrationSet, CalibrationWizard, Prompt, WizardOutcome, WizardView};

/// Default configuration file location
const CONFIG_PATH: &str = "config/default.toml";

/// How many times a failed calibration-file save is retried
const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Delay between save attempts
const SAVE_RETRY_DELAY_MS: u64 = 500;

/// Renders wizard notifications as log lines.
///
/// The hold countdown fires every tick while something is held, so it is
/// deduplicated here to one line per displayed second.
struct LogView {
    last_seconds_left: Option<u32>,
}

impl LogView {
    fn new() -> Self {
        Self {
            last_seconds_left: None,
        }
    }
}

impl WizardView for LogView {
    fn on_prompt_changed(&mut self, prompt: &Prompt) {
        self.last_seconds_left = None;
        info!("Press the {}", prompt.label());
    }

    fn on_focus_changed(&mut self, focused: Option<&input::PhysicalControl>) {
        if focused.is_none() {
            self.last_seconds_left = None;
        }
    }

    fn on_hold_progress(&mut self, seconds_left: u32) {
        if self.last_seconds_left != Some(seconds_left) {
            info!("{} s left...", seconds_left);
            self.last_seconds_left = Some(seconds_left);
        }
    }

    fn on_outcome(&mut self, outcome: &WizardOutcome) {
        match outcome {
            WizardOutcome::Completed(set) => {
                info!(
                    device = %set.device_name,
                    entries = set.entries.len(),
                    "Calibration completed successfully"
                );
            }
            WizardOutcome::Cancelled => info!("Calibration cancelled, nothing saved"),
        }
    }
}

/// Builds the JSON session summary logged after a successful save.
fn session_summary(set: &CalibrationSet) -> serde_json::Value {
    serde_json::json!({
        "device": set.device_name,
        "entries": set.entries.iter().map(|entry| {
            serde_json::json!({
                "logical": entry.logical.key(),
                "physical": entry.physical.name,
                "kind": if entry.physical.is_axis() { "axis" } else { "button" },
            })
        }).collect::<Vec<_>>(),
        "biases": set.biases.iter()
            .map(|(control, positive)| (control.key().to_string(), *positive))
            .collect::<std::collections::BTreeMap<_, _>>(),
    })
}

/// Saves the finished set, retrying transient failures.
///
/// A save failure is surfaced with its cause chain and retried a bounded
/// number of times; it never takes the process down (the file may live on a
/// briefly unavailable medium).
async fn save_with_retry(store: &MappingStore, set: &CalibrationSet) -> bool {
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        match store.record(set) {
            Ok(()) => {
                info!(
                    path = %store.path().display(),
                    "Restart the application to load the new settings"
                );
                return true;
            }
            Err(e) => {
                error!(attempt, error = %e, "Could not save calibration file");
                let mut source = std::error::Error::source(&e);
                while let Some(cause) = source {
                    error!("  caused by: {}", cause);
                    source = cause.source();
                }
                if attempt < MAX_SAVE_ATTEMPTS {
                    tokio::time::sleep(Duration::from_millis(SAVE_RETRY_DELAY_MS)).await;
                }
            }
        }
    }
    false
}

/// Main entry point for the calibration shell.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (defaults when the file is absent)
///    - Open every connected joystick and print the roster
///
/// 2. **Main Loop**
///    - Pump raw events into the preview tracker and the wizard
///    - Advance the wizard's hold timer at the configured tick rate
///    - Handle Ctrl+C as session cancellation
///
/// 3. **Completion**
///    - Merge the finished mapping set into the calibration file,
///      retrying failed saves a few times
///    - Log a JSON summary of the session
///
/// # Errors
///
/// Returns error if no joystick is connected or the configuration file is
/// invalid. Calibration-file save failures are reported and retried, never
/// fatal.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(writer)
        .init();

    info!("Gamepad Calibrator v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(CONFIG_PATH)?;
    let store = MappingStore::new(&config.files.calibration_file);

    let mut hub = JoystickHub::open()?;
    let roster = hub.roster();
    for device in &roster {
        info!(
            device = %device.name,
            axes = device.axes.len(),
            buttons = device.buttons.len(),
            trigger_buttons = device.has_dedicated_trigger_buttons,
            "Connected joystick"
        );
    }

    let mut wizard = CalibrationWizard::with_view(roster, Box::new(LogView::new()));
    wizard.set_hold_seconds(config.wizard.hold_seconds);
    wizard.set_axis_threshold(config.wizard.axis_threshold);

    let mut preview_state = PreviewState::new();
    let mut last_preview = std::time::Instant::now();
    let preview_interval = Duration::from_millis(config.preview.log_interval_ms);

    info!("When prompted, press the requested control and hold it for one second.");
    info!("Do not apply any additional inputs beyond what is prompted.");
    info!("First, press any button on the controller you want to calibrate.");
    info!("Press Ctrl+C to cancel");

    let tick = Duration::from_micros(1_000_000 / config.input.poll_rate_hz as u64);
    let dt = tick.as_secs_f32();
    let mut poll_interval = interval(tick);

    // Main control loop
    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                for event in hub.poll_events() {
                    preview_state.process_event(&event);
                    wizard.handle_event(&event);
                }
                wizard.tick(dt);

                if config.preview.enabled && last_preview.elapsed() >= preview_interval {
                    for (id, state) in preview_state.devices() {
                        info!(device = %id, state = %state.summary(), "preview");
                    }
                    last_preview = std::time::Instant::now();
                }

                if !wizard.is_active() {
                    break;
                }
            }

            // Handle Ctrl+C as session cancellation
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, cancelling calibration...");
                wizard.cancel();
                break;
            }
        }
    }

    match wizard.outcome() {
        Some(WizardOutcome::Completed(set)) => {
            if save_with_retry(&store, set).await {
                info!(summary = %session_summary(set), "Session summary");
            } else {
                warn!("Calibration results were not saved");
            }
        }
        Some(WizardOutcome::Cancelled) | None => {
            info!("No calibration recorded");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::{DeviceId, PhysicalControl};
    use std::collections::HashMap;
    use wizard::{LogicalControl, MappingEntry};

    #[test]
    fn test_save_retry_constants() {
        assert!(MAX_SAVE_ATTEMPTS >= 1);
        assert!(SAVE_RETRY_DELAY_MS <= 5000, "retry delay should stay snappy");
    }

    #[test]
    fn test_session_summary_shape() {
        let mut biases = HashMap::new();
        biases.insert(LogicalControl::L2, true);
        let set = CalibrationSet {
            device_name: "PadX".to_string(),
            entries: vec![MappingEntry {
                logical: LogicalControl::LeftTrigger,
                physical: PhysicalControl::axis(DeviceId(0), 3, "ABS_RX"),
            }],
            biases,
        };

        let summary = session_summary(&set);
        assert_eq!(summary["device"], "PadX");
        assert_eq!(summary["entries"][0]["logical"], "LeftTrigger");
        assert_eq!(summary["entries"][0]["physical"], "ABS_RX");
        assert_eq!(summary["entries"][0]["kind"], "axis");
        assert_eq!(summary["biases"]["L2"], true);
    }

    #[test]
    fn test_session_summary_empty_session() {
        let set = CalibrationSet {
            device_name: "PadX".to_string(),
            entries: vec![],
            biases: HashMap::new(),
        };
        let summary = session_summary(&set);
        assert_eq!(summary["entries"].as_array().unwrap().len(), 0);
    }
}
