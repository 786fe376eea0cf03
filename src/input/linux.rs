//! # Linux Joystick Backend
//!
//! Joystick discovery and raw event delivery via the Linux evdev interface.
//!
//! ## Device Detection
//!
//! Every `/dev/input/event*` node is probed; a device qualifies as a
//! joystick when it advertises gamepad-style buttons (`BTN_SOUTH` or
//! `BTN_TRIGGER`) together with at least one absolute axis. Devices that
//! cannot be opened (typically permissions) are skipped, not fatal.
//!
//! ## Normalization
//!
//! Raw absolute-axis values are mapped to -1.0..1.0 using the min/max the
//! kernel reports for each axis, so 0-255 sticks, -32768..32767 sticks, and
//! -1/0/1 hat axes all arrive at the wizard in the same range.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use evdev::{AbsoluteAxisType, Device, InputEventKind, Key};
use tracing::{debug, info, warn};

use crate::error::{CalibratorError, Result};
use crate::input::{AxisInfo, ButtonInfo, DeviceId, DeviceInfo, JoyEvent, PhysicalControl};

/// Fallback display name for devices that report none.
const UNNAMED_DEVICE: &str = "Unknown Controller";

/// Converts a raw absolute-axis value into -1.0..1.0.
///
/// Degenerate ranges (max <= min) normalize to 0.0 rather than dividing by
/// zero.
///
/// # Examples
///
/// ```
/// use gamepad_calibrator::input::linux::normalize_abs;
///
/// assert!((normalize_abs(0, 0, 255) - (-1.0)).abs() < 0.01);
/// assert!(normalize_abs(128, 0, 255).abs() < 0.01);
/// assert!((normalize_abs(255, 0, 255) - 1.0).abs() < 0.01);
/// assert_eq!(normalize_abs(1, -1, 1), 1.0);
/// ```
#[must_use]
pub fn normalize_abs(value: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    let span = (max - min) as f32;
    let offset = (value - min) as f32;
    ((offset / span) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// One opened joystick with the lookup tables needed to translate its
/// events.
struct OpenJoystick {
    info: DeviceInfo,
    device: Device,
    /// Axis code -> (min, max) from the kernel's absinfo.
    ranges: HashMap<u16, (i32, i32)>,
}

/// Owns every opened joystick and turns evdev events into [`JoyEvent`]s.
pub struct JoystickHub {
    joysticks: Vec<OpenJoystick>,
}

impl JoystickHub {
    /// Scans `/dev/input` and opens every joystick-like device.
    ///
    /// # Errors
    ///
    /// - `JoystickNotFound`: nothing joystick-like is connected
    /// - `Input`: the input directory itself cannot be read
    pub fn open() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(CalibratorError::Input(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| CalibratorError::Input(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                CalibratorError::Input(format!("Failed to read directory entry: {}", e))
            })?;

        // Sort entries for deterministic device ids when multiple
        // controllers are connected.
        entries.sort_by_key(|entry| entry.path());

        let mut joysticks = Vec::new();
        for entry in entries {
            let path = entry.path();

            // Only check event* devices
            if let Some(filename) = path.file_name() {
                if !filename.to_string_lossy().starts_with("event") {
                    continue;
                }
            } else {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    if !looks_like_joystick(&device) {
                        continue;
                    }
                    let id = DeviceId(joysticks.len() as u32);
                    match open_joystick(id, device) {
                        Ok(joystick) => {
                            info!(
                                device = %joystick.info.name,
                                path = %path.display(),
                                axes = joystick.info.axes.len(),
                                buttons = joystick.info.buttons.len(),
                                trigger_buttons = joystick.info.has_dedicated_trigger_buttons,
                                "Opened joystick"
                            );
                            joysticks.push(joystick);
                        }
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Could not query joystick");
                        }
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        if joysticks.is_empty() {
            return Err(CalibratorError::JoystickNotFound);
        }
        Ok(Self { joysticks })
    }

    /// Snapshot of every opened device, for the wizard and the roster
    /// display.
    #[must_use]
    pub fn roster(&self) -> Vec<DeviceInfo> {
        self.joysticks.iter().map(|j| j.info.clone()).collect()
    }

    /// Drains pending events from every device without blocking.
    ///
    /// Devices that report errors other than "no events yet" are logged and
    /// skipped for this poll; a disconnect therefore degrades to silence,
    /// which the caller may treat as grounds for cancelling.
    pub fn poll_events(&mut self) -> Vec<JoyEvent> {
        let mut out = Vec::new();
        for joystick in &mut self.joysticks {
            match joystick.device.fetch_events() {
                Ok(events) => {
                    for event in events {
                        if let Some(converted) = convert_event(
                            &joystick.info,
                            &joystick.ranges,
                            event.kind(),
                            event.value(),
                        ) {
                            out.push(converted);
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => {
                    warn!(device = %joystick.info.name, error = %e, "Failed to fetch events");
                }
            }
        }
        out
    }
}

/// Convenience snapshot: open the hub, return the roster, drop the handles.
pub fn list_joysticks() -> Result<Vec<DeviceInfo>> {
    Ok(JoystickHub::open()?.roster())
}

/// A joystick advertises gamepad buttons and at least one absolute axis.
fn looks_like_joystick(device: &Device) -> bool {
    let has_gamepad_keys = device.supported_keys().map_or(false, |keys| {
        keys.contains(Key::BTN_SOUTH) || keys.contains(Key::BTN_TRIGGER)
    });
    let has_axes = device
        .supported_absolute_axes()
        .map_or(false, |axes| axes.iter().next().is_some());
    has_gamepad_keys && has_axes
}

fn open_joystick(id: DeviceId, device: Device) -> Result<OpenJoystick> {
    let name = device
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| UNNAMED_DEVICE.to_string());

    let abs_state = device.get_abs_state()?;
    let mut axes = Vec::new();
    let mut ranges = HashMap::new();
    if let Some(supported) = device.supported_absolute_axes() {
        for axis in supported.iter() {
            let code = axis.0;
            axes.push(AxisInfo {
                id: code,
                name: format!("{:?}", axis),
            });
            if let Some(info) = abs_state.get(code as usize) {
                ranges.insert(code, (info.minimum, info.maximum));
            }
        }
    }

    let mut buttons = Vec::new();
    let mut has_tl2 = false;
    let mut has_tr2 = false;
    if let Some(supported) = device.supported_keys() {
        for key in supported.iter() {
            let key_name = format!("{:?}", key);
            if !key_name.starts_with("BTN_") {
                continue;
            }
            has_tl2 |= key == Key::BTN_TL2;
            has_tr2 |= key == Key::BTN_TR2;
            buttons.push(ButtonInfo {
                id: key.code(),
                name: key_name,
            });
        }
    }

    Ok(OpenJoystick {
        info: DeviceInfo {
            id,
            name,
            axes,
            buttons,
            has_dedicated_trigger_buttons: has_tl2 && has_tr2,
        },
        device,
        ranges,
    })
}

/// Translates one evdev event into the wizard's vocabulary. Sync events and
/// unrelated event types yield `None`.
fn convert_event(
    info: &DeviceInfo,
    ranges: &HashMap<u16, (i32, i32)>,
    kind: InputEventKind,
    value: i32,
) -> Option<JoyEvent> {
    match kind {
        InputEventKind::AbsAxis(axis) => {
            let code = axis.0;
            let (min, max) = ranges.get(&code).copied()?;
            let name = info
                .axes
                .iter()
                .find(|a| a.id == code)
                .map(|a| a.name.clone())?;
            Some(JoyEvent::Axis {
                axis: PhysicalControl::axis(info.id, code, name),
                value: normalize_abs(value, min, max),
            })
        }
        InputEventKind::Key(key) => {
            let code = key.code();
            let name = info
                .buttons
                .iter()
                .find(|b| b.id == code)
                .map(|b| b.name.clone())?;
            Some(JoyEvent::Button {
                button: PhysicalControl::button(info.id, code, name),
                pressed: value != 0,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PhysicalKind;

    fn pad_info() -> DeviceInfo {
        DeviceInfo {
            id: DeviceId(0),
            name: "Test Pad".to_string(),
            axes: vec![
                AxisInfo {
                    id: 0,
                    name: "ABS_X".to_string(),
                },
                AxisInfo {
                    id: 16,
                    name: "ABS_HAT0X".to_string(),
                },
            ],
            buttons: vec![ButtonInfo {
                id: Key::BTN_SOUTH.code(),
                name: "BTN_SOUTH".to_string(),
            }],
            has_dedicated_trigger_buttons: false,
        }
    }

    fn pad_ranges() -> HashMap<u16, (i32, i32)> {
        let mut ranges = HashMap::new();
        ranges.insert(0, (0, 255));
        ranges.insert(16, (-1, 1));
        ranges
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_byte_range() {
        assert!((normalize_abs(0, 0, 255) - (-1.0)).abs() < 0.01);
        assert!(normalize_abs(128, 0, 255).abs() < 0.01);
        assert!((normalize_abs(255, 0, 255) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_normalize_signed_range() {
        assert!((normalize_abs(-32768, -32768, 32767) - (-1.0)).abs() < 0.001);
        assert!(normalize_abs(0, -32768, 32767).abs() < 0.01);
        assert!((normalize_abs(32767, -32768, 32767) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalize_hat_range() {
        assert_eq!(normalize_abs(-1, -1, 1), -1.0);
        assert_eq!(normalize_abs(0, -1, 1), 0.0);
        assert_eq!(normalize_abs(1, -1, 1), 1.0);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        assert_eq!(normalize_abs(5, 3, 3), 0.0);
        assert_eq!(normalize_abs(5, 7, 3), 0.0);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_values() {
        assert_eq!(normalize_abs(500, 0, 255), 1.0);
        assert_eq!(normalize_abs(-500, 0, 255), -1.0);
    }

    // ==================== Event Conversion Tests ====================

    #[test]
    fn test_convert_axis_event() {
        let event = convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X),
            255,
        )
        .unwrap();
        match event {
            JoyEvent::Axis { axis, value } => {
                assert_eq!(axis.kind, PhysicalKind::Axis);
                assert_eq!(axis.id, 0);
                assert_eq!(axis.name, "ABS_X");
                assert!((value - 1.0).abs() < 0.01);
            }
            other => panic!("expected axis event, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_hat_event() {
        let event = convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT0X),
            -1,
        )
        .unwrap();
        match event {
            JoyEvent::Axis { value, .. } => assert_eq!(value, -1.0),
            other => panic!("expected axis event, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_button_event() {
        let event = convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::Key(Key::BTN_SOUTH),
            1,
        )
        .unwrap();
        match event {
            JoyEvent::Button { button, pressed } => {
                assert_eq!(button.name, "BTN_SOUTH");
                assert!(pressed);
            }
            other => panic!("expected button event, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_ignores_unknown_controls() {
        // An axis the snapshot does not advertise is dropped.
        assert!(convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MISC),
            10,
        )
        .is_none());
        // So is a key outside the advertised button set.
        assert!(convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::Key(Key::KEY_A),
            1,
        )
        .is_none());
    }

    #[test]
    fn test_convert_ignores_sync_events() {
        assert!(convert_event(
            &pad_info(),
            &pad_ranges(),
            InputEventKind::Synchronization(evdev::Synchronization::SYN_REPORT),
            0,
        )
        .is_none());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        // This test requires a connected game controller
        let hub = JoystickHub::open().expect("Should detect a connected joystick");
        let roster = hub.roster();
        assert!(!roster.is_empty());
        assert!(!roster[0].name.is_empty());
        assert!(!roster[0].axes.is_empty());
    }
}
