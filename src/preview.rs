//! # Preview Module
//!
//! Maintains a live snapshot of every connected controller from the raw
//! event stream, for the on-screen (here: log-rendered) gamepad preview.
//!
//! The tracker is deliberately dumb: it remembers the last value of every
//! axis and the pressed/released state of every button, per device, and can
//! summarize a device's state as one line. Remapping, deadzones, and the
//! wizard never consult it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::input::{DeviceId, JoyEvent, PhysicalKind};

/// Last observed state of one device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Last normalized value per axis id.
    axes: BTreeMap<u16, f32>,
    /// Currently pressed button ids.
    buttons: BTreeMap<u16, bool>,
}

impl DeviceState {
    /// Last value of an axis, if it ever moved.
    #[must_use]
    pub fn axis(&self, id: u16) -> Option<f32> {
        self.axes.get(&id).copied()
    }

    /// Whether a button is currently pressed.
    #[must_use]
    pub fn is_pressed(&self, id: u16) -> bool {
        self.buttons.get(&id).copied().unwrap_or(false)
    }

    /// True if any button is pressed.
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.values().any(|pressed| *pressed)
    }

    /// True if any axis is deflected beyond `threshold`.
    #[must_use]
    pub fn any_axis_deflected(&self, threshold: f32) -> bool {
        self.axes.values().any(|value| value.abs() > threshold)
    }

    /// One-line human-readable summary for the preview log.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::from("axes [");
        for (i, (id, value)) in self.axes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}:{:+.2}", id, value);
        }
        out.push_str("] buttons [");
        let mut first = true;
        for (id, pressed) in &self.buttons {
            if *pressed {
                if !first {
                    out.push(' ');
                }
                let _ = write!(out, "{}", id);
                first = false;
            }
        }
        out.push(']');
        out
    }
}

/// Tracks the live state of every device seen on the event stream.
///
/// # Examples
///
/// ```
/// use gamepad_calibrator::input::{DeviceId, JoyEvent, PhysicalControl};
/// use gamepad_calibrator::preview::PreviewState;
///
/// let mut preview = PreviewState::new();
/// preview.process_event(&JoyEvent::Axis {
///     axis: PhysicalControl::axis(DeviceId(0), 1, "ABS_Y"),
///     value: -0.75,
/// });
/// assert_eq!(preview.device(DeviceId(0)).unwrap().axis(1), Some(-0.75));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PreviewState {
    devices: BTreeMap<DeviceId, DeviceState>,
}

impl PreviewState {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one raw event into the snapshot.
    pub fn process_event(&mut self, event: &JoyEvent) {
        let state = self.devices.entry(event.device()).or_default();
        match event {
            JoyEvent::Axis { axis, value } => {
                if axis.kind == PhysicalKind::Axis && value.is_finite() {
                    state.axes.insert(axis.id, value.clamp(-1.0, 1.0));
                }
            }
            JoyEvent::Button { button, pressed } => {
                if button.kind == PhysicalKind::Button {
                    state.buttons.insert(button.id, *pressed);
                }
            }
        }
    }

    /// State of one device, if it has produced any event yet.
    #[must_use]
    pub fn device(&self, id: DeviceId) -> Option<&DeviceState> {
        self.devices.get(&id)
    }

    /// Devices seen so far, in id order.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &DeviceState)> {
        self.devices.iter().map(|(id, state)| (*id, state))
    }

    /// Forgets all state, e.g. after controllers reconnect.
    pub fn reset(&mut self) {
        self.devices.clear();
    }
}
