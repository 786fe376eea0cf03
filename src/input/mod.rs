//! # Input Module
//!
//! Raw joystick input delivery.
//!
//! This module defines the contract between whatever produces raw input
//! (the evdev backend in [`linux`], or an engine's event queue) and the
//! calibration wizard:
//!
//! - [`DeviceInfo`]: a snapshot of one connected joystick, with display
//!   name, axis and button enumeration, and whether L2/R2 exist as discrete
//!   buttons or only as trigger axes.
//! - [`PhysicalControl`]: one concrete button or axis on one device.
//!   Identity is the `(device, kind, id)` triple; the display name rides
//!   along for persistence but does not participate in equality.
//! - [`JoyEvent`]: a discrete "axis moved to V" / "button pressed or
//!   released" event. Axis values are normalized to -1.0..1.0.

pub mod linux;

use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies one connected joystick for the lifetime of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joystick-{}", self.0)
    }
}

/// Whether a physical control is a discrete button or a continuous axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalKind {
    Button,
    Axis,
}

/// One concrete button or axis exposed by a specific connected device.
///
/// Two physical controls are equal only if they share kind and identifier
/// and belong to the same device. The display name is carried for the
/// calibration file but deliberately excluded from equality and hashing:
/// controls are compared by value identity, never by label.
///
/// # Examples
///
/// ```
/// use gamepad_calibrator::input::{DeviceId, PhysicalControl, PhysicalKind};
///
/// let a = PhysicalControl::button(DeviceId(0), 4, "BTN_TL");
/// let b = PhysicalControl::button(DeviceId(0), 4, "renamed");
/// assert_eq!(a, b);
///
/// let other_device = PhysicalControl::button(DeviceId(1), 4, "BTN_TL");
/// assert_ne!(a, other_device);
/// ```
#[derive(Debug, Clone)]
pub struct PhysicalControl {
    /// The device this control belongs to.
    pub device: DeviceId,
    /// Button or axis.
    pub kind: PhysicalKind,
    /// Backend-assigned identifier, stable for the session (evdev event code).
    pub id: u16,
    /// Human-readable name used in the calibration file.
    pub name: String,
}

impl PhysicalControl {
    /// Creates a button control.
    pub fn button(device: DeviceId, id: u16, name: impl Into<String>) -> Self {
        Self {
            device,
            kind: PhysicalKind::Button,
            id,
            name: name.into(),
        }
    }

    /// Creates an axis control.
    pub fn axis(device: DeviceId, id: u16, name: impl Into<String>) -> Self {
        Self {
            device,
            kind: PhysicalKind::Axis,
            id,
            name: name.into(),
        }
    }

    /// True when this control is an axis.
    #[must_use]
    pub fn is_axis(&self) -> bool {
        self.kind == PhysicalKind::Axis
    }
}

impl PartialEq for PhysicalControl {
    fn eq(&self, other: &Self) -> bool {
        self.device == other.device && self.kind == other.kind && self.id == other.id
    }
}

impl Eq for PhysicalControl {}

impl Hash for PhysicalControl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.device.hash(state);
        self.kind.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for PhysicalControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PhysicalKind::Button => write!(f, "button {} ({})", self.id, self.name),
            PhysicalKind::Axis => write!(f, "axis {} ({})", self.id, self.name),
        }
    }
}

/// One axis advertised by a device snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisInfo {
    pub id: u16,
    pub name: String,
}

/// One button advertised by a device snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonInfo {
    pub id: u16,
    pub name: String,
}

/// Snapshot of one connected joystick, as returned by
/// [`linux::list_joysticks`].
///
/// The display name is the calibration key: remaps recorded for one
/// "Wireless Controller" apply to every controller reporting that name.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Display name shared by identically-named controllers.
    pub name: String,
    pub axes: Vec<AxisInfo>,
    pub buttons: Vec<ButtonInfo>,
    /// True when the device exposes L2/R2 as discrete buttons rather than
    /// only as trigger axes. Captured once when the snapshot is taken.
    pub has_dedicated_trigger_buttons: bool,
}

/// A discrete raw input event handed to the wizard and the preview.
///
/// Axis values are normalized to -1.0..1.0 (triggers rest at their
/// backend-reported minimum, which normalizes to -1.0 on most pads).
#[derive(Debug, Clone, PartialEq)]
pub enum JoyEvent {
    /// An axis moved to `value`.
    Axis {
        axis: PhysicalControl,
        value: f32,
    },
    /// A button was pressed or released.
    Button {
        button: PhysicalControl,
        pressed: bool,
    },
}

impl JoyEvent {
    /// The physical control this event refers to.
    #[must_use]
    pub fn control(&self) -> &PhysicalControl {
        match self {
            JoyEvent::Axis { axis, .. } => axis,
            JoyEvent::Button { button, .. } => button,
        }
    }

    /// The device that produced this event.
    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.control().device
    }
}
