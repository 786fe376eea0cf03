//! # Calibration Session Module
//!
//! The hold-to-confirm wizard that walks a user through every button and
//! axis of a controller and assembles the physical-to-logical mapping.
//!
//! ## Flow
//!
//! 1. Before a device is selected, every observed value is recorded as that
//!    control's resting baseline. The first button *release* selects the
//!    device to calibrate.
//! 2. Each logical control is prompted in turn (buttons, then axes, each
//!    two-sided axis positive direction first). Holding one physical
//!    control away from its baseline for the hold duration accepts it;
//!    touching anything else, or flipping sign, restarts the timer.
//! 3. On the last prompt the wizard emits a [`CalibrationSet`] for the
//!    mapping store.
//!
//! The wizard performs no I/O and knows nothing about rendering; a
//! [`WizardView`] receives prompt/hold/outcome notifications, and every
//! piece of displayed state is also available through poll accessors.
//!
//! ## Usage
//!
//! ```
//! use gamepad_calibrator::input::{AxisInfo, ButtonInfo, DeviceId, DeviceInfo, PhysicalControl};
//! use gamepad_calibrator::wizard::CalibrationWizard;
//!
//! let roster = vec![DeviceInfo {
//!     id: DeviceId(0),
//!     name: "Test Pad".to_string(),
//!     axes: vec![AxisInfo { id: 0, name: "ABS_X".to_string() }],
//!     buttons: vec![ButtonInfo { id: 0, name: "BTN_SOUTH".to_string() }],
//!     has_dedicated_trigger_buttons: true,
//! }];
//! let mut wizard = CalibrationWizard::new(roster);
//!
//! // Any button release selects the device and starts the prompts.
//! let start = PhysicalControl::button(DeviceId(0), 0, "BTN_SOUTH");
//! wizard.observe_button(&start, true);
//! wizard.observe_button(&start, false);
//! assert!(wizard.prompt().is_some());
//! ```

use std::collections::HashMap;

use tracing::{debug, info};

use super::controls::{prompt_label, LogicalControl, AXIS_PROMPTS, BUTTON_PROMPTS};
use crate::input::{DeviceId, DeviceInfo, JoyEvent, PhysicalControl, PhysicalKind};

/// Default time a candidate must be held before it is accepted, in seconds.
pub const DEFAULT_HOLD_SECONDS: f32 = 1.0;

/// Default minimum axis deflection for a candidate to gain focus.
pub const DEFAULT_AXIS_THRESHOLD: f32 = 0.5;

/// A control resting within this distance of its baseline is not a press.
const BASELINE_TOLERANCE: f32 = 0.001;

/// The prompt the wizard is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    /// The logical control being calibrated.
    pub control: LogicalControl,
    /// Required polarity for axis prompts; `None` for button prompts.
    pub bias: Option<bool>,
}

impl Prompt {
    /// Display text for this prompt ("Press the ...").
    #[must_use]
    pub fn label(&self) -> String {
        let base = prompt_label(self.control).unwrap_or_else(|| self.control.key());
        match self.bias {
            Some(true) => format!("Positive {}", base),
            Some(false) => format!("Negative {}", base),
            None => base.to_string(),
        }
    }
}

/// One accepted association between a logical control and the physical
/// control that drives it.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub logical: LogicalControl,
    pub physical: PhysicalControl,
}

/// The finished product of one wizard run, handed to the mapping store.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSet {
    /// Display name of the calibrated device. Applies to every controller
    /// sharing that name.
    pub device_name: String,
    /// Accepted mappings in commit order. A logical control committed twice
    /// keeps its original position with the later physical control.
    pub entries: Vec<MappingEntry>,
    /// Observed sign per *prompted* control (true = positive deflection).
    pub biases: HashMap<LogicalControl, bool>,
}

/// How a wizard run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    /// Every prompt was visited; the mapping set is ready to persist.
    Completed(CalibrationSet),
    /// The run was abandoned; nothing may be persisted.
    Cancelled,
}

/// Receives presentation events from the wizard.
///
/// All methods have empty defaults so a view only implements what it
/// renders. The wizard also exposes poll accessors for every notification,
/// so a view is optional.
pub trait WizardView {
    /// A new prompt became current.
    fn on_prompt_changed(&mut self, _prompt: &Prompt) {}

    /// The focused candidate changed; `None` means the pending hold was
    /// abandoned.
    fn on_focus_changed(&mut self, _focused: Option<&PhysicalControl>) {}

    /// Whole seconds left on the current hold, for display.
    fn on_hold_progress(&mut self, _seconds_left: u32) {}

    /// The run reached a terminal state.
    fn on_outcome(&mut self, _outcome: &WizardOutcome) {}
}

/// View that renders nothing.
#[derive(Debug, Default)]
pub struct NullView;

impl WizardView for NullView {}

/// Resolves the key a candidate is committed under.
///
/// Most prompts commit under their own key. The exceptions handle
/// dual-purpose hardware: a trigger prompt answered with an axis is stored
/// under the dedicated trigger-axis key, and a D-pad axis prompt answered
/// with a button is stored under the directional button key picked by the
/// observed sign. The sign test matches the original engine behavior even
/// where it looks lopsided (button candidates always observe a positive
/// value); changing it would break existing mapping files.
#[must_use]
pub fn resolve_commit_key(
    prompted: LogicalControl,
    candidate: PhysicalKind,
    positive: bool,
) -> LogicalControl {
    match (prompted, candidate) {
        (LogicalControl::L2, PhysicalKind::Axis) => LogicalControl::LeftTrigger,
        (LogicalControl::R2, PhysicalKind::Axis) => LogicalControl::RightTrigger,
        (LogicalControl::DPadX, PhysicalKind::Button) => {
            if positive {
                LogicalControl::DPadRight
            } else {
                LogicalControl::DPadLeft
            }
        }
        (LogicalControl::DPadY, PhysicalKind::Button) => {
            if positive {
                LogicalControl::DPadUp
            } else {
                LogicalControl::DPadDown
            }
        }
        _ => prompted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingDevice,
    Buttons(usize),
    Axes { index: usize, bias: bool },
    Complete,
    Cancelled,
}

#[derive(Debug, Clone)]
struct SelectedDevice {
    name: String,
    has_dedicated_trigger_buttons: bool,
}

/// Drives one calibration run for one device.
///
/// Single-threaded by design: feed it events and `tick` from the same
/// logical thread. No state is shared.
pub struct CalibrationWizard {
    hold_seconds: f32,
    axis_threshold: f32,
    /// Connected-device snapshot taken when the wizard was opened.
    devices: Vec<DeviceInfo>,
    view: Box<dyn WizardView>,

    stage: Stage,
    device: Option<SelectedDevice>,
    /// Resting values observed before a device was selected.
    baselines: HashMap<PhysicalControl, f32>,

    focused: Option<PhysicalControl>,
    focus_value: f32,
    time_held: Option<f32>,

    entries: Vec<MappingEntry>,
    biases: HashMap<LogicalControl, bool>,
    outcome: Option<WizardOutcome>,
}

impl CalibrationWizard {
    /// Creates a wizard over a device roster with default timing and no view.
    #[must_use]
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self::with_view(devices, Box::new(NullView))
    }

    /// Creates a wizard that notifies `view` of presentation changes.
    #[must_use]
    pub fn with_view(devices: Vec<DeviceInfo>, view: Box<dyn WizardView>) -> Self {
        Self {
            hold_seconds: DEFAULT_HOLD_SECONDS,
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
            devices,
            view,
            stage: Stage::AwaitingDevice,
            device: None,
            baselines: HashMap::new(),
            focused: None,
            focus_value: 0.0,
            time_held: None,
            entries: Vec::new(),
            biases: HashMap::new(),
            outcome: None,
        }
    }

    /// Overrides the hold-to-confirm duration. Clamped to 0.1..=10 seconds.
    pub fn set_hold_seconds(&mut self, seconds: f32) {
        self.hold_seconds = seconds.clamp(0.1, 10.0);
    }

    /// Overrides the axis focus threshold. Clamped to 0.05..=0.95.
    pub fn set_axis_threshold(&mut self, threshold: f32) {
        self.axis_threshold = threshold.clamp(0.05, 0.95);
    }

    /// The prompt currently displayed, or `None` while waiting for a device
    /// or after the run ended.
    #[must_use]
    pub fn prompt(&self) -> Option<Prompt> {
        match self.stage {
            Stage::Buttons(index) => Some(Prompt {
                control: BUTTON_PROMPTS[index].0,
                bias: None,
            }),
            Stage::Axes { index, bias } => Some(Prompt {
                control: AXIS_PROMPTS[index].0,
                bias: Some(bias),
            }),
            _ => None,
        }
    }

    /// Whole seconds left on the pending hold, for display.
    #[must_use]
    pub fn hold_seconds_left(&self) -> Option<u32> {
        self.time_held
            .map(|held| (self.hold_seconds - held).ceil().max(0.0) as u32)
    }

    /// Display name of the device being calibrated, once selected.
    #[must_use]
    pub fn selected_device(&self) -> Option<&str> {
        self.device.as_ref().map(|d| d.name.as_str())
    }

    /// The candidate currently being held, if any.
    #[must_use]
    pub fn focused(&self) -> Option<&PhysicalControl> {
        self.focused.as_ref()
    }

    /// Terminal outcome, once the run has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<&WizardOutcome> {
        self.outcome.as_ref()
    }

    /// True while the wizard still wants events and ticks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Complete | Stage::Cancelled)
    }

    /// Feeds one raw event, dispatching on its kind.
    pub fn handle_event(&mut self, event: &JoyEvent) {
        match event {
            JoyEvent::Axis { axis, value } => self.observe_axis(axis, *value),
            JoyEvent::Button { button, pressed } => self.observe_button(button, *pressed),
        }
    }

    /// Observes an axis at a normalized value.
    ///
    /// Before a device is selected this records the axis baseline. After
    /// selection, a deflection past the focus threshold that differs from
    /// the baseline makes the axis the hold candidate; returning toward
    /// rest clears it.
    pub fn observe_axis(&mut self, axis: &PhysicalControl, value: f32) {
        if !self.is_active() || axis.kind != PhysicalKind::Axis || !value.is_finite() {
            return;
        }
        let value = value.clamp(-1.0, 1.0);

        if self.device.is_none() {
            self.baselines.insert(axis.clone(), value);
            return;
        }
        if !self.from_selected_device(axis.device) {
            return;
        }

        let baseline = self.baselines.get(axis).copied();
        let deflected = value.abs() > self.axis_threshold
            && baseline.map_or(true, |rest| (rest - value).abs() > BASELINE_TOLERANCE);

        if deflected {
            let same_candidate = self.focused.as_ref() == Some(axis)
                && (self.focus_value > 0.0) == (value > 0.0);
            if same_candidate {
                // Same control, same direction: the hold survives jitter.
                self.focus_value = value;
            } else {
                self.focus(axis.clone(), value);
            }
        } else if self.focused.as_ref() == Some(axis) {
            self.clear_focus();
        }
    }

    /// Observes a button press or release.
    ///
    /// Before a device is selected this records the button baseline, and
    /// the first *release* selects the device. After selection a press of a
    /// button not resting pressed makes it the hold candidate; releasing
    /// clears it.
    pub fn observe_button(&mut self, button: &PhysicalControl, pressed: bool) {
        if !self.is_active() || button.kind != PhysicalKind::Button {
            return;
        }

        if self.device.is_none() {
            self.baselines
                .insert(button.clone(), if pressed { 1.0 } else { 0.0 });
            if !pressed {
                self.select_device(button.device);
            }
            return;
        }
        if !self.from_selected_device(button.device) {
            return;
        }

        let stuck = self
            .baselines
            .get(button)
            .map_or(false, |rest| (rest - 1.0).abs() <= BASELINE_TOLERANCE);

        if pressed && !stuck {
            if self.focused.as_ref() != Some(button) {
                self.focus(button.clone(), 1.0);
            }
        } else if self.focused.as_ref() == Some(button) {
            self.clear_focus();
        }
    }

    /// Advances the hold timer by `dt` seconds of elapsed simulation time
    /// and commits the candidate once the hold duration is reached.
    pub fn tick(&mut self, dt: f32) {
        if !self.is_active() || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let Some(held) = self.time_held else {
            return;
        };
        let held = held + dt;
        self.time_held = Some(held);
        let seconds_left = (self.hold_seconds - held).ceil().max(0.0) as u32;
        self.view.on_hold_progress(seconds_left);
        if held >= self.hold_seconds {
            self.commit();
        }
    }

    /// Abandons the current prompt without recording a mapping and moves to
    /// the next one.
    pub fn skip_current(&mut self) {
        if self.prompt().is_none() {
            return;
        }
        debug!("Prompt skipped");
        self.clear_focus();
        self.advance();
    }

    /// Discards the whole run. No mapping entries survive.
    pub fn cancel(&mut self) {
        if !self.is_active() {
            return;
        }
        info!("Calibration cancelled");
        self.clear_focus();
        self.entries.clear();
        self.biases.clear();
        self.stage = Stage::Cancelled;
        let outcome = WizardOutcome::Cancelled;
        self.view.on_outcome(&outcome);
        self.outcome = Some(outcome);
    }

    fn select_device(&mut self, id: DeviceId) {
        // Already calibrating: later qualifying events do not reselect.
        if self.device.is_some() {
            return;
        }
        let Some(info) = self.devices.iter().find(|d| d.id == id) else {
            debug!(%id, "Ignoring event from unknown device");
            return;
        };
        info!(
            device = %info.name,
            trigger_buttons = info.has_dedicated_trigger_buttons,
            "Selected joystick for calibration"
        );
        self.device = Some(SelectedDevice {
            name: info.name.clone(),
            has_dedicated_trigger_buttons: info.has_dedicated_trigger_buttons,
        });
        self.stage = Stage::Buttons(0);
        self.announce_prompt();
    }

    /// Calibration is keyed by display name, so events from any controller
    /// sharing the selected device's name count.
    fn from_selected_device(&self, id: DeviceId) -> bool {
        let Some(selected) = &self.device else {
            return false;
        };
        self.devices
            .iter()
            .find(|d| d.id == id)
            .map_or(false, |d| d.name == selected.name)
    }

    fn focus(&mut self, candidate: PhysicalControl, value: f32) {
        debug!(candidate = %candidate, value, "Hold candidate focused");
        self.focused = Some(candidate);
        self.focus_value = value;
        self.time_held = Some(0.0);
        self.view.on_focus_changed(self.focused.as_ref());
    }

    fn clear_focus(&mut self) {
        if self.focused.is_some() {
            self.view.on_focus_changed(None);
        }
        self.focused = None;
        self.focus_value = 0.0;
        self.time_held = None;
    }

    fn commit(&mut self) {
        let Some(prompt) = self.prompt() else {
            return;
        };
        let Some(candidate) = self.focused.take() else {
            return;
        };
        let positive = self.focus_value > 0.0;
        let logical = resolve_commit_key(prompt.control, candidate.kind, positive);
        debug!(
            prompted = prompt.control.key(),
            committed = logical.key(),
            candidate = %candidate,
            positive,
            "Mapping accepted"
        );
        match self.entries.iter_mut().find(|e| e.logical == logical) {
            Some(existing) => existing.physical = candidate,
            None => self.entries.push(MappingEntry {
                logical,
                physical: candidate,
            }),
        }
        self.biases.insert(prompt.control, positive);
        self.focus_value = 0.0;
        self.time_held = None;
        self.view.on_focus_changed(None);
        self.advance();
    }

    fn advance(&mut self) {
        match self.stage {
            Stage::Buttons(index) => {
                let next = index + 1;
                if next < BUTTON_PROMPTS.len() {
                    self.stage = Stage::Buttons(next);
                    self.announce_prompt();
                } else {
                    self.next_axis(0);
                }
            }
            Stage::Axes { index, bias } => {
                if bias && AXIS_PROMPTS[index].0.is_two_sided_axis() {
                    self.stage = Stage::Axes { index, bias: false };
                    self.announce_prompt();
                } else {
                    self.next_axis(index + 1);
                }
            }
            _ => {}
        }
    }

    fn next_axis(&mut self, mut index: usize) {
        // Trigger axes were already captured as L2/R2 button prompts on
        // devices with dedicated trigger buttons.
        let skip_triggers = self
            .device
            .as_ref()
            .map_or(true, |d| d.has_dedicated_trigger_buttons);
        while index < AXIS_PROMPTS.len()
            && AXIS_PROMPTS[index].0.is_trigger_axis()
            && skip_triggers
        {
            index += 1;
        }
        if index < AXIS_PROMPTS.len() {
            self.stage = Stage::Axes { index, bias: true };
            self.announce_prompt();
        } else {
            self.complete();
        }
    }

    fn complete(&mut self) {
        let device_name = self
            .device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_default();
        info!(
            device = %device_name,
            entries = self.entries.len(),
            "Calibration complete"
        );
        self.stage = Stage::Complete;
        let set = CalibrationSet {
            device_name,
            entries: std::mem::take(&mut self.entries),
            biases: std::mem::take(&mut self.biases),
        };
        let outcome = WizardOutcome::Completed(set);
        self.view.on_outcome(&outcome);
        self.outcome = Some(outcome);
    }

    fn announce_prompt(&mut self) {
        if let Some(prompt) = self.prompt() {
            debug!(prompt = %prompt.label(), "Prompt changed");
            self.view.on_prompt_changed(&prompt);
        }
    }
}
