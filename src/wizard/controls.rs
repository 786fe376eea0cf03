//! # Logical Controls Module
//!
//! The fixed vocabulary of logical gamepad controls the wizard prompts for,
//! together with their prompt order and on-screen labels.
//!
//! ## Prompt order
//!
//! | Phase | Controls |
//! |-------|----------|
//! | Buttons | ActionTop, ActionRight, ActionBottom, ActionLeft, L1, R1, L2, R2, Select, Start, L3, R3 |
//! | Axes | LeftStickX, LeftStickY, RightStickX, RightStickY, LeftTrigger, RightTrigger, DPadX, DPadY |
//!
//! Stick and D-pad axes are prompted twice, positive direction first. The
//! trigger axes are prompted once (there is no negative trigger direction)
//! and only on devices without dedicated L2/R2 buttons.
//!
//! ## Serialized keys
//!
//! Each control serializes to a stable key used as the value side of the
//! calibration file. The four D-pad directions keep the numeric keys `12`
//! through `15` that the engine's input-compatibility layer expects; every
//! other control serializes as its own name.

/// An abstract named gamepad input, independent of any device's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalControl {
    // Face buttons. Top is Triangle on Playstation, Y on Xbox, X on Nintendo.
    ActionTop,
    ActionRight,
    ActionBottom,
    ActionLeft,

    // Shoulder buttons and triggers-as-buttons
    L1,
    R1,
    L2,
    R2,

    // System buttons
    Select,
    Start,

    // Stick clicks
    L3,
    R3,

    // D-pad directions, used when a D-pad reports as four buttons
    DPadLeft,
    DPadRight,
    DPadUp,
    DPadDown,

    // Two-sided axes
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,

    // Trigger axes, used when L2/R2 report as continuous axes
    LeftTrigger,
    RightTrigger,

    // POV axes, used when a D-pad reports as two quantized axes
    DPadX,
    DPadY,
}

impl LogicalControl {
    /// The key this control serializes under in the calibration file.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_calibrator::wizard::LogicalControl;
    ///
    /// assert_eq!(LogicalControl::L2.key(), "L2");
    /// assert_eq!(LogicalControl::DPadRight.key(), "13");
    /// assert_eq!(LogicalControl::LeftTrigger.key(), "LeftTrigger");
    /// ```
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            LogicalControl::ActionTop => "ActionTop",
            LogicalControl::ActionRight => "ActionRight",
            LogicalControl::ActionBottom => "ActionBottom",
            LogicalControl::ActionLeft => "ActionLeft",
            LogicalControl::L1 => "L1",
            LogicalControl::R1 => "R1",
            LogicalControl::L2 => "L2",
            LogicalControl::R2 => "R2",
            LogicalControl::Select => "Select",
            LogicalControl::Start => "Start",
            LogicalControl::L3 => "L3",
            LogicalControl::R3 => "R3",
            // Compatibility keys consumed by the engine input layer
            LogicalControl::DPadLeft => "12",
            LogicalControl::DPadRight => "13",
            LogicalControl::DPadUp => "14",
            LogicalControl::DPadDown => "15",
            LogicalControl::LeftStickX => "LeftStickX",
            LogicalControl::LeftStickY => "LeftStickY",
            LogicalControl::RightStickX => "RightStickX",
            LogicalControl::RightStickY => "RightStickY",
            LogicalControl::LeftTrigger => "LeftTrigger",
            LogicalControl::RightTrigger => "RightTrigger",
            LogicalControl::DPadX => "DPadX",
            LogicalControl::DPadY => "DPadY",
        }
    }

    /// True for the trigger axes, which are prompted once and only on
    /// devices without dedicated trigger buttons.
    #[must_use]
    pub fn is_trigger_axis(self) -> bool {
        matches!(
            self,
            LogicalControl::LeftTrigger | LogicalControl::RightTrigger
        )
    }

    /// True for axes prompted once per polarity.
    #[must_use]
    pub fn is_two_sided_axis(self) -> bool {
        matches!(
            self,
            LogicalControl::LeftStickX
                | LogicalControl::LeftStickY
                | LogicalControl::RightStickX
                | LogicalControl::RightStickY
                | LogicalControl::DPadX
                | LogicalControl::DPadY
        )
    }
}

/// Button prompts in calibration order, with display labels.
pub const BUTTON_PROMPTS: [(LogicalControl, &str); 12] = [
    (LogicalControl::ActionTop, "Top Action Button"),
    (LogicalControl::ActionRight, "Right Action Button"),
    (LogicalControl::ActionBottom, "Bottom Action Button"),
    (LogicalControl::ActionLeft, "Left Action Button"),
    (LogicalControl::L1, "Left Bumper (L1)"),
    (LogicalControl::R1, "Right Bumper (R1)"),
    (LogicalControl::L2, "Left Trigger (L2)"),
    (LogicalControl::R2, "Right Trigger (R2)"),
    (LogicalControl::Select, "Back/Select"),
    (LogicalControl::Start, "Start"),
    (LogicalControl::L3, "Left Analog Stick Button (L3)"),
    (LogicalControl::R3, "Right Analog Stick Button (R3)"),
];

/// Axis prompts in calibration order, with display labels.
pub const AXIS_PROMPTS: [(LogicalControl, &str); 8] = [
    (LogicalControl::LeftStickX, "Left Analog Stick (Horizontal)"),
    (LogicalControl::LeftStickY, "Left Analog Stick (Vertical)"),
    (LogicalControl::RightStickX, "Right Analog Stick (Horizontal)"),
    (LogicalControl::RightStickY, "Right Analog Stick (Vertical)"),
    (LogicalControl::LeftTrigger, "Left Trigger"),
    (LogicalControl::RightTrigger, "Right Trigger"),
    (LogicalControl::DPadX, "D-Pad (Horizontal)"),
    (LogicalControl::DPadY, "D-Pad (Vertical)"),
];

/// Returns the display label for a promptable control, if it has one.
#[must_use]
pub fn prompt_label(control: LogicalControl) -> Option<&'static str> {
    BUTTON_PROMPTS
        .iter()
        .chain(AXIS_PROMPTS.iter())
        .find(|(c, _)| *c == control)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Key Tests ====================

    #[test]
    fn test_dpad_direction_compatibility_keys() {
        assert_eq!(LogicalControl::DPadLeft.key(), "12");
        assert_eq!(LogicalControl::DPadRight.key(), "13");
        assert_eq!(LogicalControl::DPadUp.key(), "14");
        assert_eq!(LogicalControl::DPadDown.key(), "15");
    }

    #[test]
    fn test_named_keys_match_variants() {
        assert_eq!(LogicalControl::ActionTop.key(), "ActionTop");
        assert_eq!(LogicalControl::Select.key(), "Select");
        assert_eq!(LogicalControl::LeftStickX.key(), "LeftStickX");
        assert_eq!(LogicalControl::RightTrigger.key(), "RightTrigger");
        assert_eq!(LogicalControl::DPadY.key(), "DPadY");
    }

    #[test]
    fn test_keys_are_unique() {
        let all = [
            LogicalControl::ActionTop,
            LogicalControl::ActionRight,
            LogicalControl::ActionBottom,
            LogicalControl::ActionLeft,
            LogicalControl::L1,
            LogicalControl::R1,
            LogicalControl::L2,
            LogicalControl::R2,
            LogicalControl::Select,
            LogicalControl::Start,
            LogicalControl::L3,
            LogicalControl::R3,
            LogicalControl::DPadLeft,
            LogicalControl::DPadRight,
            LogicalControl::DPadUp,
            LogicalControl::DPadDown,
            LogicalControl::LeftStickX,
            LogicalControl::LeftStickY,
            LogicalControl::RightStickX,
            LogicalControl::RightStickY,
            LogicalControl::LeftTrigger,
            LogicalControl::RightTrigger,
            LogicalControl::DPadX,
            LogicalControl::DPadY,
        ];
        let mut keys: Vec<&str> = all.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all.len());
    }

    // ==================== Prompt Table Tests ====================

    #[test]
    fn test_button_prompt_order() {
        assert_eq!(BUTTON_PROMPTS.len(), 12);
        assert_eq!(BUTTON_PROMPTS[0].0, LogicalControl::ActionTop);
        assert_eq!(BUTTON_PROMPTS[6].0, LogicalControl::L2);
        assert_eq!(BUTTON_PROMPTS[7].0, LogicalControl::R2);
        assert_eq!(BUTTON_PROMPTS[11].0, LogicalControl::R3);
    }

    #[test]
    fn test_axis_prompt_order() {
        assert_eq!(AXIS_PROMPTS.len(), 8);
        assert_eq!(AXIS_PROMPTS[0].0, LogicalControl::LeftStickX);
        assert_eq!(AXIS_PROMPTS[4].0, LogicalControl::LeftTrigger);
        assert_eq!(AXIS_PROMPTS[5].0, LogicalControl::RightTrigger);
        assert_eq!(AXIS_PROMPTS[7].0, LogicalControl::DPadY);
    }

    #[test]
    fn test_trigger_axis_classification() {
        assert!(LogicalControl::LeftTrigger.is_trigger_axis());
        assert!(LogicalControl::RightTrigger.is_trigger_axis());
        assert!(!LogicalControl::L2.is_trigger_axis());
        assert!(!LogicalControl::DPadX.is_trigger_axis());
    }

    #[test]
    fn test_two_sided_axis_classification() {
        for (control, _) in AXIS_PROMPTS {
            if control.is_trigger_axis() {
                assert!(!control.is_two_sided_axis());
            } else {
                assert!(control.is_two_sided_axis(), "{:?}", control);
            }
        }
        assert!(!LogicalControl::Start.is_two_sided_axis());
    }

    #[test]
    fn test_prompt_label_lookup() {
        assert_eq!(
            prompt_label(LogicalControl::L2),
            Some("Left Trigger (L2)")
        );
        assert_eq!(
            prompt_label(LogicalControl::DPadX),
            Some("D-Pad (Horizontal)")
        );
        // D-pad directions are commit targets, never prompts.
        assert_eq!(prompt_label(LogicalControl::DPadRight), None);
    }
}
