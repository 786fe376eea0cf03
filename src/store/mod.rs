//! # Mapping Store Module
//!
//! Durable persistence of calibration results.
//!
//! This module handles:
//! - Loading an existing calibration file (missing or unreadable files
//!   behave as an empty mapping)
//! - Merging one device's finished [`CalibrationSet`] into the loaded
//!   mapping without touching entries recorded for other device names
//! - Writing the merged mapping back deterministically
//!
//! Entries take the form `<deviceName>.<physicalControlName>=<logicalKey>`.
//! Remaps where the physical control already carries the logical key's name
//! are no-ops and are never written.

pub mod properties;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{CalibratorError, Result};
use crate::wizard::CalibrationSet;

use properties::{parse_properties, render_properties};

/// Reads and writes the calibration file at one path.
///
/// # Examples
///
/// ```no_run
/// use gamepad_calibrator::store::MappingStore;
///
/// let store = MappingStore::new("joystick-mapping.properties");
/// let existing = store.load();
/// assert!(existing.is_empty() || !existing.is_empty()); // missing file is fine
/// ```
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Creates a store over `path`. Nothing is touched until `load`/`save`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the existing mapping.
    ///
    /// A missing file is an empty mapping. An unreadable file is logged and
    /// also treated as empty, so calibration can proceed as if starting
    /// fresh.
    #[must_use]
    pub fn load(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_properties(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load calibration file");
                BTreeMap::new()
            }
        }
    }

    /// Writes `entries` back to the calibration file.
    ///
    /// Parent directories are created as needed. Failures are reported to
    /// the caller so the wizard can surface them and offer a retry; they
    /// never terminate the process.
    pub fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| {
                    CalibratorError::MappingFileCreate {
                        path: self.path.clone(),
                        source,
                    }
                })?;
            }
        }
        fs::write(&self.path, render_properties(entries)).map_err(|source| {
            CalibratorError::MappingFileWrite {
                path: self.path.clone(),
                source,
            }
        })?;
        info!(path = %self.path.display(), entries = entries.len(), "Calibration file saved");
        Ok(())
    }

    /// Loads, merges one session's results, and saves.
    pub fn record(&self, set: &CalibrationSet) -> Result<()> {
        let mut entries = self.load();
        merge(&mut entries, set);
        self.save(&entries)
    }
}

/// Merges one device's calibration results into an existing mapping.
///
/// Identity remaps (the physical control's own name equals the logical
/// key) are skipped. Keys recorded for other device names are preserved
/// untouched; repeated calibration of the same device overwrites its own
/// entries only.
pub fn merge(existing: &mut BTreeMap<String, String>, set: &CalibrationSet) {
    for entry in &set.entries {
        let logical_key = entry.logical.key();
        if entry.physical.name == logical_key {
            // Identity remap, nothing for the input layer to translate.
            continue;
        }
        existing.insert(
            format!("{}.{}", set.device_name, entry.physical.name),
            logical_key.to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DeviceId, PhysicalControl};
    use crate::wizard::{LogicalControl, MappingEntry};
    use std::collections::HashMap;

    fn set(device: &str, entries: Vec<(LogicalControl, PhysicalControl)>) -> CalibrationSet {
        CalibrationSet {
            device_name: device.to_string(),
            entries: entries
                .into_iter()
                .map(|(logical, physical)| MappingEntry { logical, physical })
                .collect(),
            biases: HashMap::new(),
        }
    }

    fn axis(name: &str) -> PhysicalControl {
        PhysicalControl::axis(DeviceId(0), 0, name)
    }

    fn button(name: &str) -> PhysicalControl {
        PhysicalControl::button(DeviceId(0), 0, name)
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_writes_device_scoped_keys() {
        let mut existing = BTreeMap::new();
        merge(
            &mut existing,
            &set(
                "PadX",
                vec![(LogicalControl::LeftTrigger, axis("ABS_RX"))],
            ),
        );
        assert_eq!(
            existing.get("PadX.ABS_RX").map(String::as_str),
            Some("LeftTrigger")
        );
    }

    #[test]
    fn test_merge_skips_identity_remaps() {
        let mut existing = BTreeMap::new();
        merge(
            &mut existing,
            &set(
                "PadX",
                vec![
                    (LogicalControl::L1, button("L1")),
                    (LogicalControl::Start, button("BTN_START")),
                ],
            ),
        );
        assert!(existing.get("PadX.L1").is_none());
        assert_eq!(
            existing.get("PadX.BTN_START").map(String::as_str),
            Some("Start")
        );
    }

    #[test]
    fn test_merge_preserves_other_devices() {
        let mut existing = BTreeMap::new();
        existing.insert("OtherPad.Button0".to_string(), "L1".to_string());

        merge(
            &mut existing,
            &set("PadX", vec![(LogicalControl::R1, button("BTN_TR"))]),
        );
        assert_eq!(
            existing.get("OtherPad.Button0").map(String::as_str),
            Some("L1")
        );
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn test_merge_empty_session_changes_nothing() {
        let mut existing = BTreeMap::new();
        existing.insert("OtherPad.Button0".to_string(), "L1".to_string());
        let before = existing.clone();

        merge(&mut existing, &set("PadX", vec![]));
        assert_eq!(existing, before);
    }

    #[test]
    fn test_merge_dpad_numeric_values() {
        let mut existing = BTreeMap::new();
        merge(
            &mut existing,
            &set(
                "PadX",
                vec![
                    (LogicalControl::DPadRight, button("BTN_DPAD_RIGHT")),
                    (LogicalControl::DPadUp, button("BTN_DPAD_UP")),
                ],
            ),
        );
        assert_eq!(
            existing.get("PadX.BTN_DPAD_RIGHT").map(String::as_str),
            Some("13")
        );
        assert_eq!(
            existing.get("PadX.BTN_DPAD_UP").map(String::as_str),
            Some("14")
        );
    }

    // ==================== Load / Save Tests ====================

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("missing.properties"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("cal.properties"));

        let mut entries = BTreeMap::new();
        entries.insert("PadX.ABS_RX".to_string(), "LeftTrigger".to_string());
        entries.insert("OtherPad.Button0".to_string(), "L1".to_string());

        store.save(&entries).unwrap();
        assert_eq!(store.load(), entries);

        // Saving the loaded mapping again must be idempotent.
        store.save(&store.load()).unwrap();
        assert_eq!(store.load(), entries);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("nested/deeper/cal.properties"));
        store.save(&BTreeMap::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocking_file = dir.path().join("blocker");
        fs::write(&blocking_file, b"").unwrap();

        // Parent "directory" is a regular file: creation must fail cleanly.
        let store = MappingStore::new(blocking_file.join("cal.properties"));
        let err = store.save(&BTreeMap::new()).unwrap_err();
        assert!(matches!(
            err,
            CalibratorError::MappingFileCreate { .. } | CalibratorError::MappingFileWrite { .. }
        ));
        let text = format!("{}", err);
        assert!(text.contains("calibration file"));
    }

    #[test]
    fn test_record_merges_into_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("cal.properties"));

        let mut seed = BTreeMap::new();
        seed.insert("OtherPad.Button0".to_string(), "L1".to_string());
        store.save(&seed).unwrap();

        store
            .record(&set(
                "PadX",
                vec![(LogicalControl::LeftTrigger, axis("ABS_RX"))],
            ))
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.get("OtherPad.Button0").map(String::as_str), Some("L1"));
        assert_eq!(
            loaded.get("PadX.ABS_RX").map(String::as_str),
            Some("LeftTrigger")
        );
    }

    #[test]
    fn test_record_nothing_new_preserves_file_equivalence() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("cal.properties"));

        let mut seed = BTreeMap::new();
        seed.insert("OtherPad.Button0".to_string(), "L1".to_string());
        store.save(&seed).unwrap();

        // Session that maps nothing new for PadX.
        store.record(&set("PadX", vec![])).unwrap();
        assert_eq!(store.load(), seed);
    }

    #[test]
    fn test_recalibration_overwrites_same_device_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::new(dir.path().join("cal.properties"));

        store
            .record(&set("PadX", vec![(LogicalControl::L1, button("BTN_TL"))]))
            .unwrap();
        store
            .record(&set("OtherPad", vec![(LogicalControl::L1, button("BTN_TL"))]))
            .unwrap();
        store
            .record(&set("PadX", vec![(LogicalControl::R1, button("BTN_TL"))]))
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.get("PadX.BTN_TL").map(String::as_str), Some("R1"));
        assert_eq!(
            loaded.get("OtherPad.BTN_TL").map(String::as_str),
            Some("L1")
        );
    }
}
