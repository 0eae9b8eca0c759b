//! Equipment catalogue and the icon registry.
//!
//! Object elements refer to their icon by a string `subType` key. The
//! catalogue below is the set of keys the editor offers; documents may still
//! carry keys outside it, which simply draw nothing.

#[cfg(test)]
#[path = "icons_test.rs"]
mod icons_test;

use std::collections::HashMap;

use crate::doc::Vision;

/// Security equipment that can be placed on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Equipment {
    Camera,
    MotionSensor,
    OpenSensor,
    Siren,
    Dvr,
    AlarmPanel,
    RemoteControl,
    Keypad,
}

impl Equipment {
    pub const ALL: [Self; 8] = [
        Self::Camera,
        Self::MotionSensor,
        Self::OpenSensor,
        Self::Siren,
        Self::Dvr,
        Self::AlarmPanel,
        Self::RemoteControl,
        Self::Keypad,
    ];

    /// The `subType` key stored on object elements.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::MotionSensor => "motion_sensor",
            Self::OpenSensor => "open_sensor",
            Self::Siren => "siren",
            Self::Dvr => "dvr",
            Self::AlarmPanel => "alarm_panel",
            Self::RemoteControl => "remote_control",
            Self::Keypad => "keypad",
        }
    }

    /// Human-readable title used in the export legend.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::MotionSensor => "Motion Sensor",
            Self::OpenSensor => "Opening Sensor",
            Self::Siren => "Siren",
            Self::Dvr => "DVR",
            Self::AlarmPanel => "Alarm Panel",
            Self::RemoteControl => "Remote Control",
            Self::Keypad => "Keypad",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }

    /// Field of view given to newly placed equipment of this type.
    #[must_use]
    pub fn default_vision(self) -> Option<Vision> {
        match self {
            Self::Camera => Some(Vision { range: 150.0, angle: 60.0 }),
            Self::MotionSensor => Some(Vision { range: 120.0, angle: 90.0 }),
            _ => None,
        }
    }
}

/// Title for an arbitrary `subType` key, falling back to the key itself.
#[must_use]
pub fn title_for(key: &str) -> &str {
    Equipment::from_key(key).map_or(key, |e| e.title())
}

/// Maps `subType` keys to loaded image handles.
///
/// Generic over the handle type so the browser build stores
/// `HtmlImageElement`s while tests and the CLI use plain markers.
#[derive(Debug, Clone)]
pub struct IconRegistry<H> {
    icons: HashMap<String, H>,
}

impl<H> Default for IconRegistry<H> {
    fn default() -> Self {
        Self { icons: HashMap::new() }
    }
}

impl<H> IconRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the image for `key`.
    pub fn insert(&mut self, key: impl Into<String>, handle: H) {
        self.icons.insert(key.into(), handle);
    }

    /// Look up an image. A missing entry means "skip drawing".
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&H> {
        self.icons.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
