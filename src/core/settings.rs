//! User settings persisted between visits.

use crate::input::AxisMask;
use crate::projection::ProjectionId;
use crate::Result;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Which drag axes rotate the flat map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSettings {
    pub rotation_x: bool,
    pub rotation_y: bool,
}

impl RotationSettings {
    pub fn mask(&self) -> AxisMask {
        AxisMask {
            x: self.rotation_x,
            y: self.rotation_y,
        }
    }
}

/// A rotation axis a settings checkbox controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
}

/// Stored as `{"currentProjection": "...", "rotation": {"rotationX": .., "rotationY": ..}}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    pub current_projection: ProjectionId,
    pub rotation: RotationSettings,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            current_projection: ProjectionId::NaturalEarth,
            rotation: RotationSettings {
                rotation_x: true,
                rotation_y: false,
            },
        }
    }
}

impl MapSettings {
    /// Read settings from `store`, falling back to the defaults when they are
    /// missing, unreadable or malformed
    pub fn load(store: &dyn SettingsStore, key: &str) -> Self {
        match store.get(key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("ignoring malformed settings under {key:?}: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("could not read settings under {key:?}: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn SettingsStore, key: &str) -> Result<()> {
        store.set(key, &serde_json::to_string(self)?)
    }

    pub fn set_axis(&mut self, axis: RotationAxis, enabled: bool) {
        match axis {
            RotationAxis::X => self.rotation.rotation_x = enabled,
            RotationAxis::Y => self.rotation.rotation_y = enabled,
        }
    }
}

/// Key-value storage for persisted settings
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Settings storage held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: FxHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
