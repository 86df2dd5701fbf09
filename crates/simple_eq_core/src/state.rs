//! Saved Plugin State
//!
//! A flat map of parameter id to raw value, serialized as JSON. Hosts store
//! the blob with the session and hand it back on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineResult;
use crate::params::ParameterHandle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(default)]
    pub parameters: BTreeMap<String, f32>,
}

impl SavedState {
    /// Record every declared parameter's current raw value
    pub fn capture(handle: &ParameterHandle) -> Self {
        let current = handle.get();
        let parameters = handle
            .layout()
            .parameters()
            .iter()
            .map(|spec| (spec.name.to_string(), spec.id.read(&current)))
            .collect();

        info!("Captured state");
        Self { parameters }
    }

    /// Publish the saved values as one snapshot
    ///
    /// Values are clamped and snapped to their declared ranges. Unknown ids
    /// are skipped; ids missing from the state keep their layout default.
    pub fn restore(&self, handle: &ParameterHandle) {
        let layout = handle.layout();
        let mut params = layout.defaults();
        let mut restored = 0usize;

        for (id, &raw) in &self.parameters {
            match layout.sanitise(id, raw) {
                Ok((id, value)) => {
                    id.write(&mut params, value);
                    restored += 1;
                }
                Err(e) => warn!("Skipping saved value: {}", e),
            }
        }

        handle.set(params);
        info!("Restored {} of {} parameters", restored, layout.len());
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
