//! Parameter Publishing
//!
//! Control threads write through a [`ParameterHandle`]; the audio thread
//! reads whole [`FilterParameters`] values from its [`ParameterSnapshot`].
//! The two ends share a triple buffer, so the reader never waits and never
//! observes a half-written value.

use std::sync::Arc;

use parking_lot::Mutex;
use simple_eq_dsp::{FilterParameters, Slope};
use tracing::{debug, warn};
use triple_buffer::{triple_buffer, Input, Output};

use crate::error::EngineResult;
use crate::layout::{create_parameter_layout, ParameterId, ParameterLayout};

/// Producer side state, only ever locked by control threads
struct Publisher {
    input: Input<FilterParameters>,
    current: FilterParameters,
}

impl Publisher {
    fn publish(&mut self, params: FilterParameters) {
        self.current = params.clamped();
        self.input.write(self.current);
    }
}

/// Create a connected handle/snapshot pair seeded with `initial`
pub fn parameter_channel(initial: FilterParameters) -> (ParameterHandle, ParameterSnapshot) {
    let initial = initial.clamped();
    let (input, output) = triple_buffer(&initial);

    let handle = ParameterHandle {
        publisher: Arc::new(Mutex::new(Publisher {
            input,
            current: initial,
        })),
        layout: Arc::new(create_parameter_layout()),
    };

    (handle, ParameterSnapshot { output })
}

/// Control-side writer
///
/// Cheap to clone; every clone publishes into the same snapshot.
#[derive(Clone)]
pub struct ParameterHandle {
    publisher: Arc<Mutex<Publisher>>,
    layout: Arc<ParameterLayout>,
}

impl ParameterHandle {
    /// Last published parameters
    pub fn get(&self) -> FilterParameters {
        self.publisher.lock().current
    }

    /// Replace every parameter at once
    pub fn set(&self, params: FilterParameters) {
        self.publisher.lock().publish(params);
    }

    /// Edit several fields and publish them as one snapshot
    pub fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut FilterParameters),
    {
        let mut publisher = self.publisher.lock();
        let mut params = publisher.current;
        edit(&mut params);
        publisher.publish(params);
    }

    pub fn set_low_cut_freq(&self, hz: f32) {
        self.update(|p| p.low_cut_freq = hz);
    }

    pub fn set_high_cut_freq(&self, hz: f32) {
        self.update(|p| p.high_cut_freq = hz);
    }

    pub fn set_peak_freq(&self, hz: f32) {
        self.update(|p| p.peak_freq = hz);
    }

    pub fn set_peak_gain_db(&self, db: f32) {
        self.update(|p| p.peak_gain_db = db);
    }

    pub fn set_peak_quality(&self, q: f32) {
        self.update(|p| p.peak_quality = q);
    }

    pub fn set_low_cut_slope(&self, slope: Slope) {
        self.update(|p| p.low_cut_slope = slope);
    }

    pub fn set_high_cut_slope(&self, slope: Slope) {
        self.update(|p| p.high_cut_slope = slope);
    }

    /// Host automation entry point: set one parameter by id
    ///
    /// The value is clamped and snapped to the declared range.
    pub fn set_raw(&self, id: &str, raw: f32) -> EngineResult<()> {
        let (id, value) = self.layout.sanitise(id, raw).map_err(|e| {
            warn!("Rejected parameter write: {}", e);
            e
        })?;
        debug!("{} = {}", id, value);
        self.update(|p| id.write(p, value));
        Ok(())
    }

    /// Current raw value of one parameter by id
    pub fn get_raw(&self, id: &str) -> EngineResult<f32> {
        let id: ParameterId = id.parse()?;
        Ok(id.read(&self.get()))
    }

    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Whether the audio side has picked up the last publish
    pub fn is_consumed(&self) -> bool {
        self.publisher.lock().input.consumed()
    }
}

impl std::fmt::Debug for ParameterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterHandle")
            .field("current", &self.get())
            .finish()
    }
}

/// Audio-side reader
pub struct ParameterSnapshot {
    output: Output<FilterParameters>,
}

impl ParameterSnapshot {
    /// Most recently published parameters
    ///
    /// # Real-time Safety
    /// Wait-free: no locks, no allocation.
    #[inline]
    pub fn latest(&mut self) -> FilterParameters {
        *self.output.read()
    }

    /// Whether a publish happened since the last `latest()`
    #[inline]
    pub fn has_update(&self) -> bool {
        self.output.updated()
    }
}

impl std::fmt::Debug for ParameterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSnapshot")
            .field("has_update", &self.has_update())
            .finish()
    }
}
