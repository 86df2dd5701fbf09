//! Stereo Engine
//!
//! Owns one [`ChannelChain`] per channel and the audio end of the parameter
//! snapshot. Coefficients are recomputed at most once per block, and only
//! when the published parameters differ from the ones last applied.

use simple_eq_dsp::{
    AudioProcessor, ChainCoefficients, ChannelChain, FilterParameters, ProcessSpec,
};
use tracing::{debug, info, warn};

use crate::config::{StreamConfig, MAX_CHANNELS};
use crate::error::{EngineError, EngineResult};
use crate::params::{parameter_channel, ParameterHandle, ParameterSnapshot};
use crate::PLUGIN_NAME;

pub struct StereoEngine {
    snapshot: ParameterSnapshot,
    chains: Vec<ChannelChain>,
    spec: Option<ProcessSpec>,
    /// `None` forces a refresh on the next block
    applied: Option<FilterParameters>,
    coefficients: ChainCoefficients,
}

impl StereoEngine {
    /// Engine reading from an existing snapshot; unprepared until `prepare()`
    pub fn new(snapshot: ParameterSnapshot) -> Self {
        Self {
            snapshot,
            chains: Vec::with_capacity(MAX_CHANNELS),
            spec: None,
            applied: None,
            coefficients: ChainCoefficients::default(),
        }
    }

    /// Engine plus the handle that controls it
    pub fn with_parameters(initial: FilterParameters) -> (Self, ParameterHandle) {
        let (handle, snapshot) = parameter_channel(initial);
        (Self::new(snapshot), handle)
    }

    /// Allocate and zero one chain per channel for a new stream
    ///
    /// Must not run concurrently with `process_block()`. On error the engine
    /// is left unprepared and passes audio through.
    pub fn prepare(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
        num_channels: usize,
    ) -> EngineResult<()> {
        let config = StreamConfig::new(sample_rate, max_block_size, num_channels);
        if let Err(e) = config.validate() {
            warn!("Rejected stream configuration: {}", e);
            self.release();
            return Err(e);
        }

        let spec = config.to_process_spec();
        self.chains.clear();
        self.chains.resize_with(num_channels, ChannelChain::new);
        for chain in &mut self.chains {
            chain.prepare(&spec);
        }

        self.spec = Some(spec);
        self.applied = None;

        info!(
            "Prepared {} at {}Hz, {} channel(s), {} frames ({:.2}ms)",
            PLUGIN_NAME,
            sample_rate,
            num_channels,
            max_block_size,
            config.latency_ms()
        );
        Ok(())
    }

    /// Filter `num_samples` frames of planar audio in place
    ///
    /// `buffer[channel][sample]`. Channels beyond the prepared count are left
    /// untouched; before `prepare()` the whole buffer passes through.
    ///
    /// # Real-time Safety
    /// No allocations, no locks, no logging, never panics.
    pub fn process_block<B: AsMut<[f32]>>(&mut self, buffer: &mut [B], num_samples: usize) {
        let Some(spec) = self.spec else {
            return;
        };

        self.refresh_coefficients(spec.sample_rate);

        for (chain, channel) in self.chains.iter_mut().zip(buffer.iter_mut()) {
            let samples = channel.as_mut();
            let frames = num_samples.min(samples.len());
            chain.process_block(&mut samples[..frames]);
        }
    }

    #[inline]
    fn refresh_coefficients(&mut self, sample_rate: f32) {
        let latest = self.snapshot.latest();
        if self.applied == Some(latest) {
            return;
        }

        self.coefficients = ChainCoefficients::compute(sample_rate, &latest);
        for chain in &mut self.chains {
            chain.apply(&self.coefficients);
        }
        self.applied = Some(latest);
    }

    /// Clear filter memory, keeping coefficients and allocation
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            chain.reset();
        }
        debug!("Engine state reset");
    }

    /// Drop per-channel state. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.spec.take().is_some() {
            info!("Released {}", PLUGIN_NAME);
        }
        self.chains.clear();
        self.applied = None;
        self.coefficients = ChainCoefficients::default();
    }

    pub fn spec(&self) -> EngineResult<ProcessSpec> {
        self.spec.ok_or(EngineError::NotPrepared)
    }

    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    pub fn num_channels(&self) -> usize {
        self.chains.len()
    }

    /// Parameters behind the coefficients currently loaded
    pub fn applied_parameters(&self) -> Option<FilterParameters> {
        self.applied
    }

    pub fn coefficients(&self) -> &ChainCoefficients {
        &self.coefficients
    }

    pub fn chain(&self, channel: usize) -> Option<&ChannelChain> {
        self.chains.get(channel)
    }

    /// Combined magnitude response of the loaded coefficients
    pub fn magnitude_at(&self, frequency: f32) -> EngineResult<f64> {
        let spec = self.spec()?;
        let chain = self.chains.first().ok_or(EngineError::NotPrepared)?;
        Ok(chain.magnitude_at(frequency, spec.sample_rate))
    }
}

impl std::fmt::Debug for StereoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StereoEngine")
            .field("spec", &self.spec)
            .field("applied", &self.applied)
            .finish()
    }
}

impl AudioProcessor for StereoEngine {
    type Error = EngineError;

    fn prepare(&mut self, spec: &ProcessSpec) -> EngineResult<()> {
        StereoEngine::prepare(self, spec.sample_rate, spec.max_block_size, spec.num_channels)
    }

    fn process(&mut self, buffer: &mut [&mut [f32]]) {
        // Each channel is bounded by its own slice length
        self.process_block(buffer, usize::MAX);
    }

    fn reset(&mut self) {
        StereoEngine::reset(self);
    }

    fn release(&mut self) {
        StereoEngine::release(self);
    }

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use simple_eq_dsp::Slope;

    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * 0.5)
            .collect()
    }

    fn boosted() -> FilterParameters {
        FilterParameters {
            low_cut_freq: 80.0,
            high_cut_freq: 12000.0,
            peak_freq: 1000.0,
            peak_gain_db: 9.0,
            peak_quality: 2.0,
            low_cut_slope: Slope::Db24,
            high_cut_slope: Slope::Db48,
        }
    }

    /// Parameter tuple whose every field is derived from `m`
    fn marked(m: usize) -> FilterParameters {
        FilterParameters {
            low_cut_freq: 20.0 + m as f32,
            high_cut_freq: 20000.0 - 10.0 * m as f32,
            peak_freq: 500.0 + m as f32,
            peak_gain_db: -24.0 + (m % 97) as f32 * 0.5,
            peak_quality: 0.1 + (m % 99) as f32 * 0.1,
            low_cut_slope: Slope::from_index(m % 4),
            high_cut_slope: Slope::from_index((m / 4) % 4),
        }
    }

    #[test]
    fn test_unprepared_passes_through() {
        let (mut engine, _handle) = StereoEngine::with_parameters(boosted());
        let original = sine(440.0, 48000.0, 256);
        let mut buffer = vec![original.clone(), original.clone()];

        engine.process_block(&mut buffer, 256);
        assert_eq!(buffer[0], original);
        assert_eq!(buffer[1], original);
        assert!(matches!(engine.spec(), Err(EngineError::NotPrepared)));
        assert!(engine.applied_parameters().is_none());
    }

    #[test]
    fn test_prepare_rejects_bad_streams() {
        let (mut engine, _handle) = StereoEngine::with_parameters(FilterParameters::default());

        assert!(matches!(
            engine.prepare(48000.0, 512, 6),
            Err(EngineError::UnsupportedLayout { .. })
        ));
        assert!(matches!(
            engine.prepare(0.0, 512, 2),
            Err(EngineError::ConfigError(_))
        ));
        assert!(!engine.is_prepared());

        engine.prepare(44100.0, 512, 2).unwrap();
        assert_eq!(engine.spec().unwrap(), ProcessSpec::new(44100.0, 512, 2));

        // A failed re-prepare drops the previous stream
        assert!(engine.prepare(44100.0, 0, 2).is_err());
        assert!(!engine.is_prepared());
        assert_eq!(engine.num_channels(), 0);
    }

    #[test]
    fn test_first_block_applies_parameters() {
        let params = boosted();
        let (mut engine, _handle) = StereoEngine::with_parameters(params);
        engine.prepare(48000.0, 128, 2).unwrap();

        let mut buffer = vec![vec![0.0_f32; 128]; 2];
        engine.process_block(&mut buffer, 128);

        assert_eq!(engine.applied_parameters(), Some(params));
        assert_eq!(
            *engine.coefficients(),
            ChainCoefficients::compute(48000.0, &params)
        );
        let gain = 20.0 * engine.magnitude_at(1000.0).unwrap().log10();
        assert!((gain - 9.0).abs() < 0.5, "Expected ~9dB at the bell, got {}", gain);
    }

    #[test]
    fn test_output_matches_channel_chain() {
        let params = boosted();
        let (mut engine, _handle) = StereoEngine::with_parameters(params);
        engine.prepare(48000.0, 512, 1).unwrap();

        let input = sine(3000.0, 48000.0, 512);
        let mut buffer = [input.clone()];
        engine.process_block(&mut buffer, 512);

        let mut reference = ChannelChain::new();
        reference.apply(&ChainCoefficients::compute(48000.0, &params));
        let mut expected = input;
        reference.process_block(&mut expected);

        assert_eq!(buffer[0], expected);
    }

    #[test]
    fn test_handle_updates_reach_engine() {
        let (mut engine, handle) = StereoEngine::with_parameters(FilterParameters::default());
        engine.prepare(48000.0, 64, 2).unwrap();
        let mut buffer = vec![vec![0.0_f32; 64]; 2];

        engine.process_block(&mut buffer, 64);
        assert_eq!(engine.applied_parameters(), Some(FilterParameters::default()));

        handle.set_high_cut_slope(Slope::Db36);
        handle.set_peak_gain_db(-6.0);
        engine.process_block(&mut buffer, 64);

        let applied = engine.applied_parameters().unwrap();
        assert_eq!(applied, handle.get());
        for channel in 0..2 {
            let chain = engine.chain(channel).unwrap();
            assert_eq!(chain.high_cut().active_stages(), 3);
            assert_eq!(chain.peak().coefficients(), engine.coefficients().peak);
        }
    }

    #[test]
    fn test_channel_independence() {
        let (mut engine, _handle) = StereoEngine::with_parameters(boosted());
        engine.prepare(48000.0, 1024, 2).unwrap();

        let mut buffer = vec![sine(500.0, 48000.0, 1024), vec![0.0_f32; 1024]];
        engine.process_block(&mut buffer, 1024);

        assert!(buffer[0].iter().any(|&s| s != 0.0));
        assert!(buffer[1].iter().all(|&s| s == 0.0), "Left leaked into right");

        // Right chain state is still pristine: an impulse matches a fresh chain
        let mut impulse = vec![0.0_f32; 64];
        impulse[0] = 1.0;
        let mut buffer = vec![vec![0.0_f32; 64], impulse.clone()];
        engine.process_block(&mut buffer, 64);

        let mut fresh = ChannelChain::new();
        fresh.apply(&ChainCoefficients::compute(48000.0, &boosted()));
        fresh.process_block(&mut impulse);
        assert_eq!(buffer[1], impulse);
    }

    #[test]
    fn test_silence_preserved() {
        let params = FilterParameters {
            peak_gain_db: 24.0,
            peak_quality: 10.0,
            low_cut_slope: Slope::Db48,
            ..boosted()
        };
        let (mut engine, _handle) = StereoEngine::with_parameters(params);
        engine.prepare(96000.0, 4096, 2).unwrap();

        for size in [1, 32, 333, 4096] {
            let mut buffer = vec![vec![0.0_f32; size]; 2];
            engine.process_block(&mut buffer, size);
            assert!(buffer.iter().flatten().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_tail_settles_to_exact_silence() {
        let (mut engine, _handle) = StereoEngine::with_parameters(boosted());
        engine.prepare(48000.0, 4096, 2).unwrap();

        let mut buffer = vec![vec![0.0_f32; 4096]; 2];
        buffer[0][0] = 1.0;
        buffer[1][0] = -1.0;
        engine.process_block(&mut buffer, 4096);

        for _ in 0..100 {
            for channel in buffer.iter_mut() {
                channel.fill(0.0);
            }
            engine.process_block(&mut buffer, 4096);
            assert!(buffer.iter().flatten().all(|s| !s.is_subnormal()));
        }
        assert!(buffer.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_extra_channels_and_short_blocks() {
        let (mut engine, _handle) = StereoEngine::with_parameters(boosted());
        engine.prepare(48000.0, 256, 1).unwrap();

        let original = sine(200.0, 48000.0, 256);
        let mut buffer = vec![original.clone(), original.clone()];
        engine.process_block(&mut buffer, 100);

        assert_ne!(buffer[0][..100], original[..100]);
        // Frames past num_samples and channels past the prepared count
        assert_eq!(buffer[0][100..], original[100..]);
        assert_eq!(buffer[1], original);

        // num_samples beyond the slice length is bounded by the slice
        let mut short = [vec![0.25_f32; 8]];
        engine.process_block(&mut short, 1024);
    }

    #[test]
    fn test_reset_and_release() {
        let (mut engine, _handle) = StereoEngine::with_parameters(boosted());
        engine.prepare(48000.0, 64, 2).unwrap();

        let mut buffer = vec![vec![1.0_f32; 64]; 2];
        engine.process_block(&mut buffer, 64);

        engine.reset();
        let mut silence = vec![vec![0.0_f32; 64]; 2];
        engine.process_block(&mut silence, 64);
        assert!(silence.iter().flatten().all(|&s| s == 0.0));

        engine.release();
        engine.release();
        assert!(!engine.is_prepared());
        assert!(engine.chain(0).is_none());
        assert!(engine.magnitude_at(1000.0).is_err());
    }

    #[test]
    fn test_audio_processor_trait() {
        let (engine, _handle) = StereoEngine::with_parameters(boosted());
        let mut processor: Box<dyn AudioProcessor<Error = EngineError>> = Box::new(engine);
        assert_eq!(processor.name(), "SimpleEQ");

        processor.prepare(&ProcessSpec::new(48000.0, 128, 2)).unwrap();

        let mut left = sine(1000.0, 48000.0, 128);
        let mut right = left.clone();
        {
            let mut buffer: [&mut [f32]; 2] = [&mut left, &mut right];
            processor.process(&mut buffer);
        }
        assert_eq!(left, right);
        assert_ne!(left, sine(1000.0, 48000.0, 128));

        processor.reset();
        processor.release();
        processor.release();
    }

    #[test]
    fn test_no_tearing_under_concurrent_updates() {
        const SAMPLE_RATE: f32 = 48000.0;

        let (mut engine, handle) = StereoEngine::with_parameters(marked(0));
        engine.prepare(SAMPLE_RATE, 64, 2).unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let writer = {
            let handle = handle.clone();
            let running = Arc::clone(&running);
            std::thread::spawn(move || {
                let mut k = 0usize;
                while running.load(Ordering::Relaxed) {
                    handle.set(marked(k % 1000));
                    k += 1;
                }
                k
            })
        };

        let mut buffer = vec![vec![0.0_f32; 64]; 2];
        for block in 0..3000 {
            buffer[0].fill(if block % 2 == 0 { 0.1 } else { -0.1 });
            buffer[1].fill(0.05);
            engine.process_block(&mut buffer, 64);

            let applied = engine.applied_parameters().unwrap();
            let m = (applied.low_cut_freq - 20.0) as usize;
            assert_eq!(applied, marked(m), "Torn snapshot at block {}", block);

            let expected = ChainCoefficients::compute(SAMPLE_RATE, &applied);
            assert_eq!(*engine.coefficients(), expected);
            for channel in 0..2 {
                let chain = engine.chain(channel).unwrap();
                assert_eq!(chain.peak().coefficients(), expected.peak);
                assert_eq!(chain.low_cut().active_stages(), applied.low_cut_slope.order());
                assert_eq!(chain.high_cut().active_stages(), applied.high_cut_slope.order());
                assert_eq!(
                    chain.low_cut().stage(0).unwrap().coefficients(),
                    expected.low_cut
                );
                assert_eq!(
                    chain.high_cut().stage(0).unwrap().coefficients(),
                    expected.high_cut
                );
            }
            assert!(buffer.iter().flatten().all(|s| s.is_finite()));
        }

        running.store(false, Ordering::Relaxed);
        let published = writer.join().unwrap();
        assert!(published > 0);

        // Once the writer stops, the next block converges on its last value
        engine.process_block(&mut buffer, 64);
        assert_eq!(engine.applied_parameters(), Some(handle.get()));
    }
}
