//! Procedural ceiling light flicker.
//!
//! The controller is a small state machine: lights warm up in batches, then the
//! rig idles at a steady baseline and occasionally falls into a flicker episode.
//! Episode noise is resampled on a fixed sub-step so the flicker frequency does
//! not depend on the frame rate.

use crate::config::FlickerConfig;
use engine_core::{Intensity, LightRig};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

/// Lights switched on by each warm-up batch, in layout order.
pub const WARMUP_BATCHES: [usize; 4] = [6, 6, 7, 6];
/// Warm-up time already accumulated at startup.
const WARMUP_HEAD_START: f32 = 0.2;
/// Minimum time between two episode trigger draws.
const CHECK_INTERVAL: f32 = 1.0 / 60.0;

pub const STEADY_AMBIENT: f32 = 0.35;
pub const STEADY_LIGHT: Intensity = Intensity::new(0.05, 0.8, 1.0);
/// Ambient granted to the focal light of a severe episode.
const FOCAL_AMBIENT: f32 = 0.2;
const AMBIENT_NOISE_SCALE: f32 = 0.5;
const LIGHT_NOISE_SCALE: f32 = 0.075;
const CEILING_NOISE_SCALE: f32 = 8.0;

#[derive(Debug, Error)]
pub enum FlickerError {
    #[error("invalid flicker distribution: {0}")]
    Distribution(#[from] NormalError),
    #[error("flicker noise standard deviation must be non-negative, got {0}")]
    StdDev(f32),
    #[error("flicker sub-step must be positive, got {0}")]
    SubStep(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlickerProfile {
    /// Deep ambient drop, ceiling nearly dark, one focal light pulsing.
    Severe,
    Mild,
}

impl FlickerProfile {
    /// (global ambient, per-light ambient, ceiling emissive) the noise is subtracted from.
    fn bases(self) -> (f32, f32, f32) {
        match self {
            Self::Severe => (0.02, 0.005, 0.35),
            Self::Mild => (STEADY_AMBIENT, 0.05, 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlickerEpisode {
    pub profile: FlickerProfile,
    /// Seconds until the episode ends.
    pub remaining: f32,
    pub focal_light: usize,
    pulse_timer: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlickerPhase {
    WarmingUp {
        /// Batches already switched on.
        batch: usize,
        timer: f32,
    },
    Steady {
        check_timer: f32,
    },
    Episode(FlickerEpisode),
}

pub struct LightingFlickerController {
    config: FlickerConfig,
    phase: FlickerPhase,
    noise: Normal<f32>,
    rng: StdRng,
    /// Episode time not yet consumed by a sub-step.
    accumulator: f32,
}

impl LightingFlickerController {
    pub fn new(config: &FlickerConfig) -> Result<Self, FlickerError> {
        if config.substep.is_nan() || config.substep <= 0.0 {
            return Err(FlickerError::SubStep(config.substep));
        }
        // Normal::new accepts a negative deviation as a mirrored distribution.
        if config.std_dev.is_nan() || config.std_dev < 0.0 {
            return Err(FlickerError::StdDev(config.std_dev));
        }
        let noise = Normal::new(config.mean, config.std_dev)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config: config.clone(),
            phase: FlickerPhase::WarmingUp {
                batch: 0,
                timer: WARMUP_HEAD_START,
            },
            noise,
            rng,
            accumulator: 0.0,
        })
    }

    pub fn phase(&self) -> &FlickerPhase {
        &self.phase
    }

    pub fn is_warming_up(&self) -> bool {
        matches!(self.phase, FlickerPhase::WarmingUp { .. })
    }

    /// Advance by one frame of `dt` seconds, rewriting the rig's intensities.
    /// Returns the number of noise sub-steps run this frame.
    pub fn advance(&mut self, dt: f32, rig: &mut LightRig) -> usize {
        let dt = dt.max(0.0);
        match self.phase.clone() {
            FlickerPhase::WarmingUp { batch, timer } => {
                self.warm_up(batch, timer + dt, rig);
                0
            }
            FlickerPhase::Steady { check_timer } => {
                apply_steady(rig);
                self.check_for_episode(check_timer + dt, rig.len());
                0
            }
            FlickerPhase::Episode(episode) => self.run_episode(episode, dt, rig),
        }
    }

    fn warm_up(&mut self, mut batch: usize, mut timer: f32, rig: &mut LightRig) {
        rig.ceiling_flicker = 1.0;
        // Carry the overshoot so a long frame can switch on more than one batch.
        while batch < WARMUP_BATCHES.len() && timer > self.config.warmup_interval {
            let start: usize = WARMUP_BATCHES[..batch].iter().sum();
            let end = (start + WARMUP_BATCHES[batch]).min(rig.len());
            for light in rig.lights.get_mut(start..end).unwrap_or_default() {
                light.intensity = STEADY_LIGHT;
            }
            batch += 1;
            timer -= self.config.warmup_interval;
            log::info!("Lights warming up: batch {}/{}", batch, WARMUP_BATCHES.len());
        }
        self.phase = if batch >= WARMUP_BATCHES.len() {
            FlickerPhase::Steady { check_timer: 0.0 }
        } else {
            FlickerPhase::WarmingUp { batch, timer }
        };
    }

    fn check_for_episode(&mut self, check_timer: f32, light_count: usize) {
        if check_timer < CHECK_INTERVAL || light_count == 0 {
            self.phase = FlickerPhase::Steady { check_timer };
            return;
        }
        self.phase = FlickerPhase::Steady { check_timer: 0.0 };

        let duration = (self.sample() - self.config.trigger_threshold) * self.config.duration_scale;
        if duration <= 0.0 {
            return;
        }
        let focal_light = self.rng.gen_range(0..light_count);
        let (profile, remaining) = if self.sample() > self.config.severe_threshold {
            (FlickerProfile::Severe, (duration + 0.5) * 1.8)
        } else {
            (FlickerProfile::Mild, duration)
        };
        log::debug!(
            "{:?} flicker episode for {:.2}s around light {}",
            profile,
            remaining,
            focal_light
        );
        self.accumulator = 0.0;
        self.phase = FlickerPhase::Episode(FlickerEpisode {
            profile,
            remaining,
            focal_light,
            pulse_timer: 0.0,
        });
    }

    fn run_episode(&mut self, mut episode: FlickerEpisode, dt: f32, rig: &mut LightRig) -> usize {
        let substep = self.config.substep;
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= substep {
            self.accumulator -= substep;
            self.flicker_substep(&mut episode, rig);
            substeps += 1;
        }

        episode.remaining -= dt;
        if episode.remaining <= 0.0 {
            log::debug!("Flicker episode over");
            apply_steady(rig);
            self.accumulator = 0.0;
            self.phase = FlickerPhase::Steady { check_timer: 0.0 };
        } else {
            self.phase = FlickerPhase::Episode(episode);
        }
        substeps
    }

    fn flicker_substep(&mut self, episode: &mut FlickerEpisode, rig: &mut LightRig) {
        let (ambient_base, light_base, ceiling_base) = episode.profile.bases();
        let severe = episode.profile == FlickerProfile::Severe;

        let n = self.sample().abs();
        rig.ambient.ambient = ambient_base - n * AMBIENT_NOISE_SCALE;
        for i in 0..rig.len() {
            if severe && i == episode.focal_light {
                continue;
            }
            let ambient = light_base - self.sample().abs() * LIGHT_NOISE_SCALE;
            let light = &mut rig.lights[i].intensity;
            light.ambient = ambient;
            light.diffuse = 0.0;
        }
        rig.ceiling_flicker = (ceiling_base - n * CEILING_NOISE_SCALE).max(0.0);

        if severe {
            episode.pulse_timer += self.config.substep;
            if episode.pulse_timer > self.config.pulse_interval {
                episode.pulse_timer = 0.0;
                if self.sample() > 0.0 && !rig.is_empty() {
                    episode.focal_light = self.rng.gen_range(0..rig.len());
                    rig.lights[episode.focal_light].intensity.ambient = FOCAL_AMBIENT;
                }
            }
        }
    }

    fn sample(&mut self) -> f32 {
        self.noise.sample(&mut self.rng)
    }
}

/// Baseline intensities between episodes.
fn apply_steady(rig: &mut LightRig) {
    rig.ambient.ambient = STEADY_AMBIENT;
    for light in &mut rig.lights {
        light.intensity.ambient = STEADY_LIGHT.ambient;
        light.intensity.diffuse = STEADY_LIGHT.diffuse;
    }
    rig.ceiling_flicker = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{initial_light_rig, LIGHT_OFF};
    use engine_core::LIGHT_COUNT;

    fn seeded(seed: u64) -> LightingFlickerController {
        LightingFlickerController::new(&FlickerConfig {
            seed: Some(seed),
            ..Default::default()
        })
        .expect("valid config")
    }

    fn warmed_up(seed: u64) -> (LightingFlickerController, LightRig) {
        let mut controller = seeded(seed);
        let mut rig = initial_light_rig();
        controller.advance(10.0, &mut rig);
        assert!(!controller.is_warming_up());
        (controller, rig)
    }

    /// Advance in small frames until an episode of `profile` starts.
    fn until_episode(
        controller: &mut LightingFlickerController,
        rig: &mut LightRig,
        profile: FlickerProfile,
    ) -> FlickerEpisode {
        for _ in 0..200_000 {
            controller.advance(0.02, rig);
            if let FlickerPhase::Episode(episode) = controller.phase() {
                if episode.profile == profile {
                    return episode.clone();
                }
            }
        }
        panic!("no {profile:?} episode started");
    }

    #[test]
    fn invalid_config_is_rejected() {
        for std_dev in [-1.0, f32::NAN] {
            let config = FlickerConfig {
                std_dev,
                ..Default::default()
            };
            assert!(matches!(
                LightingFlickerController::new(&config),
                Err(FlickerError::StdDev(_))
            ));
        }
        let config = FlickerConfig {
            std_dev: 0.0,
            ..Default::default()
        };
        assert!(LightingFlickerController::new(&config).is_ok());
        let config = FlickerConfig {
            substep: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            LightingFlickerController::new(&config),
            Err(FlickerError::SubStep(_))
        ));
    }

    #[test]
    fn warm_up_switches_on_batches_in_order() {
        let mut controller = seeded(1);
        let mut rig = initial_light_rig();

        // 0.2s head start: the first batch lands once 1.3s more have passed.
        controller.advance(1.2, &mut rig);
        assert!(rig.lights.iter().all(|l| l.intensity == LIGHT_OFF));

        controller.advance(0.2, &mut rig);
        assert!(rig.lights[..6].iter().all(|l| l.intensity == STEADY_LIGHT));
        assert!(rig.lights[6..].iter().all(|l| l.intensity == LIGHT_OFF));

        controller.advance(1.6, &mut rig);
        assert!(rig.lights[..12].iter().all(|l| l.intensity == STEADY_LIGHT));
        assert!(matches!(
            controller.phase(),
            FlickerPhase::WarmingUp { batch: 2, .. }
        ));
    }

    #[test]
    fn all_lights_steady_after_four_intervals() {
        for frame_dt in [1.0 / 144.0, 1.0 / 60.0, 0.05, 0.1, 0.4] {
            let mut controller = seeded(2);
            let mut rig = initial_light_rig();
            let mut elapsed = 0.0;
            while controller.is_warming_up() {
                controller.advance(frame_dt, &mut rig);
                elapsed += frame_dt;
            }
            // Head start of 0.2s: the last batch lands once the total passes 6s.
            assert!(elapsed > 5.7 && elapsed < 5.8 + frame_dt + 1e-3, "dt {frame_dt}: {elapsed}");
            assert_eq!(rig.len(), LIGHT_COUNT);
            for light in &rig.lights {
                assert_eq!(light.intensity.ambient, 0.05);
                assert_eq!(light.intensity.diffuse, 0.8);
            }
        }
    }

    #[test]
    fn steady_rig_holds_baseline() {
        let (mut controller, mut rig) = warmed_up(3);
        // A check needs at least 1/60s; a tiny frame cannot start an episode.
        controller.advance(0.001, &mut rig);
        assert!(matches!(controller.phase(), FlickerPhase::Steady { .. }));
        assert_eq!(rig.ambient.ambient, STEADY_AMBIENT);
        assert_eq!(rig.ceiling_flicker, 1.0);
    }

    #[test]
    fn sixtieth_of_a_second_triggers_a_check() {
        for seed in 0..20 {
            let (mut controller, mut rig) = warmed_up(seed);
            controller.advance(1.0 / 60.0, &mut rig);
            match controller.phase() {
                FlickerPhase::Steady { check_timer } => assert_eq!(*check_timer, 0.0, "seed {seed}"),
                FlickerPhase::Episode(_) => {}
                phase => panic!("seed {seed}: unexpected {phase:?}"),
            }
        }
    }

    #[test]
    fn substep_count_follows_frame_time() {
        let (mut controller, mut rig) = warmed_up(4);
        until_episode(&mut controller, &mut rig, FlickerProfile::Severe);
        if let FlickerPhase::Episode(episode) = &mut controller.phase {
            episode.remaining = 100.0;
        }
        for frame_dt in [0.005, 0.035, 0.105] {
            controller.accumulator = 0.0;
            let substeps = controller.advance(frame_dt, &mut rig);
            assert_eq!(substeps, (frame_dt / 0.01_f32).floor() as usize, "dt {frame_dt}");
        }
    }

    #[test]
    fn severe_episode_darkens_rig() {
        let (mut controller, mut rig) = warmed_up(5);
        let episode = until_episode(&mut controller, &mut rig, FlickerProfile::Severe);
        if let FlickerPhase::Episode(e) = &mut controller.phase {
            e.remaining = 100.0;
        }
        controller.advance(0.05, &mut rig);

        assert!(rig.ambient.ambient <= 0.02);
        assert!(rig.ceiling_flicker <= 0.35);
        for (i, light) in rig.lights.iter().enumerate() {
            if i != episode.focal_light {
                assert!(light.intensity.ambient <= 0.005);
                assert_eq!(light.intensity.diffuse, 0.0);
            }
        }
    }

    #[test]
    fn mild_episode_keeps_ambient_near_baseline() {
        let (mut controller, mut rig) = warmed_up(6);
        until_episode(&mut controller, &mut rig, FlickerProfile::Mild);
        if let FlickerPhase::Episode(e) = &mut controller.phase {
            e.remaining = 100.0;
        }
        controller.advance(0.05, &mut rig);
        assert!(rig.ambient.ambient <= STEADY_AMBIENT && rig.ambient.ambient > 0.02);
        assert!(rig.lights.iter().all(|l| l.intensity.ambient <= 0.05));
    }

    #[test]
    fn episode_ends_back_at_baseline() {
        let (mut controller, mut rig) = warmed_up(7);
        let episode = until_episode(&mut controller, &mut rig, FlickerProfile::Severe);
        controller.advance(episode.remaining + 0.01, &mut rig);
        assert_eq!(controller.phase(), &FlickerPhase::Steady { check_timer: 0.0 });
        assert_eq!(rig.ambient.ambient, STEADY_AMBIENT);
        assert_eq!(rig.ceiling_flicker, 1.0);
        assert!(rig
            .lights
            .iter()
            .all(|l| l.intensity.ambient == 0.05 && l.intensity.diffuse == 0.8));
    }

    #[test]
    fn same_seed_same_flicker() {
        let (mut a, mut rig_a) = warmed_up(8);
        let (mut b, mut rig_b) = warmed_up(8);
        for _ in 0..2000 {
            a.advance(1.0 / 60.0, &mut rig_a);
            b.advance(1.0 / 60.0, &mut rig_b);
        }
        assert_eq!(rig_a, rig_b);
        assert_eq!(a.phase(), b.phase());
    }
}
