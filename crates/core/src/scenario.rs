//! Reproducible description of a headless run.
//!
//! A [`Scenario`] names a frame source, the renderer config (including the
//! PRNG seed), how many ticks to run, and the pointer and keyboard events to
//! inject along the way. Replaying the same scenario gives bit-identical
//! frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RenderConfig;
use crate::error::TileError;

/// A click or tap delivered before the tick with index `tick` renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledImpact {
    pub tick: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub source: String,
    #[serde(default = "empty_object")]
    pub source_params: Value,
    #[serde(default)]
    pub config: RenderConfig,
    pub ticks: usize,
    #[serde(default)]
    pub impacts: Vec<ScheduledImpact>,
    /// Ticks before which playback is toggled between playing and paused.
    #[serde(default)]
    pub playback_toggles: Vec<usize>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Scenario {
    /// A scenario with default config and no events.
    pub fn new(source: &str, ticks: usize) -> Self {
        Self {
            source: source.to_string(),
            source_params: empty_object(),
            config: RenderConfig::default(),
            ticks,
            impacts: Vec::new(),
            playback_toggles: Vec::new(),
        }
    }

    /// Adds an impact before tick `tick`.
    pub fn with_impact(mut self, tick: usize, x: f64, y: f64) -> Self {
        self.impacts.push(ScheduledImpact { tick, x, y });
        self
    }

    /// Checks the config and that every event falls inside the run.
    pub fn validate(&self) -> Result<(), TileError> {
        self.config.validate()?;
        if self.ticks == 0 {
            return Err(TileError::InvalidScenario("ticks must be at least 1".into()));
        }
        if let Some(late) = self.impacts.iter().find(|i| i.tick >= self.ticks) {
            return Err(TileError::InvalidScenario(format!(
                "impact at tick {} is past the last tick {}",
                late.tick,
                self.ticks - 1
            )));
        }
        if let Some(late) = self.playback_toggles.iter().find(|&&t| t >= self.ticks) {
            return Err(TileError::InvalidScenario(format!(
                "playback toggle at tick {late} is past the last tick {}",
                self.ticks - 1
            )));
        }
        if let Some(bad) = self
            .impacts
            .iter()
            .find(|i| !i.x.is_finite() || !i.y.is_finite())
        {
            return Err(TileError::InvalidScenario(format!(
                "impact at tick {} has a non-finite coordinate",
                bad.tick
            )));
        }
        Ok(())
    }

    /// Impacts scheduled for `tick`, in file order.
    pub fn impacts_at(&self, tick: usize) -> impl Iterator<Item = &ScheduledImpact> {
        self.impacts.iter().filter(move |i| i.tick == tick)
    }

    /// Number of playback toggles scheduled for `tick`.
    pub fn toggles_at(&self, tick: usize) -> usize {
        self.playback_toggles.iter().filter(|&&t| t == tick).count()
    }
}
