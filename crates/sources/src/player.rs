//! Headless replay of a [`Scenario`].

use tileburst_core::error::TileError;
use tileburst_core::renderer::FrameRenderer;
use tileburst_core::scenario::Scenario;
use tileburst_core::surface::Surface;

use crate::Feed;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub ticks: usize,
    pub impacts: usize,
    /// Sum over all impacts of the tiles each one kicked.
    pub tiles_hit: usize,
    /// Tiles in the grid at the end; 0 if the source never became ready.
    pub tiles: usize,
    /// Every tile was back at rest after the last tick.
    pub settled: bool,
}

/// Runs `scenario` tick by tick, handing each finished frame to `on_frame`.
///
/// Before each tick the scheduled playback toggles and impacts for that tick
/// are applied, in that order. The feed advances after the frame is handed
/// out. An error from `on_frame` stops the run.
pub fn play<F>(scenario: &Scenario, mut on_frame: F) -> Result<PlaySummary, TileError>
where
    F: FnMut(usize, &Surface) -> Result<(), TileError>,
{
    scenario.validate()?;
    let config = scenario.config.clone();
    let mut feed = Feed::from_name(&scenario.source, config.seed, &scenario.source_params)?;
    let mut surface = Surface::new(config.surface_width, config.surface_height)?;
    let mut renderer = FrameRenderer::new(config)?;
    let mut summary = PlaySummary {
        ticks: scenario.ticks,
        ..PlaySummary::default()
    };

    log::info!(
        "playing '{}' for {} ticks in {} mode",
        scenario.source,
        scenario.ticks,
        renderer.mode()
    );

    for tick in 0..scenario.ticks {
        for _ in 0..scenario.toggles_at(tick) {
            let playing = feed.toggle_playback();
            log::debug!("tick {tick}: playback {}", if playing { "resumed" } else { "paused" });
        }
        for impact in scenario.impacts_at(tick) {
            summary.impacts += 1;
            summary.tiles_hit += renderer.impact(impact.x, impact.y);
        }

        let report = renderer.tick(&mut feed, &mut surface)?;
        if report.grid_built {
            log::debug!("tick {tick}: grid built");
        }
        on_frame(tick, &surface)?;
        feed.advance();
    }

    if let Some(field) = renderer.field() {
        summary.tiles = field.len();
        summary.settled = field.is_settled();
    }
    log::info!(
        "finished: {} impacts, {} tiles hit, settled={}",
        summary.impacts,
        summary.tiles_hit,
        summary.settled
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn small(source: &str, ticks: usize) -> Scenario {
        let mut s = Scenario::new(source, ticks);
        s.source_params = json!({"width": 64, "height": 48});
        s.config.surface_width = 200;
        s.config.surface_height = 120;
        s
    }

    #[test]
    fn quiet_run_builds_grid_and_stays_settled() {
        let mut frames = 0;
        let summary = play(&small("bars", 3), |_, _| {
            frames += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(frames, 3);
        assert_eq!(summary.tiles, 4);
        assert!(summary.settled);
        assert_eq!(summary.impacts, 0);
    }

    #[test]
    fn impact_before_first_frame_hits_nothing() {
        let scenario = small("checker", 2).with_impact(0, 100.0, 60.0);
        let summary = play(&scenario, |_, _| Ok(())).unwrap();
        assert_eq!(summary.impacts, 1);
        assert_eq!(summary.tiles_hit, 0);
    }

    #[test]
    fn impact_after_grid_kicks_tiles() {
        let scenario = small("checker", 2).with_impact(1, 100.0, 60.0);
        let summary = play(&scenario, |_, _| Ok(())).unwrap();
        assert_eq!(summary.tiles_hit, 4);
        assert!(!summary.settled);
    }

    #[test]
    fn warmup_delays_grid() {
        let mut scenario = small("bars", 2);
        scenario.source_params = json!({"width": 64, "height": 48, "warmup": 5});
        let summary = play(&scenario, |_, surface| {
            assert!(surface.pixels().as_rgba().iter().all(|&b| b == 0));
            Ok(())
        })
        .unwrap();
        assert_eq!(summary.tiles, 0);
        assert!(!summary.settled);
    }

    #[test]
    fn same_scenario_replays_identically() {
        let scenario = small("plasma", 6)
            .with_impact(1, 90.0, 50.0)
            .with_impact(3, 120.0, 70.0);
        let capture = |s: &Scenario| {
            let mut last = None;
            play(s, |_, surface| {
                last = Some(surface.pixels().clone());
                Ok(())
            })
            .unwrap();
            last
        };
        assert_eq!(capture(&scenario), capture(&scenario));
    }

    #[test]
    fn frame_callback_error_stops_run() {
        let mut seen = 0;
        let result = play(&small("bars", 5), |tick, _| {
            seen += 1;
            if tick == 1 {
                Err(TileError::Io("disk full".into()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(TileError::Io(_))));
        assert_eq!(seen, 2);
    }

    #[test]
    fn invalid_scenario_is_rejected_before_running() {
        let scenario = small("bars", 2).with_impact(9, 0.0, 0.0);
        let result = play(&scenario, |_, _| Ok(()));
        assert!(matches!(result, Err(TileError::InvalidScenario(_))));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = play(&small("webcam", 1), |_, _| Ok(()));
        assert!(matches!(result, Err(TileError::UnknownSource(_))));
    }
}
