//! Parsers for event flags that clap can't express directly.

use tileburst_core::ScheduledImpact;

/// Parses `X,Y@T` into an impact at surface point (X, Y) before tick T.
pub fn parse_impact(s: &str) -> Result<ScheduledImpact, String> {
    let (point, tick) = s
        .split_once('@')
        .ok_or_else(|| format!("expected X,Y@TICK, got '{s}'"))?;
    let (x, y) = point
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y before '@', got '{point}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("impact coordinates must be finite, got '{point}'"));
    }
    let tick: usize = tick
        .trim()
        .parse()
        .map_err(|e| format!("bad tick '{tick}': {e}"))?;
    Ok(ScheduledImpact { tick, x, y })
}
