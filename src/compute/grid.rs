//! The fixed evaluation grid.
use super::error::SimulationError;
use crate::model::TimeConfig;

/// Relative tolerance under which a regular point is treated as landing on
/// `end`.
const END_TOLERANCE: f64 = 1e-9;

/// Number of points `build` would produce, without allocating.
///
/// Regular points `start + i*dt` strictly before `end`, then `end` itself.
pub fn point_count(time: &TimeConfig) -> usize {
    let span = time.end - time.start;
    if !(span > 0.0) || !(time.dt > 0.0) {
        return 1;
    }
    let steps = span / time.dt;
    let mut regular = steps.ceil();
    // A span that is a whole number of steps (up to rounding) ends on a regular point.
    if (steps - steps.round()).abs() <= END_TOLERANCE * steps.max(1.0) {
        regular = steps.round().max(1.0);
    }
    if regular >= usize::MAX as f64 {
        return usize::MAX;
    }
    regular as usize + 1
}

/// Builds the grid, refusing anything above `limit` points before allocating.
pub fn build(time: &TimeConfig, limit: usize) -> Result<Vec<f64>, SimulationError> {
    let points = point_count(time);
    if points > limit {
        return Err(SimulationError::GridTooLarge { points, limit });
    }
    let mut grid: Vec<f64> = (0..points.saturating_sub(1)).map(|i| time.start + i as f64 * time.dt).collect();
    grid.push(time.end.max(time.start));
    Ok(grid)
}
