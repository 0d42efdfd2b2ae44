use crate::discretization::mesh::Grid;
use crate::error::{Result, SimulationError};
use crate::numerics::simulator::FluidSimulator;
use glam::DVec2;

/// Upper bound on `ceil(total_length / step_spacing)` accepted by
/// [`trace_streamline`].
pub const MAX_STREAMLINE_POINTS: usize = 1 << 24;

/// Advect a massless tracer through the frozen velocity field of `grid`.
///
/// Forward Euler with fixed arc-length steps: at each iteration the tracer
/// reads the velocity of its nearest cell, moves `step_spacing` along that
/// direction and records the new position. Runs for
/// `ceil(total_length / step_spacing)` iterations; the start point is not
/// part of the result.
///
/// A tracer sitting in a cell with zero or non-finite velocity can never
/// move again, so tracing stops there and fewer points are returned.
/// Requests needing more than [`MAX_STREAMLINE_POINTS`] iterations are
/// rejected.
pub fn trace_streamline<G: Grid>(
    grid: &G,
    start: DVec2,
    total_length: f64,
    step_spacing: f64,
) -> Result<Vec<DVec2>> {
    let ratio = total_length / step_spacing;
    let valid = start.is_finite()
        && total_length.is_finite()
        && total_length >= 0.0
        && step_spacing.is_finite()
        && step_spacing > 0.0
        && ratio.ceil() <= MAX_STREAMLINE_POINTS as f64;
    if !valid {
        return Err(SimulationError::InvalidStreamline {
            total_length,
            step_spacing,
        });
    }

    let iterations = ratio.ceil() as usize;
    let mut points = Vec::new();
    let mut position = start;

    for _ in 0..iterations {
        let cell = grid.nearest_cell(position).ok_or(SimulationError::EmptyGrid)?;
        // Scaled by the largest component so tiny and huge speeds normalise.
        let velocity = grid.volume(cell).velocity();
        let Some(direction) = (velocity / velocity.abs().max_element()).try_normalize() else {
            log::trace!(
                "streamline stalled at {position:?} (v = {velocity}) after {} points",
                points.len()
            );
            break;
        };
        position += direction * step_spacing;
        points.push(position);
    }

    Ok(points)
}

impl<G: Grid> FluidSimulator<G> {
    /// See [`trace_streamline`].
    pub fn trace_streamline(
        &self,
        start: DVec2,
        total_length: f64,
        step_spacing: f64,
    ) -> Result<Vec<DVec2>> {
        trace_streamline(self.grid(), start, total_length, step_spacing)
    }
}
