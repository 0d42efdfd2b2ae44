use crate::discretization::mesh::Direction;
use crate::error::{Result, SimulationError};
use crate::physics::FluidProperties;
use glam::DVec2;

/// Unit density normalising the acoustic pressure response.
pub const REFERENCE_DENSITY: f64 = 1.0;

/// A single control volume: local pressure and velocity plus the staged
/// values for the next time step.
///
/// Conventions: "top" is +y, "right" is +x, `velocity = (vx, vy)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlVolume {
    properties: FluidProperties,
    pressure: f64,
    velocity: DVec2,
    pending_pressure: f64,
    pending_velocity: DVec2,
}

impl Default for ControlVolume {
    fn default() -> Self {
        Self::at_rest(FluidProperties::default())
    }
}

/// A neighbouring volume together with its absolute distance along the
/// stencil axis.
#[derive(Clone, Copy, Debug)]
pub struct Neighbour<'a> {
    pub volume: &'a ControlVolume,
    pub distance: f64,
}

impl<'a> Neighbour<'a> {
    pub fn new(volume: &'a ControlVolume, distance: f64) -> Self {
        Self { volume, distance }
    }
}

/// The four neighbours read to update one volume.
#[derive(Clone, Copy, Debug)]
pub struct Stencil<'a> {
    pub left: Neighbour<'a>,
    pub right: Neighbour<'a>,
    pub top: Neighbour<'a>,
    pub bottom: Neighbour<'a>,
}

impl<'a> Stencil<'a> {
    pub fn get(&self, direction: Direction) -> Neighbour<'a> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
        }
    }

    fn validate(&self) -> Result<()> {
        for direction in Direction::ALL {
            let distance = self.get(direction).distance;
            if !(distance.is_finite() && distance > 0.0) {
                return Err(SimulationError::NonPositiveDistance {
                    direction,
                    distance,
                });
            }
        }
        Ok(())
    }
}

/// Next-step state produced by [`ControlVolume::compute_update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateUpdate {
    pub pressure: f64,
    pub velocity: DVec2,
}

impl StateUpdate {
    pub fn is_finite(&self) -> bool {
        self.pressure.is_finite() && self.velocity.is_finite()
    }
}

impl ControlVolume {
    pub fn new(pressure: f64, velocity: DVec2, properties: FluidProperties) -> Self {
        Self {
            properties,
            pressure,
            velocity,
            pending_pressure: pressure,
            pending_velocity: velocity,
        }
    }

    /// Zero pressure and velocity. Also used as the static wall ghost cell.
    pub fn at_rest(properties: FluidProperties) -> Self {
        Self::new(0.0, DVec2::ZERO, properties)
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: DVec2) {
        self.velocity = velocity;
    }

    pub fn properties(&self) -> FluidProperties {
        self.properties
    }

    pub(crate) fn assign_properties(&mut self, properties: FluidProperties) {
        self.properties = properties;
    }

    pub fn is_at_rest(&self) -> bool {
        self.pressure == 0.0 && self.velocity == DVec2::ZERO
    }

    /// Explicit forward step of the momentum and pressure equations.
    ///
    /// Derivatives are one-sided towards the right and top neighbours; second
    /// derivatives use the three-point stencil on each axis:
    ///
    /// ```text
    /// v' = v - dt (dvx/dx + dvy/dy) v - (dt / rho) grad p + dt nu (d2v/dx2 + d2v/dy2)
    /// p' = p - dt c^2 (dvx/dx + dvy/dy) rho_ref
    /// ```
    ///
    /// Reads only `self` and the stencil's live values; nothing is mutated.
    pub fn compute_update(&self, stencil: &Stencil, dt: f64) -> Result<StateUpdate> {
        stencil.validate()?;

        let Stencil {
            left,
            right,
            top,
            bottom,
        } = *stencil;
        let v = self.velocity;
        let p = self.pressure;

        let vx_dot_x = (right.volume.velocity.x - v.x) / right.distance;
        let vy_dot_y = (top.volume.velocity.y - v.y) / top.distance;
        let divergence = vx_dot_x + vy_dot_y;

        let grad_p = DVec2::new(
            (right.volume.pressure - p) / right.distance,
            (top.volume.pressure - p) / top.distance,
        );

        let v_dotdot_x = (left.volume.velocity - 2.0 * v + right.volume.velocity)
            / (left.distance * right.distance);
        let v_dotdot_y = (bottom.volume.velocity - 2.0 * v + top.volume.velocity)
            / (bottom.distance * top.distance);

        let FluidProperties {
            density,
            viscosity,
            speed_of_sound,
        } = self.properties;

        let velocity = v - dt * divergence * v - (dt / density) * grad_p
            + dt * viscosity * (v_dotdot_x + v_dotdot_y);
        let pressure =
            p - dt * speed_of_sound * speed_of_sound * divergence * REFERENCE_DENSITY;

        Ok(StateUpdate { pressure, velocity })
    }

    /// Copy live values into staging so an untouched volume keeps its state.
    pub(crate) fn reset_staging(&mut self) {
        self.pending_pressure = self.pressure;
        self.pending_velocity = self.velocity;
    }

    pub(crate) fn stage(&mut self, update: StateUpdate) {
        self.pending_pressure = update.pressure;
        self.pending_velocity = update.velocity;
    }

    pub(crate) fn staged(&self) -> StateUpdate {
        StateUpdate {
            pressure: self.pending_pressure,
            velocity: self.pending_velocity,
        }
    }

    pub(crate) fn commit(&mut self) {
        self.pressure = self.pending_pressure;
        self.velocity = self.pending_velocity;
    }

    /// Force the volume (and its staging) to rest.
    pub(crate) fn rest(&mut self) {
        self.pressure = 0.0;
        self.velocity = DVec2::ZERO;
        self.reset_staging();
    }

    /// Apply [`compute_update`](Self::compute_update) to an isolated volume
    /// in place. Only valid when no other volume reads this one during the
    /// same step.
    pub fn advance(&mut self, stencil: &Stencil, dt: f64) -> Result<StateUpdate> {
        let update = self.compute_update(stencil, dt)?;
        self.stage(update);
        self.commit();
        Ok(update)
    }
}
