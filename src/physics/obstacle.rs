use crate::discretization::mesh::CellBounds;
use glam::DVec2;
use std::fmt::Debug;

/// Solid geometry that may overlap control volumes.
///
/// The simulator keeps its own boxed copies (via [`Obstacle::box_clone`]) so
/// that changes to a caller's obstacle never leak into masking.
pub trait Obstacle: Debug {
    fn overlaps(&self, cell: &CellBounds) -> bool;

    /// Degenerate shapes are refused by the simulator.
    fn is_valid(&self) -> bool {
        true
    }

    fn box_clone(&self) -> Box<dyn Obstacle>;
}

impl Clone for Box<dyn Obstacle> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Axis-aligned solid rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rectangle {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.min += offset;
        self.max += offset;
    }
}

impl Obstacle for Rectangle {
    /// Intersection with positive area; touching edges do not count.
    fn overlaps(&self, cell: &CellBounds) -> bool {
        let lo = self.min.max(cell.min);
        let hi = self.max.min(cell.max);
        hi.x > lo.x && hi.y > lo.y
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x < self.max.x
            && self.min.y < self.max.y
    }

    fn box_clone(&self) -> Box<dyn Obstacle> {
        Box::new(self.clone())
    }
}

/// Solid disc.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub centre: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(centre: DVec2, radius: f64) -> Self {
        Self { centre, radius }
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.centre += offset;
    }
}

impl Obstacle for Circle {
    fn overlaps(&self, cell: &CellBounds) -> bool {
        let closest = cell.closest_point(self.centre);
        closest.distance_squared(self.centre) < self.radius * self.radius
    }

    fn is_valid(&self) -> bool {
        self.centre.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }

    fn box_clone(&self) -> Box<dyn Obstacle> {
        Box::new(self.clone())
    }
}
