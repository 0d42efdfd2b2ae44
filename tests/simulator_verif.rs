use glam::DVec2;

use cvflow_rs::discretization::generator::RegularGrid;
use cvflow_rs::discretization::mesh::{CellBounds, CellId, Direction, Grid};
use cvflow_rs::error::SimulationError;
use cvflow_rs::numerics::simulator::FluidSimulator;
use cvflow_rs::physics::FluidProperties;
use cvflow_rs::physics::control_volume::{ControlVolume, Neighbour, Stencil};
use cvflow_rs::physics::obstacle::{Obstacle, Rectangle};

/// A regular grid that enumerates its cells back to front and may lie about
/// its nominal resolution.
#[derive(Clone)]
struct ShuffledGrid {
    inner: RegularGrid,
    reported_resolution: usize,
}

impl ShuffledGrid {
    fn new(inner: RegularGrid) -> Self {
        let reported_resolution = inner.resolution();
        Self {
            inner,
            reported_resolution,
        }
    }
}

impl Grid for ShuffledGrid {
    fn cell_ids(&self) -> Vec<CellId> {
        let mut ids = self.inner.cell_ids();
        ids.reverse();
        ids
    }
    fn cell_count(&self) -> usize {
        self.inner.cell_count()
    }
    fn contains(&self, id: CellId) -> bool {
        self.inner.contains(id)
    }
    fn neighbour(&self, id: CellId, direction: Direction) -> Option<CellId> {
        self.inner.neighbour(id, direction)
    }
    fn coordinates(&self, id: CellId) -> DVec2 {
        self.inner.coordinates(id)
    }
    fn bounds(&self, id: CellId) -> CellBounds {
        self.inner.bounds(id)
    }
    fn scale(&self) -> f64 {
        self.inner.scale()
    }
    fn resolution(&self) -> usize {
        self.reported_resolution
    }
    fn nearest_cell(&self, point: DVec2) -> Option<CellId> {
        self.inner.nearest_cell(point)
    }
    fn volume(&self, id: CellId) -> &ControlVolume {
        self.inner.volume(id)
    }
    fn volume_mut(&mut self, id: CellId) -> &mut ControlVolume {
        self.inner.volume_mut(id)
    }
}

fn props() -> FluidProperties {
    FluidProperties::new(1.0, 0.1, 1.0)
}

/// Deterministic, spatially varying state.
fn seed<G: Grid>(sim: &mut FluidSimulator<G>) {
    for id in sim.grid().cell_ids() {
        let k = id.0 as f64;
        sim.set_pressure(id, (k * 1.7).sin() * 5.0).unwrap();
        sim.set_velocity(id, DVec2::new((k * 0.9).cos(), (k * 2.3).sin()))
            .unwrap();
    }
}

fn state<G: Grid>(grid: &G) -> Vec<(f64, DVec2)> {
    let mut ids = grid.cell_ids();
    ids.sort();
    ids.iter()
        .map(|&id| (grid.volume(id).pressure(), grid.volume(id).velocity()))
        .collect()
}

#[test]
fn quiescent_domain_stays_at_rest() {
    let mut sim = FluidSimulator::new(props(), 1.0, 6).unwrap();
    for _ in 0..10 {
        sim.step(1e-3).unwrap();
    }
    for id in sim.grid().cell_ids() {
        assert!(sim.volume(id).unwrap().is_at_rest());
    }
}

#[test]
fn every_cell_reads_only_pre_step_values() {
    let mut sim = FluidSimulator::new(props(), 1.0, 5).unwrap();
    seed(&mut sim);
    let before = sim.grid().clone();
    let dt = 1e-3;

    sim.step(dt).unwrap();

    // Recompute each cell independently from the untouched copy.
    let h = before.spacing();
    let wall = ControlVolume::at_rest(props());
    for id in before.cell_ids() {
        let pick = |dir: Direction| match before.neighbour(id, dir) {
            Some(n) => Neighbour::new(before.volume(n), h),
            None => Neighbour::new(&wall, h),
        };
        let stencil = Stencil {
            left: pick(Direction::Left),
            right: pick(Direction::Right),
            top: pick(Direction::Top),
            bottom: pick(Direction::Bottom),
        };
        let expected = before.volume(id).compute_update(&stencil, dt).unwrap();
        let got = sim.volume(id).unwrap();
        assert!((got.pressure() - expected.pressure).abs() < 1e-12, "cell {id}");
        assert!(got.velocity().abs_diff_eq(expected.velocity, 1e-12), "cell {id}");
    }
}

#[test]
fn iteration_order_does_not_change_the_result() {
    let mut forward = FluidSimulator::new(props(), 1.0, 5).unwrap();
    let mut backward =
        FluidSimulator::with_grid(props(), ShuffledGrid::new(RegularGrid::new(1.0, 5))).unwrap();
    seed(&mut forward);
    seed(&mut backward);

    for _ in 0..5 {
        forward.step(1e-3).unwrap();
        backward.step(1e-3).unwrap();
    }

    assert_eq!(state(forward.grid()), state(backward.grid()));
}

#[test]
fn edge_neighbours_use_nominal_cell_width() {
    // 3x3 cells of width 1, but a nominal resolution of 6 puts ghosts 0.5 away.
    let mut grid = ShuffledGrid::new(RegularGrid::new(3.0, 3));
    grid.reported_resolution = 6;
    let mut sim = FluidSimulator::with_grid(props(), grid).unwrap();

    let corner = CellId(0);
    let right = CellId(1);
    let top = CellId(3);
    sim.set_velocity(corner, DVec2::new(1.0, 1.0)).unwrap();
    sim.set_pressure(right, 4.0).unwrap();

    let before = sim.grid().clone();
    sim.step(1e-2).unwrap();

    let wall = ControlVolume::at_rest(props());
    let stencil = Stencil {
        left: Neighbour::new(&wall, 0.5),
        right: Neighbour::new(before.volume(right), 1.0),
        top: Neighbour::new(before.volume(top), 1.0),
        bottom: Neighbour::new(&wall, 0.5),
    };
    let expected = before.volume(corner).compute_update(&stencil, 1e-2).unwrap();
    let got = sim.volume(corner).unwrap();
    assert_eq!(got.pressure(), expected.pressure);
    assert_eq!(got.velocity(), expected.velocity);

    // Interior distances stay the real centre gap.
    let centre = CellId(4);
    let s = [CellId(3), CellId(5), CellId(7), CellId(1)];
    let stencil = Stencil {
        left: Neighbour::new(before.volume(s[0]), 1.0),
        right: Neighbour::new(before.volume(s[1]), 1.0),
        top: Neighbour::new(before.volume(s[2]), 1.0),
        bottom: Neighbour::new(before.volume(s[3]), 1.0),
    };
    let expected = before.volume(centre).compute_update(&stencil, 1e-2).unwrap();
    assert_eq!(sim.volume(centre).unwrap().velocity(), expected.velocity);
}

#[test]
fn pressure_pulse_pushes_neighbours_away() {
    let mut sim = FluidSimulator::new(FluidProperties::new(1.0, 1.0, 1.0), 5.0, 5).unwrap();
    let grid = sim.grid().clone();
    let pulse = grid.cell_at(2, 2).unwrap();
    sim.set_pressure(pulse, 10.0).unwrap();

    sim.step(1e-3).unwrap();

    let v = |i, j| sim.volume(grid.cell_at(i, j).unwrap()).unwrap().velocity();
    assert!(v(1, 2).x < 0.0);
    assert_eq!(v(1, 2).y, 0.0);
    assert!(v(2, 1).y < 0.0);
    assert_eq!(v(2, 1).x, 0.0);
    assert!(v(2, 2).x > 0.0 && v(2, 2).y > 0.0);
    // Cells beyond the one-sided stencil are untouched.
    assert_eq!(v(3, 2), DVec2::ZERO);
    assert_eq!(v(2, 3), DVec2::ZERO);
}

#[test]
fn cells_inside_obstacles_end_every_step_at_rest() {
    let mut sim = FluidSimulator::new(props(), 1.0, 4).unwrap();
    seed(&mut sim);
    let inside = sim.grid().cell_at(1, 1).unwrap();
    sim.set_pressure(inside, 123.0).unwrap();
    sim.set_velocity(inside, DVec2::new(-7.0, 3.0)).unwrap();

    sim.add_obstacle(&Rectangle::new(DVec2::new(0.25, 0.25), DVec2::new(0.5, 0.5)))
        .unwrap();
    assert!(sim.is_masked(inside));

    for _ in 0..3 {
        let report = sim.step(1e-3).unwrap();
        assert_eq!(report.masked_cells, 1);
        assert!(sim.volume(inside).unwrap().is_at_rest());
    }
}

#[test]
fn obstacle_is_copied_on_insert() {
    let mut sim = FluidSimulator::new(props(), 1.0, 4).unwrap();
    seed(&mut sim);
    let target = sim.grid().cell_at(3, 3).unwrap();

    let mut rect = Rectangle::new(DVec2::new(0.75, 0.75), DVec2::new(1.0, 1.0));
    sim.add_obstacle(&rect).unwrap();
    rect.translate(DVec2::new(-0.75, -0.75));

    sim.step(1e-3).unwrap();
    assert!(sim.volume(target).unwrap().is_at_rest());
    assert!(!sim.volume(CellId(0)).unwrap().is_at_rest());

    let copies = sim.obstacles();
    assert_eq!(copies.len(), 1);
    assert!(copies[0].overlaps(&sim.grid().bounds(target)));
    assert!(!copies[0].overlaps(&sim.grid().bounds(CellId(0))));
}

#[test]
fn diverging_step_leaves_grid_untouched() {
    let mut sim = FluidSimulator::new(props(), 1.0, 4).unwrap();
    seed(&mut sim);
    let hot = sim.grid().cell_at(2, 2).unwrap();
    sim.set_pressure(hot, 1e308).unwrap();
    let before = state(sim.grid());

    let err = sim.step(1.0).unwrap_err();

    assert!(matches!(err, SimulationError::UnstableStep { .. }));
    assert_eq!(state(sim.grid()), before);
    assert_eq!(sim.steps_taken(), 0);

    // The caller can recover by resetting the offending state.
    sim.set_pressure(hot, 1.0).unwrap();
    assert!(sim.step(1e-3).is_ok());
}

#[test]
fn divergence_inside_obstacles_is_ignored() {
    let mut sim = FluidSimulator::new(props(), 1.0, 4).unwrap();
    let hot = sim.grid().cell_at(2, 2).unwrap();
    sim.set_pressure(hot, 1e308).unwrap();
    let everything: Box<dyn Obstacle> =
        Box::new(Rectangle::new(DVec2::splat(-1.0), DVec2::splat(2.0)));
    sim.add_obstacle(everything.as_ref()).unwrap();

    let report = sim.step(1.0).unwrap();

    assert_eq!(report.masked_cells, 16);
    for id in sim.grid().cell_ids() {
        assert!(sim.volume(id).unwrap().is_at_rest());
    }
}
