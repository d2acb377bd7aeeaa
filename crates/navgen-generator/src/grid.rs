//! Two-pass construction of the mode grid and its neighbor transitions.
//!
//! [`build_modes`] creates one mode per cell and returns a [`ModeGrid`];
//! [`build_transitions`] reads that grid to wire each cell to its
//! orthogonal neighbors.

use std::collections::BTreeMap;

use navgen_core::{BaseComponent, Expression, ExpressionParser, ModeId, ModelError, Operator};
use tracing::trace;

use crate::dynamics::{assign_derivatives, X, Y};
use crate::error::GeneratorResult;
use crate::invariant::cell_invariant;
use crate::params::GridParameters;

/// Immutable lookup from cell coordinates to mode ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeGrid {
    width: usize,
    height: usize,
    /// Row-major, index `x + y * width`.
    cells: Vec<ModeId>,
}

impl ModeGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mode of cell `(x, y)`, if inside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<ModeId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(x + y * self.width).copied()
    }

    /// Iterate `((x, y), mode)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), ModeId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, id)| ((i % self.width, i / self.width), *id))
    }

    /// In-grid orthogonal neighbors of `(x, y)` in left, right, down, up order.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(Direction, ModeId)> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                let (nx, ny) = dir.step(x, y)?;
                self.get(nx, ny).map(|id| (dir, id))
            })
            .collect()
    }
}

/// Orthogonal step between grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ];

    /// Neighbor coordinates, or `None` when stepping below zero.
    pub fn step(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        match self {
            Direction::Left => x.checked_sub(1).map(|nx| (nx, y)),
            Direction::Right => Some((x + 1, y)),
            Direction::Down => y.checked_sub(1).map(|ny| (x, ny)),
            Direction::Up => Some((x, y + 1)),
        }
    }

    /// Guard for leaving cell `(x, y)` in this direction.
    ///
    /// Each guard is the complement of the matching invariant bound, so the
    /// jump is enabled exactly on the shared cell boundary.
    pub fn guard(&self, x: usize, y: usize) -> Expression {
        let (fx, fy) = (x as f64, y as f64);
        match self {
            Direction::Left => Expression::compare(X, Operator::LessEqual, fx),
            Direction::Right => Expression::compare(X, Operator::GreaterEqual, fx + 1.0),
            Direction::Down => Expression::compare(Y, Operator::LessEqual, fy),
            Direction::Up => Expression::compare(Y, Operator::GreaterEqual, fy + 1.0),
        }
    }
}

/// Create one mode per cell with its flows and invariant.
///
/// Forbidden cells are recorded in `forbidden` with condition `true`.
pub fn build_modes<P: ExpressionParser>(
    params: &GridParameters,
    ha: &mut BaseComponent,
    forbidden: &mut BTreeMap<String, Expression>,
    parser: &P,
) -> GeneratorResult<ModeGrid> {
    let (width, height) = (params.width(), params.height());
    let mut cells = Vec::with_capacity(params.cell_count());

    for y in 0..height {
        for x in 0..width {
            let name = params.mode_name(x, y);
            let selector = params.selectors()[x + y * width];
            let id = ha.create_mode(name.clone())?;

            if selector.is_forbidden() {
                forbidden.insert(name.clone(), Expression::TRUE);
            }

            let flows = assign_derivatives(selector, params, parser)?;
            let mode = ha.mode_mut(id).ok_or(ModelError::ModeOutOfRange { id })?;
            mode.flow_dynamics = flows;
            mode.invariant = cell_invariant(x, y, width, height);

            trace!(mode = %name, selector = %selector, "created mode");
            cells.push(id);
        }
    }

    Ok(ModeGrid {
        width,
        height,
        cells,
    })
}

/// Wire every cell to each in-grid orthogonal neighbor.
pub fn build_transitions(grid: &ModeGrid, ha: &mut BaseComponent) -> GeneratorResult<usize> {
    let mut created = 0;

    for ((x, y), from) in grid.iter() {
        for (dir, to) in grid.neighbors(x, y) {
            let t = ha.create_transition(from, to)?;
            t.guard = dir.guard(x, y);
            created += 1;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use navgen_core::InfixParser;

    use super::*;
    use crate::config::NavigationConfig;

    fn build(i_list: &[&str], width: i64) -> (BaseComponent, ModeGrid, BTreeMap<String, Expression>) {
        let params =
            GridParameters::validate(&NavigationConfig::new([-1.0, 0.0, 0.0, -1.0], i_list, width))
                .unwrap();
        let mut ha = BaseComponent::new();
        let mut forbidden = BTreeMap::new();
        let grid = build_modes(&params, &mut ha, &mut forbidden, &InfixParser).unwrap();
        (ha, grid, forbidden)
    }

    #[test]
    fn test_direction_steps() {
        assert_eq!(Direction::Left.step(0, 0), None);
        assert_eq!(Direction::Down.step(3, 0), None);
        assert_eq!(Direction::Right.step(1, 2), Some((2, 2)));
        assert_eq!(Direction::Up.step(1, 2), Some((1, 3)));
    }

    #[test]
    fn test_guards() {
        assert_eq!(Direction::Left.guard(2, 1).to_string(), "x <= 2");
        assert_eq!(Direction::Right.guard(2, 1).to_string(), "x >= 3");
        assert_eq!(Direction::Down.guard(2, 1).to_string(), "y <= 1");
        assert_eq!(Direction::Up.guard(2, 1).to_string(), "y >= 2");
    }

    #[test]
    fn test_mode_grid_layout() {
        let (ha, grid, forbidden) = build(&["0", "1", "A", "B", "4", "5"], 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(ha.mode_count(), 6);

        let id = grid.get(0, 1).unwrap();
        assert_eq!(ha.mode(id).unwrap().name, "mode_0_1");
        assert_eq!(grid.get(3, 0), None);

        assert_eq!(forbidden.len(), 1);
        assert_eq!(forbidden.get("mode_0_1"), Some(&Expression::TRUE));
        assert!(ha.mode_by_name("mode_2_0").unwrap().is_static());
    }

    #[test]
    fn test_neighbors() {
        let (_, grid, _) = build(&["0"; 9], 3);
        let dirs = |x, y| -> Vec<Direction> {
            grid.neighbors(x, y).into_iter().map(|(d, _)| d).collect()
        };
        assert_eq!(dirs(0, 0), vec![Direction::Right, Direction::Up]);
        assert_eq!(dirs(1, 0), vec![Direction::Left, Direction::Right, Direction::Up]);
        assert_eq!(dirs(1, 1), Direction::ALL.to_vec());
        assert_eq!(dirs(2, 2), vec![Direction::Left, Direction::Down]);
    }

    #[test]
    fn test_transitions_count() {
        let (mut ha, grid, _) = build(&["0"; 12], 4);
        let created = build_transitions(&grid, &mut ha).unwrap();
        // Each of the 3*3 + 4*2 adjacent pairs gets one jump in each direction.
        assert_eq!(created, 2 * (3 * 3 + 4 * 2));
        assert_eq!(ha.transition_count(), created);
    }

    #[test]
    fn test_single_cell_has_no_transitions() {
        let (mut ha, grid, _) = build(&["3"], 1);
        assert_eq!(build_transitions(&grid, &mut ha).unwrap(), 0);
    }
}
