use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Reasons an occupancy matrix cannot be built into a solid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no occupied cells")]
    Empty,

    #[error("layout rows have different lengths")]
    Ragged,

    #[error("layout is not 4-connected ({components} separate groups of cells)")]
    Disconnected { components: usize },

    #[error("layout encloses an empty cell at ({x}, {y})")]
    EnclosedVoid { x: usize, y: usize },
}

/// 2-D boolean grid `cells[x][y]`; `true` marks an occupied grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMatrix {
    cells: Vec<Vec<bool>>,
}

const NEIGHBOURS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl LayoutMatrix {
    /// An empty `x_len × y_len` matrix.
    pub fn new(x_len: usize, y_len: usize) -> Self {
        Self {
            cells: vec![vec![false; y_len]; x_len],
        }
    }

    /// A fully occupied rectangle.
    pub fn filled(x_len: usize, y_len: usize) -> Self {
        Self {
            cells: vec![vec![true; y_len]; x_len],
        }
    }

    /// Build from columns indexed `[x][y]`.
    pub fn from_columns(cells: Vec<Vec<bool>>) -> Result<Self, LayoutError> {
        if let Some(first) = cells.first() {
            if cells.iter().any(|c| c.len() != first.len()) {
                return Err(LayoutError::Ragged);
            }
        }
        Ok(Self { cells })
    }

    pub fn x_len(&self) -> usize {
        self.cells.len()
    }

    pub fn y_len(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn columns(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Occupancy of `(x, y)`; out-of-range cells are empty.
    pub fn get(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.cells
            .get(x as usize)
            .and_then(|col| col.get(y as usize))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, x: usize, y: usize, occupied: bool) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|col| col.get_mut(y)) {
            *cell = occupied;
        }
    }

    /// Occupied cells in x-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, col)| {
            col.iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(y, _)| (x, y))
        })
    }

    pub fn count(&self) -> usize {
        self.occupied_cells().count()
    }

    /// Number of 4-connected groups of occupied cells.
    pub fn component_count(&self) -> usize {
        let mut seen = vec![vec![false; self.y_len()]; self.x_len()];
        let mut components = 0;
        for (x, y) in self.occupied_cells() {
            if seen[x][y] {
                continue;
            }
            components += 1;
            self.flood(x, y, true, &mut seen);
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.component_count() == 1
    }

    /// Empty cells that cannot reach the matrix border through empty cells.
    pub fn enclosed_voids(&self) -> Vec<(usize, usize)> {
        let (nx, ny) = (self.x_len(), self.y_len());
        let mut outside = vec![vec![false; ny]; nx];
        for x in 0..nx {
            for y in 0..ny {
                let on_border = x == 0 || y == 0 || x + 1 == nx || y + 1 == ny;
                if on_border && !self.cells[x][y] && !outside[x][y] {
                    self.flood(x, y, false, &mut outside);
                }
            }
        }
        let mut voids = Vec::new();
        for x in 0..nx {
            for y in 0..ny {
                if !self.cells[x][y] && !outside[x][y] {
                    voids.push((x, y));
                }
            }
        }
        voids
    }

    /// Check the layout can be built: non-empty, 4-connected, no enclosed voids.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.count() == 0 {
            return Err(LayoutError::Empty);
        }
        let components = self.component_count();
        if components != 1 {
            return Err(LayoutError::Disconnected { components });
        }
        if let Some(&(x, y)) = self.enclosed_voids().first() {
            return Err(LayoutError::EnclosedVoid { x, y });
        }
        Ok(())
    }

    fn flood(&self, x: usize, y: usize, value: bool, seen: &mut [Vec<bool>]) {
        let mut queue = VecDeque::from([(x, y)]);
        seen[x][y] = true;
        while let Some((cx, cy)) = queue.pop_front() {
            for (dx, dy) in NEIGHBOURS {
                let nx = cx as isize + dx;
                let ny = cy as isize + dy;
                if nx < 0 || ny < 0 || nx as usize >= self.x_len() || ny as usize >= self.y_len() {
                    continue;
                }
                let (ux, uy) = (nx as usize, ny as usize);
                if self.cells[ux][uy] == value && !seen[ux][uy] {
                    seen[ux][uy] = true;
                    queue.push_back((ux, uy));
                }
            }
        }
    }
}
