use super::cutoff::CutoffTable;
use super::error::TopologyError;
use crate::core::models::cell::SimulationBox;
use crate::core::models::frame::Frame;
use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace};

/// Minimum number of grid cells per axis for the cell-list search to be valid.
///
/// With fewer than three cells the 27-cell stencil would visit the same
/// neighbor cell twice through the periodic wrap.
const MIN_CELLS_PER_AXIS: usize = 3;

/// Connected components of the bonding graph of a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    count: usize,
    molecule_ids: Vec<usize>,
}

impl Connectivity {
    /// Number of molecules (connected components).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-atom molecule IDs, dense in `0..count`.
    pub fn molecule_ids(&self) -> &[usize] {
        &self.molecule_ids
    }

    pub fn into_molecule_ids(self) -> Vec<usize> {
        self.molecule_ids
    }

    /// Atom indices grouped by molecule, in molecule ID order.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.count];
        for (atom, &id) in self.molecule_ids.iter().enumerate() {
            groups[id].push(atom);
        }
        groups
    }

    /// Histogram of molecule sizes: atoms per molecule -> number of molecules.
    pub fn census(&self) -> BTreeMap<usize, usize> {
        let mut census = BTreeMap::new();
        for group in self.groups() {
            *census.entry(group.len()).or_insert(0) += 1;
        }
        census
    }
}

/// Detects molecules as connected components of the cutoff bonding graph.
///
/// Two atoms `i` and `j` are bonded when their minimum-image separation does
/// not exceed `r_i + r_j`, where each radius is the tabulated covalent radius
/// scaled by the cutoff table. Labels are assigned in discovery order: the
/// molecule containing atom 0 is molecule 0, the first atom not yet labelled
/// opens molecule 1, and so on.
///
/// # Errors
///
/// Propagates cutoff validation failures from [`CutoffTable::radii`].
#[instrument(skip_all, fields(atoms = frame.len()))]
pub fn detect_molecules(
    frame: &Frame,
    cutoffs: &CutoffTable,
) -> Result<Connectivity, TopologyError> {
    let radii = cutoffs.radii(frame)?;
    let positions: Vec<Point3<f64>> = frame.atoms().iter().map(|a| a.position).collect();

    let pairs = bonded_pairs(&positions, &radii, frame.cell());
    trace!("Found {} bonded pairs.", pairs.len());

    let mut components = DisjointSet::new(positions.len());
    for &(i, j) in &pairs {
        components.union(i, j);
    }

    let connectivity = components.into_connectivity();
    debug!(
        "Detected {} molecules among {} atoms.",
        connectivity.count,
        frame.len()
    );
    Ok(connectivity)
}

/// Lists every bonded pair `(i, j)` with `i < j`.
pub fn bonded_pairs(
    positions: &[Point3<f64>],
    radii: &[f64],
    cell: &SimulationBox,
) -> Vec<(usize, usize)> {
    let max_radius = radii.iter().copied().fold(0.0f64, f64::max);
    let reach = 2.0 * max_radius;

    match CellGrid::build(positions, cell, reach) {
        Some(grid) => grid.bonded_pairs(positions, radii, cell),
        None => all_pairs(positions, radii, cell),
    }
}

fn is_bonded(cell: &SimulationBox, a: &Point3<f64>, b: &Point3<f64>, cutoff: f64) -> bool {
    cell.minimum_image(&(b - a)).norm_squared() <= cutoff * cutoff
}

fn all_pairs(
    positions: &[Point3<f64>],
    radii: &[f64],
    cell: &SimulationBox,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if is_bonded(cell, &positions[i], &positions[j], radii[i] + radii[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Periodic cell list used to restrict the pair search to neighboring cells.
struct CellGrid {
    dims: [usize; 3],
    cells: Vec<Vec<usize>>,
}

impl CellGrid {
    fn build(positions: &[Point3<f64>], cell: &SimulationBox, reach: f64) -> Option<Self> {
        if reach <= 0.0 {
            return None;
        }
        // Cells may be wider than `reach`; the cap keeps the grid proportional
        // to the atom count when the cutoffs are tiny.
        let max_per_axis =
            ((positions.len() as f64).cbrt().ceil() as usize).max(MIN_CELLS_PER_AXIS);
        let lengths = cell.lengths();
        let mut dims = [0usize; 3];
        for axis in 0..3 {
            let n = (lengths[axis] / reach).floor() as usize;
            if n < MIN_CELLS_PER_AXIS {
                return None;
            }
            dims[axis] = n.min(max_per_axis);
        }

        let mut grid = Self {
            dims,
            cells: vec![Vec::new(); dims[0] * dims[1] * dims[2]],
        };
        for (i, position) in positions.iter().enumerate() {
            let coords = grid.cell_coords(&cell.wrap(position), cell);
            let slot = grid.flat_index(coords);
            grid.cells[slot].push(i);
        }
        Some(grid)
    }

    fn cell_coords(&self, wrapped: &Point3<f64>, cell: &SimulationBox) -> [usize; 3] {
        let lengths = cell.lengths();
        let mut coords = [0usize; 3];
        for axis in 0..3 {
            let fraction = wrapped[axis] / lengths[axis];
            let c = (fraction * self.dims[axis] as f64).floor() as usize;
            coords[axis] = c.min(self.dims[axis] - 1);
        }
        coords
    }

    fn flat_index(&self, [x, y, z]: [usize; 3]) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    fn neighbor_cells(&self, [x, y, z]: [usize; 3]) -> impl Iterator<Item = usize> + '_ {
        let shift = |c: usize, d: isize, n: usize| -> usize {
            (c as isize + d).rem_euclid(n as isize) as usize
        };
        (-1isize..=1).flat_map(move |dx| {
            (-1isize..=1).flat_map(move |dy| {
                (-1isize..=1).map(move |dz| {
                    self.flat_index([
                        shift(x, dx, self.dims[0]),
                        shift(y, dy, self.dims[1]),
                        shift(z, dz, self.dims[2]),
                    ])
                })
            })
        })
    }

    fn bonded_pairs(
        &self,
        positions: &[Point3<f64>],
        radii: &[f64],
        cell: &SimulationBox,
    ) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, position) in positions.iter().enumerate() {
            let home = self.cell_coords(&cell.wrap(position), cell);
            for slot in self.neighbor_cells(home) {
                for &j in &self.cells[slot] {
                    if j > i && is_bonded(cell, position, &positions[j], radii[i] + radii[j]) {
                        pairs.push((i, j));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Union-find over atom indices with path halving and union by rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }

    fn into_connectivity(mut self) -> Connectivity {
        let size = self.parent.len();
        let mut label_of_root = vec![usize::MAX; size];
        let mut molecule_ids = Vec::with_capacity(size);
        let mut count = 0;
        for atom in 0..size {
            let root = self.find(atom);
            if label_of_root[root] == usize::MAX {
                label_of_root[root] = count;
                count += 1;
            }
            molecule_ids.push(label_of_root[root]);
        }
        Connectivity {
            count,
            molecule_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use std::collections::HashSet;

    fn frame_of(atoms: &[(&str, [f64; 3])], box_length: f64) -> Frame {
        let atoms = atoms
            .iter()
            .map(|(s, p)| Atom::from_element(s, Point3::from(*p)).unwrap())
            .collect();
        Frame::new(atoms, SimulationBox::cubic(box_length).unwrap())
    }

    // Li covalent radius is 1.28 A, so a uniform multiplier of 1 bonds Li-Li
    // up to 2.56 A: 2.0 A is bonded and 3.0 A is not.
    #[test]
    fn two_lithium_atoms_within_cutoff_form_one_molecule() {
        let frame = frame_of(&[("Li", [1.0, 1.0, 1.0]), ("Li", [3.0, 1.0, 1.0])], 10.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(connectivity.count(), 1);
        assert_eq!(connectivity.molecule_ids(), &[0, 0]);
    }

    #[test]
    fn two_lithium_atoms_beyond_cutoff_form_two_molecules() {
        let frame = frame_of(&[("Li", [1.0, 1.0, 1.0]), ("Li", [4.0, 1.0, 1.0])], 10.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(connectivity.count(), 2);
        assert_eq!(connectivity.molecule_ids(), &[0, 1]);
    }

    #[test]
    fn bonds_across_the_periodic_boundary_are_detected() {
        let frame = frame_of(&[("Li", [0.5, 5.0, 5.0]), ("Li", [9.5, 5.0, 5.0])], 10.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(connectivity.count(), 1);
    }

    #[test]
    fn labels_follow_discovery_order() {
        let frame = frame_of(
            &[
                ("O", [1.0, 1.0, 1.0]),
                ("O", [8.0, 8.0, 8.0]),
                ("H", [1.9, 1.0, 1.0]),
                ("H", [8.9, 8.0, 8.0]),
                ("Li", [5.0, 5.0, 1.0]),
            ],
            20.0,
        );
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(connectivity.count(), 3);
        assert_eq!(connectivity.molecule_ids(), &[0, 1, 0, 1, 2]);
    }

    #[test]
    fn cutoff_multiplier_controls_bonding() {
        let frame = frame_of(&[("Li", [1.0, 1.0, 1.0]), ("F", [2.7, 1.0, 1.0])], 10.0);
        let bonded = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(bonded.count(), 1);

        let table = CutoffTable::PerSpecies(
            [("Li".to_string(), 0.1), ("F".to_string(), 1.0)]
                .into_iter()
                .collect(),
        );
        let split = detect_molecules(&frame, &table).unwrap();
        assert_eq!(split.count(), 2);
    }

    #[test]
    fn every_atom_belongs_to_exactly_one_molecule() {
        let mut atoms = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                let base = [2.0 + 4.0 * i as f64, 2.0 + 4.0 * j as f64, 3.0];
                atoms.push(("O", base));
                atoms.push(("H", [base[0] + 0.96, base[1], base[2]]));
                atoms.push(("H", [base[0], base[1] + 0.96, base[2]]));
            }
        }
        let frame = frame_of(&atoms, 24.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();

        assert_eq!(connectivity.count(), 36);
        let groups = connectivity.groups();
        let mut seen = HashSet::new();
        for group in &groups {
            assert_eq!(group.len(), 3);
            for &atom in group {
                assert!(seen.insert(atom));
            }
        }
        assert_eq!(seen.len(), frame.len());
        assert_eq!(connectivity.census(), BTreeMap::from([(3, 36)]));
    }

    #[test]
    fn cell_grid_and_all_pairs_agree() {
        let positions: Vec<Point3<f64>> = (0..200)
            .map(|k| {
                let k = k as f64;
                Point3::new(
                    (k * 7.31).rem_euclid(30.0),
                    (k * 3.17).rem_euclid(30.0),
                    (k * 5.93).rem_euclid(30.0),
                )
            })
            .collect();
        let radii = vec![0.9; positions.len()];
        let cell = SimulationBox::cubic(30.0).unwrap();

        let grid = CellGrid::build(&positions, &cell, 1.8).unwrap();
        let from_grid = grid.bonded_pairs(&positions, &radii, &cell);
        let brute = all_pairs(&positions, &radii, &cell);
        assert_eq!(from_grid, brute);
    }

    #[test]
    fn tiny_cutoffs_in_a_large_box_keep_the_grid_small() {
        let frame = frame_of(&[("O", [10.0, 10.0, 10.0]), ("O", [50.0, 50.0, 50.0])], 100.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(0.01)).unwrap();
        assert_eq!(connectivity.count(), 2);

        let positions: Vec<Point3<f64>> = frame.atoms().iter().map(|a| a.position).collect();
        let grid = CellGrid::build(&positions, frame.cell(), 0.0132).unwrap();
        assert_eq!(grid.dims, [3, 3, 3]);
    }

    #[test]
    fn capped_grid_matches_all_pairs() {
        let positions: Vec<Point3<f64>> = (0..60)
            .map(|k| {
                let k = k as f64;
                Point3::new(
                    (k * 11.7).rem_euclid(40.0),
                    (k * 2.9).rem_euclid(40.0),
                    (k * 6.1).rem_euclid(40.0),
                )
            })
            .collect();
        let radii = vec![1.5; positions.len()];
        let cell = SimulationBox::cubic(40.0).unwrap();

        let grid = CellGrid::build(&positions, &cell, 3.0).unwrap();
        assert_eq!(grid.dims, [4, 4, 4]);
        assert_eq!(
            grid.bonded_pairs(&positions, &radii, &cell),
            all_pairs(&positions, &radii, &cell)
        );
    }

    #[test]
    fn small_boxes_fall_back_to_all_pairs() {
        let cell = SimulationBox::cubic(5.0).unwrap();
        assert!(CellGrid::build(&[Point3::origin()], &cell, 2.0).is_none());
    }

    #[test]
    fn empty_frame_has_no_molecules() {
        let frame = frame_of(&[], 10.0);
        let connectivity = detect_molecules(&frame, &CutoffTable::Uniform(1.0)).unwrap();
        assert_eq!(connectivity.count(), 0);
        assert!(connectivity.molecule_ids().is_empty());
        assert!(connectivity.census().is_empty());
    }
}
