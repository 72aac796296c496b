#![cfg_attr(not(test), no_std)]

//! Line detection for square, row-major grids (tic-tac-toe, gomoku style).
//!
//! Only the lines passing through a single cell are inspected, so a check
//! after each move costs O(dim) per direction instead of a full O(dim²)
//! board scan.

/// The four canonical line directions as `(row, col)` steps: horizontal,
/// vertical, the main diagonal and the anti-diagonal. Each direction is
/// scanned in both senses, which covers all eight neighbours.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Counts consecutive cells equal to `mark`, starting one step away from
/// `(row, col)` and walking along `step` until the grid edge or a mismatch.
///
/// # Arguments
/// * `cells` - The board data as a flat, row-major slice of `dim * dim` cells
/// * `dim` - Board dimension
/// * `row`, `col` - The origin of the walk (not itself counted)
/// * `step` - Row and column increment per step
/// * `mark` - The cell value to count
pub fn run_from<T: PartialEq>(
    cells: &[T],
    dim: usize,
    row: usize,
    col: usize,
    step: (isize, isize),
    mark: &T,
) -> usize {
    let bound = dim as isize;
    let (mut r, mut c) = (row as isize, col as isize);
    let mut count = 0;
    loop {
        r += step.0;
        c += step.1;
        if r < 0 || c < 0 || r >= bound || c >= bound {
            break;
        }
        if cells[r as usize * dim + c as usize] != *mark {
            break;
        }
        count += 1;
    }
    count
}

/// Length of the run of `mark` through `(row, col)` along `direction`,
/// counted in both senses. Zero when the origin itself does not hold `mark`.
pub fn run_through<T: PartialEq>(
    cells: &[T],
    dim: usize,
    row: usize,
    col: usize,
    direction: (isize, isize),
    mark: &T,
) -> usize {
    if cells[row * dim + col] != *mark {
        return 0;
    }
    let (dr, dc) = direction;
    1 + run_from(cells, dim, row, col, (dr, dc), mark) + run_from(cells, dim, row, col, (-dr, -dc), mark)
}

/// Checks whether `(row, col)` lies on a full line of `mark`, i.e. a run of
/// length `dim` along any of the four [`DIRECTIONS`].
pub fn completes_line<T: PartialEq>(cells: &[T], dim: usize, row: usize, col: usize, mark: &T) -> bool {
    debug_assert_eq!(cells.len(), dim * dim);
    DIRECTIONS
        .iter()
        .any(|&direction| run_through(cells, dim, row, col, direction, mark) == dim)
}
