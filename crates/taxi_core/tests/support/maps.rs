use std::sync::Arc;

use taxi_core::grid::GridGraph;
use taxi_core::test_helpers::open_grid;

/// Two rows of three cells with no passage between the rows.
pub const SPLIT_ROWS: [&str; 4] = ["+-----+", "| : : |", "|-:-:-|", "+-----+"];

/// Two cells separated by a wall.
pub const WALLED_PAIR: [&str; 3] = ["+---+", "| | |", "+---+"];

pub fn split_rows() -> GridGraph {
    GridGraph::build(&SPLIT_ROWS).expect("split map")
}

/// The 4 x 5 open grid most scenarios run on.
pub fn open_four_by_five() -> Arc<GridGraph> {
    Arc::new(open_grid(4, 5))
}
