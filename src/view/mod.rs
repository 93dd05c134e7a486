//! Per-box read side of the grid

mod box_view;

pub use box_view::BoxView;
