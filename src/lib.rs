//! Radio signal relaxation over a grid of walled cells.
//!
//! A router is placed in one cell; every other cell receives the router's
//! transmit power minus free-space path loss and the attenuation of the walls
//! between it and the router. Attenuation spreads outward one cell per
//! iteration until the grid reaches a fixed point.

pub mod cell;
pub mod direction;
pub mod grid;
pub mod grid_state;
pub mod output;
pub mod propagation;
pub mod report;
pub mod simulation;

pub use cell::Cell;
pub use direction::Octant;
pub use grid::{Grid, GridSpec};
pub use report::WeakestCells;
pub use simulation::{RunSummary, SignalSimulation};
