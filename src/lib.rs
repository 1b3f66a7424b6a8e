//! Conway's Game of Life on a fixed-size toroidal grid.
//!
//! [`proc::Grid`] holds the cells and computes generations, [`sim::Controller`]
//! owns a grid and gates edits, play and file IO behind its mode, and
//! [`draw`] is a terminal frontend over a shared controller.

pub mod codec;
pub mod config;
pub mod draw;
pub mod error;
pub mod patterns;
pub mod proc;
pub mod sim;

pub use config::Config;
pub use error::{Error, Malformed, Result};
pub use proc::Grid;
pub use sim::{Controller, Mode};
