//! Perfect-maze generation and path-search animation for the terminal.
//!
//! `maze`, `generate` and `solvers` are the synchronous core; `trace` is the
//! event boundary the core streams visitation records through; `app` is the
//! terminal front end that drains those records into an animation.

pub mod app;
pub mod generate;
pub mod maze;
pub mod solvers;
pub mod trace;
