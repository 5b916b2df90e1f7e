//! Multi-head semantic dependency graphs: transition linearization and beam decoding.

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

pub mod app;
pub mod io;
pub mod logging;
pub mod syntax;
