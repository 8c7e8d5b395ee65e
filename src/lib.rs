// Public API - only expose the runner module
pub mod runner;

// Internal modules - organized by subsystem
mod config;
mod coordination;
mod export;
mod io;
mod settings;
mod source;
mod table;
mod telemetry;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod integ_tests;
