//! Domain Layer
//!
//! Deployment concepts without I/O.
//!
//! ## Structure
//!
//! - `entities/` - Target definitions and release metadata
//! - `value_objects/` - Command results, diagnostic reports, outcomes
//! - `services/` - Parsers for git, changelog and process-table output
//! - `ports/` - Interfaces implemented by infrastructure (runner, confirm, sinks)
//!
//! Everything that touches a host goes through `ports::CommandRunner`.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
