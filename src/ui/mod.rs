//! Terminal UI for the rollout binary
//!
//! - `theme` - color, icon and border tokens
//! - `primitives` / `widgets` / `blocks` - composable renderers
//! - `console` - `DeployEventSink` writing to the terminal

pub mod blocks;
pub mod console;
pub mod context;
pub mod primitives;
pub mod terminal;
pub mod theme;
pub mod widgets;
