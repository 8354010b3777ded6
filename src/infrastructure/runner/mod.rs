//! Command Runner implementations
//!
//! - `SshConnector` / `SshSession`: OpenSSH with one control master per target
//! - `LocalRunner`: the operator's local checkout only (`merge`)
//! - `ScriptedRunner` / `ScriptedConnector`: canned answers for tests

mod local;
mod process;
mod scripted;
mod ssh;

pub use local::{expand_home, LocalConnector, LocalRunner, LocalShell, LOCAL_HOST};
pub use scripted::{IssuedCommand, ScriptedConnector, ScriptedRunner};
pub use ssh::{SshConnector, SshSession};
