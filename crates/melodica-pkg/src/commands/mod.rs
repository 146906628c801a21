//! Command handlers, one module per subcommand.

pub mod completion;
pub mod fetch;
pub mod install;
pub mod lint;
pub mod show;
pub mod version;
