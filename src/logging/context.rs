use crate::cli::Command;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Long-running HTTP service; logs are the primary output.
    Service,
    /// One-shot local commands whose stdout carries the result.
    LocalTool,
    /// Client fetching and running a transform command from a remote server.
    Client,
}

impl ExecutionContext {
    /// Returns `true` when stdout is reserved for command output.
    pub fn owns_stdout(self) -> bool {
        !matches!(self, ExecutionContext::Service)
    }
}

/// Derive the active execution context from a parsed CLI command.
pub fn detect_context(command: &Command) -> ExecutionContext {
    match command {
        Command::Serve(_) => ExecutionContext::Service,
        Command::Chain(_) | Command::Graphviz(_) | Command::Check(_) => ExecutionContext::LocalTool,
        Command::ImageCommand(_) => ExecutionContext::Client,
    }
}
