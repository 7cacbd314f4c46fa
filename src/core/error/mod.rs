use crate::core::transform_graph::GraphError;
use crate::core::types::ErrorCategory;
use std::collections::HashMap;

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        AppError {
            category,
            code: default_code(category).to_string(),
            message: message.into(),
            context: HashMap::new(),
            source: None,
        }
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }
}

fn default_code(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::ValidationError => "SB-VALIDATION",
        ErrorCategory::UnknownSpace => "SB-UNKNOWN-SPACE",
        ErrorCategory::NotReachable => "SB-NOT-REACHABLE",
        ErrorCategory::GraphError => "SB-GRAPH",
        ErrorCategory::ToolExecutionError => "SB-TOOL",
        ErrorCategory::TimeoutError => "SB-TIMEOUT",
        ErrorCategory::ParseError => "SB-PARSE",
        ErrorCategory::ConfigError => "SB-CONFIG",
        ErrorCategory::IoError => "SB-IO",
        ErrorCategory::InternalError => "SB-INTERNAL",
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            category: ErrorCategory::InternalError,
            code: "ANYHOW_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            source: Some(e),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        let category = match e {
            GraphError::UnknownSpace(_) => ErrorCategory::UnknownSpace,
            GraphError::Io(_) => ErrorCategory::IoError,
            _ => ErrorCategory::GraphError,
        };
        AppError::new(category, e.to_string())
    }
}
