pub mod config;
pub mod error;
pub mod invoker;
pub mod transform_graph;
pub mod types;

pub use config::{BackendConfig, ConfigLoader};
pub use error::AppError;
pub use invoker::{AimsApplyTransform, PointTransformer};
pub use transform_graph::{GraphError, TransformGraph};
pub use types::*;
