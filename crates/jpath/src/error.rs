use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JPathError {
    #[error("Normalized path parse error in '{0}': {1}")]
    NormalizedPathParse(String, String),

    #[error("Invalid slice: step must not be zero")]
    ZeroSliceStep,

    #[error("Unknown filter function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },
}
