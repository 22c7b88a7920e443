use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error serializing or deserializing json: {err}")]
    SerdeJson {
        #[from]
        err: serde_json::Error,
    },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unexpected items data shape: expected an array or a category map, got {got}")]
    InvalidItemsData { got: &'static str },
    #[error("Unexpected recipes data shape: expected an array or an object with knownRecipes, got {got}")]
    InvalidRecipesData { got: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Short name for a JSON value's shape, used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
