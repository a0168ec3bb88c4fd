/// One or more columns a component needs are absent from the input header.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required columns: {missing:?}")]
pub struct SchemaError {
    pub missing: Vec<String>,
}
