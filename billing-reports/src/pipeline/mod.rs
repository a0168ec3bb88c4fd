use usage_domain::{SchemaError, Table};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("sink error: {0}")]
    Sink(String),
}

/// Loads the whole input table before any processing starts.
pub trait Source {
    fn load(&self) -> Result<Table, PipelineError>;
}

/// Pure reshaping of a loaded table into a report.
pub trait Transform {
    type Output;

    fn apply(&self, input: &Table) -> Result<Self::Output, PipelineError>;
}

pub trait Sink<T> {
    fn write(&self, output: &T) -> Result<(), PipelineError>;
}

pub struct Pipeline<S, X, K> {
    pub source: S,
    pub transform: X,
    pub sink: K,
}

impl<S, X, K> Pipeline<S, X, K>
where
    S: Source,
    X: Transform,
    K: Sink<X::Output>,
{
    /// Load, transform, then write. Nothing reaches the sink unless the
    /// transform succeeded, so a failed run leaves no output behind.
    pub fn run(self) -> Result<X::Output, PipelineError> {
        let table = self.source.load()?;
        tracing::info!(
            rows = table.len(),
            columns = table.headers.len(),
            "input table loaded"
        );

        let output = self.transform.apply(&table)?;
        self.sink.write(&output)?;

        Ok(output)
    }
}
