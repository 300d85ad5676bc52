use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
}
