use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("no provider registered for field '{field}' (at '{path}') of type `{type_name}` in `{owner}`")]
    MissingProvider {
        field: &'static str,
        path: String,
        type_name: &'static str,
        owner: &'static str,
    },
}
