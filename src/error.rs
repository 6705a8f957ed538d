use crate::binder::BindError;
use crate::document::DocumentError;
use crate::linked::LinkError;
use thiserror::Error;

/// Top-level error type for the dragon-bind library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("binding error: {0}")]
    Bind(#[from] BindError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("linked document error: {0}")]
    Link(#[from] LinkError),
}
