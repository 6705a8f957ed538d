use thiserror::Error;

use crate::document::DocumentError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinkError {
    #[error("no linked document registered for key '{0}'")]
    UnknownKey(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
