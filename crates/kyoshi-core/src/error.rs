#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("reorder does not cover the current id set")]
    OrderMismatch,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("username must not be empty")]
    EmptyUsername,
}
