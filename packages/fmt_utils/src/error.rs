use thiserror::Error;

/// Errors that can occur when formatting text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// More arguments were supplied to [`format()`][crate::format] than the
    /// template has `{}` placeholders.
    #[error("{supplied} arguments were supplied but the template has only {placeholders} placeholders")]
    TooManyArguments {
        /// Number of arguments supplied by the caller.
        supplied: usize,

        /// Number of `{}` placeholders found in the template.
        placeholders: usize,
    },
}

/// A specialized `Result` type for formatting operations, returning the
/// crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn too_many_arguments_names_both_counts() {
        let error = Error::TooManyArguments {
            supplied: 3,
            placeholders: 1,
        };

        let message = error.to_string();
        assert!(message.contains('3'));
        assert!(message.contains('1'));
    }
}
