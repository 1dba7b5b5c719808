//! Inspector error type.

use thiserror::Error;

use crate::object::PropertyError;

/// Errors surfaced by inspector operations. Presentation is left to the
/// caller; nothing here is shown to the user directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectorError {
    /// The inspected object was finalized before the operation ran.
    #[error("object is gone")]
    ObjectGone,
    /// The row handle does not name a row of the object tree.
    #[error("no such row")]
    UnknownRow,
    #[error(transparent)]
    Property(#[from] PropertyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_errors_convert() {
        let err: InspectorError = PropertyError::ReadOnly("name".into()).into();
        assert_eq!(err.to_string(), "property name is read-only");
        assert_eq!(InspectorError::UnknownRow.to_string(), "no such row");
    }
}
