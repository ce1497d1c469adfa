//! Handler results and their conversion.

use crate::error::BoxError;

/// The value a handler hands back to the front end.
///
/// A reply always carries a success flag. [`Reply::empty`] is the
/// zero-content sentinel for handlers with no user-visible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    success: bool,
    content: Option<String>,
}

impl Reply {
    /// A successful reply without content.
    pub const fn empty() -> Self {
        Self {
            success: true,
            content: None,
        }
    }

    /// A successful reply carrying text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
        }
    }

    /// An unsuccessful reply carrying a message for the user.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            success: false,
            content: Some(content.into()),
        }
    }

    /// Whether the handler considers the request successful.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The content, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether this is a content-free reply.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::empty()
    }
}

/// Conversion of a handler's output into a [`Reply`].
///
/// # Default Implementations
///
/// - `()` → [`Reply::empty`]
/// - `Reply` → As is
/// - `String` / `&'static str` → [`Reply::text`]
/// - `bool` → empty success or empty failure
/// - `Option<T>` → `None` is [`Reply::empty`]
/// - `Result<T, E>` → Delegates to inner `T` or propagates the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoReply`",
    label = "missing `IntoReply` implementation",
    note = "IntoReply must implement the `into_reply` method."
)]
pub trait IntoReply {
    /// Convert the output into a reply or a handler fault.
    fn into_reply(self) -> Result<Reply, BoxError>;
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::empty())
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::text(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::text(self))
    }
}

impl IntoReply for bool {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply {
            success: self,
            content: None,
        })
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(Reply::empty()),
        }
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BoxError>,
{
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}
