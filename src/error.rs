use std::{error::Error as StdError, fmt, sync::Arc};

/// The failure carried by a rejected [`Future`](crate::Future).
///
/// It is opaque to this crate: errors are only ever stored and forwarded,
/// never inspected. Cloning is cheap so the same error can be handed to every
/// observer of a future and to every future derived from it.
#[derive(Clone, thiserror::Error)]
#[error(transparent)]
pub struct Error(Arc<dyn StdError + Send + Sync + 'static>);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Error {
    /// Wrap any standard error.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// An error that only carries a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.0.is::<E>()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Whether both values are clones of the same error.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::new(Message(message))
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Error {
    fn from(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self(Arc::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn test_error_display_is_transparent() {
        assert_eq!(Error::new(DiskOnFire).to_string(), "disk on fire");
        assert_eq!(Error::msg("💥").to_string(), "💥");
        assert_eq!(Error::from(String::from("nope")).to_string(), "nope");
    }

    #[test]
    fn test_error_downcast() {
        let err = Error::new(DiskOnFire);
        assert!(err.is::<DiskOnFire>());
        assert!(err.downcast_ref::<DiskOnFire>().is_some());
        assert!(!Error::msg("other").is::<DiskOnFire>());
    }

    #[test]
    fn test_error_clones_share_identity() {
        let err = Error::msg("shared");
        let copy = err.clone();
        assert!(err.ptr_eq(&copy));
        assert!(!err.ptr_eq(&Error::msg("shared")));
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err: Error = io.into();
        assert!(err.is::<std::io::Error>());
        assert_eq!(err.to_string(), "timed out");
    }
}
