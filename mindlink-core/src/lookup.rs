//! Read-accessor result type.
//!
//! The Mind API client distinguishes three non-fatal outcomes of a read:
//! the value was found, the record does not exist, or the API failed in a
//! way the client logs and absorbs. Fatal failures (dead credentials,
//! configuration errors) travel separately as [`crate::MindError`].

/// Outcome of a cached read accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value was found (fresh from cache or from the API).
    Found(T),
    /// The record does not exist (HTTP 404, or absent from its list).
    Missing,
    /// The API failed transiently; the error was logged.
    Unavailable,
}

impl<T> Lookup<T> {
    /// Wraps an option: `Some` becomes `Found`, `None` becomes `Missing`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Found)
    }

    /// Returns true if a value was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Converts to an option, discarding the missing/unavailable
    /// distinction.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Unavailable => None,
        }
    }

    /// Maps the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Missing => Lookup::Missing,
            Self::Unavailable => Lookup::Unavailable,
        }
    }

    /// Chains a dependent lookup on the found value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Lookup<U>) -> Lookup<U> {
        match self {
            Self::Found(value) => f(value),
            Self::Missing => Lookup::Missing,
            Self::Unavailable => Lookup::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_option() {
        assert_eq!(Lookup::from_option(Some(1)), Lookup::Found(1));
        assert_eq!(Lookup::<i32>::from_option(None), Lookup::Missing);
    }

    #[test]
    fn test_map_preserves_variant() {
        assert_eq!(Lookup::Found(2).map(|v| v * 2), Lookup::Found(4));
        assert_eq!(Lookup::<i32>::Missing.map(|v| v * 2), Lookup::Missing);
        assert_eq!(
            Lookup::<i32>::Unavailable.map(|v| v * 2),
            Lookup::Unavailable
        );
    }

    #[test]
    fn test_and_then() {
        let found = Lookup::Found(3).and_then(|v| {
            if v > 2 {
                Lookup::Found(v)
            } else {
                Lookup::Missing
            }
        });
        assert_eq!(found, Lookup::Found(3));

        let missing = Lookup::Found(1).and_then(|_| Lookup::<i32>::Missing);
        assert_eq!(missing, Lookup::Missing);
    }

    #[test]
    fn test_ok() {
        assert_eq!(Lookup::Found("x").ok(), Some("x"));
        assert_eq!(Lookup::<&str>::Unavailable.ok(), None);
    }
}
