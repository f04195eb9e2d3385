//! Dispositions and settlements.
//!
//! A deferred starts pending and settles at most once. The settled outcome is
//! a [`Settlement`]: either a fulfillment value or a rejection reason, tagged
//! by its [`Disposition`].

use core::fmt;

/// Which way a deferred settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Settled with a value.
    Fulfilled,
    /// Settled with a reason.
    Rejected,
}

impl Disposition {
    /// Returns the other disposition.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Fulfilled => Self::Rejected,
            Self::Rejected => Self::Fulfilled,
        }
    }

    /// Returns true if this is [`Disposition::Fulfilled`].
    #[must_use]
    pub const fn is_fulfilled(self) -> bool {
        matches!(self, Self::Fulfilled)
    }

    /// Returns true if this is [`Disposition::Rejected`].
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns the disposition name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fulfilled => "fulfilled",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settled outcome of a deferred.
///
/// Once a deferred holds a settlement it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Settlement<T, E> {
    /// Fulfilled with a value.
    Fulfilled(T),
    /// Rejected with a reason.
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    /// Returns the disposition of this settlement.
    #[must_use]
    pub const fn disposition(&self) -> Disposition {
        match self {
            Self::Fulfilled(_) => Disposition::Fulfilled,
            Self::Rejected(_) => Disposition::Rejected,
        }
    }

    /// Returns true if fulfilled.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns true if rejected.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Borrows the settlement as a `Result`.
    pub const fn as_result(&self) -> Result<&T, &E> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(reason) => Err(reason),
        }
    }

    /// Converts the settlement into a `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(reason) => Self::Rejected(reason),
        }
    }
}
