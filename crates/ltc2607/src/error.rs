//! Driver error taxonomy
//!
//! Every failure is reported to the immediate caller; none is retried here.
//! [`Error`] is generic over the transport's own error type so bus-level
//! detail (NACK, arbitration loss, …) survives the trip up the stack.

use core::fmt;

use thiserror_no_std::Error;

use crate::lifecycle::LifecycleState;

/// Errors returned by the LTC2607 driver core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Requested value or channel was rejected before any I/O.
    #[error("invalid value: {0}")]
    InvalidValue(InvalidValue),
    /// The transport errored or accepted fewer bytes than the frame length.
    #[error("transport failure: {0}")]
    Transport(TransportFailure<E>),
    /// No backing storage for another device instance.
    #[error("no storage left for another device")]
    AllocationFailure,
    /// The numeric-I/O framework refused the device's channels.
    #[error("channel registration failed: {0}")]
    Registration(RegistrationError),
    /// The device is not in the `Attached` state.
    #[error("device is {0}, not attached")]
    InvalidState(LifecycleState),
}

/// Reasons a value, channel or attribute is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidValue {
    /// Raw value outside `0..=65535`.
    #[error("raw value {value} outside 0..=65535")]
    OutOfRange {
        /// The rejected value.
        value: i32,
    },
    /// Logical channel index with no entry in the channel map.
    #[error("logical channel {channel} is not mapped")]
    UnmappedChannel {
        /// The rejected logical index.
        channel: u32,
    },
    /// Physical sub-address that does not fit the 4-bit selector.
    #[error("sub-address {address:#04x} does not fit in 4 bits")]
    AddressOutOfRange {
        /// The rejected sub-address.
        address: u8,
    },
    /// Channel attribute other than the raw output code.
    #[error("channel attribute is not writable")]
    UnsupportedAttribute,
}

/// How a transport send went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportFailure<E> {
    /// The send primitive itself reported an error.
    #[error("bus error")]
    Hard(E),
    /// The send call returned without error but short.
    #[error("partial write: {sent} of {expected} bytes accepted")]
    Partial {
        /// Bytes the transport reports as sent.
        sent: usize,
        /// Bytes that were handed to the transport.
        expected: usize,
    },
}

/// Why the numeric-I/O framework rejected a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    /// A device with the same name is already registered.
    NameInUse,
    /// The framework has no room for more devices.
    Full,
    /// The framework refused for its own reasons.
    Rejected,
}

impl RegistrationError {
    /// Short description for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameInUse => "name already registered",
            Self::Full => "framework full",
            Self::Rejected => "rejected by framework",
        }
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<E> From<InvalidValue> for Error<E> {
    fn from(err: InvalidValue) -> Self {
        Self::InvalidValue(err)
    }
}

impl<E> From<TransportFailure<E>> for Error<E> {
    fn from(err: TransportFailure<E>) -> Self {
        Self::Transport(err)
    }
}

impl<E> From<RegistrationError> for Error<E> {
    fn from(err: RegistrationError) -> Self {
        Self::Registration(err)
    }
}

impl<E> Error<E> {
    /// Short, allocation-free description of the error class.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidValue(_) => "invalid value",
            Self::Transport(TransportFailure::Hard(_)) => "transport failure (hard)",
            Self::Transport(TransportFailure::Partial { .. }) => "transport failure (partial)",
            Self::AllocationFailure => "allocation failure",
            Self::Registration(_) => "registration failure",
            Self::InvalidState(_) => "invalid state",
        }
    }

    /// The transport's own error, for hard bus failures.
    pub const fn transport_error(&self) -> Option<&E> {
        match self {
            Self::Transport(TransportFailure::Hard(err)) => Some(err),
            _ => None,
        }
    }

    /// `true` when the failure happened on the bus rather than in validation.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
