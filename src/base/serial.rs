//! Serial number arithmetic.
//!
//! See [RFC 1982](https://datatracker.ietf.org/doc/html/rfc1982).

use core::cmp::Ordering;
use core::fmt;

//----------- Serial ---------------------------------------------------------

/// A zone serial number.
///
/// Serial numbers only implement a partial ordering: two values exactly
/// `2^31` apart are neither equal nor is one greater than the other.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Serial(u32);

impl Serial {
    /// Adds `other` to the serial.
    ///
    /// RFC 1982 only defines addition for values up to `2^31 - 1`, larger
    /// values are clamped to that.
    #[must_use]
    pub fn add(self, other: u32) -> Self {
        Self(self.0.wrapping_add(other.min(0x7FFF_FFFF)))
    }

    /// Returns the serial as a native integer.
    #[must_use]
    pub const fn into_int(self) -> u32 {
        self.0
    }
}

//--- Ordering

impl PartialOrd for Serial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (lhs, rhs) = (self.0, other.0);

        if lhs == rhs {
            Some(Ordering::Equal)
        } else if lhs.abs_diff(rhs) == 1 << 31 {
            None
        } else if (lhs < rhs) ^ (lhs.abs_diff(rhs) > (1 << 31)) {
            Some(Ordering::Less)
        } else {
            Some(Ordering::Greater)
        }
    }
}

//--- Conversion to and from native integer types

impl From<u32> for Serial {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Serial> for u32 {
    fn from(value: Serial) -> Self {
        value.0
    }
}

//--- Formatting

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_comparison() {
        assert!(Serial::from(1) < Serial::from(2));
        assert!(Serial::from(u32::MAX) < Serial::from(0));
        assert!(Serial::from(0) > Serial::from(u32::MAX));
        assert!(Serial::from(5) >= Serial::from(5));
        assert_eq!(Serial::from(0).partial_cmp(&Serial::from(1 << 31)), None);
        assert!(!(Serial::from(0) >= Serial::from(1 << 31)));
    }

    #[test]
    fn add_wraps() {
        assert_eq!(Serial::from(u32::MAX).add(2), Serial::from(1));
        assert_eq!(Serial::from(0).add(u32::MAX), Serial::from(0x7FFF_FFFF));
    }
}
