//! IANA assigned values used by zone transfers.
//!
//! Only the handful of codes the transfer machinery needs to look at are
//! given names. Every other value is still representable and prints in the
//! generic `TYPE123`/`CLASS123` form of [RFC 3597].
//!
//! [RFC 3597]: https://datatracker.ietf.org/doc/html/rfc3597

use core::fmt;

//------------ int_code! -----------------------------------------------------

macro_rules! int_code {
    (
        $(#[$attr:meta])*
        $ident:ident($inttype:ty), $generic:expr;
        $( $(#[$vattr:meta])* ($name:ident, $value:literal, $mnemonic:literal) )*
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $ident($inttype);

        impl $ident {
            $(
                $(#[$vattr])*
                pub const $name: Self = Self($value);
            )*

            /// Creates a value from its integer code.
            #[must_use]
            pub const fn from_int(value: $inttype) -> Self {
                Self(value)
            }

            /// Returns the integer code of the value.
            #[must_use]
            pub const fn to_int(self) -> $inttype {
                self.0
            }

            /// Returns the mnemonic of the value if it has a name.
            #[must_use]
            pub fn to_mnemonic(self) -> Option<&'static str> {
                match self.0 {
                    $( $value => Some($mnemonic), )*
                    _ => None,
                }
            }
        }

        //--- From

        impl From<$inttype> for $ident {
            fn from(value: $inttype) -> Self {
                Self(value)
            }
        }

        impl From<$ident> for $inttype {
            fn from(value: $ident) -> Self {
                value.0
            }
        }

        //--- Display

        impl fmt::Display for $ident {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.to_mnemonic() {
                    Some(mnemonic) => f.write_str(mnemonic),
                    None => write!(f, "{}{}", $generic, self.0),
                }
            }
        }
    };
}

//------------ Rtype ---------------------------------------------------------

int_code! {
    /// A resource record type.
    Rtype(u16), "TYPE";

    (A, 1, "A")
    (NS, 2, "NS")
    (CNAME, 5, "CNAME")
    /// Start of a zone of authority.
    (SOA, 6, "SOA")
    (PTR, 12, "PTR")
    (MX, 15, "MX")
    (TXT, 16, "TXT")
    (AAAA, 28, "AAAA")
    (SRV, 33, "SRV")
    (DS, 43, "DS")
    (RRSIG, 46, "RRSIG")
    (NSEC, 47, "NSEC")
    (DNSKEY, 48, "DNSKEY")
    (TSIG, 250, "TSIG")
    /// Incremental zone transfer, [RFC 1995].
    ///
    /// [RFC 1995]: https://datatracker.ietf.org/doc/html/rfc1995
    (IXFR, 251, "IXFR")
    /// Full zone transfer, [RFC 5936].
    ///
    /// [RFC 5936]: https://datatracker.ietf.org/doc/html/rfc5936
    (AXFR, 252, "AXFR")
    (ANY, 255, "ANY")
}

//------------ Class ---------------------------------------------------------

int_code! {
    /// A DNS class.
    Class(u16), "CLASS";

    (IN, 1, "IN")
    (CH, 3, "CH")
    (HS, 4, "HS")
    (NONE, 254, "NONE")
    (ANY, 255, "ANY")
}

//------------ Rcode ---------------------------------------------------------

int_code! {
    /// A response code, the four bit value from the message header.
    Rcode(u8), "RCODE";

    (NOERROR, 0, "NOERROR")
    (FORMERR, 1, "FORMERR")
    (SERVFAIL, 2, "SERVFAIL")
    (NXDOMAIN, 3, "NXDOMAIN")
    (NOTIMP, 4, "NOTIMP")
    (REFUSED, 5, "REFUSED")
    (NOTAUTH, 9, "NOTAUTH")
}

//------------ Opcode --------------------------------------------------------

int_code! {
    /// A message opcode.
    Opcode(u8), "OPCODE";

    (QUERY, 0, "QUERY")
    (NOTIFY, 4, "NOTIFY")
    (UPDATE, 5, "UPDATE")
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_known_and_generic() {
        assert_eq!(Rtype::SOA.to_string(), "SOA");
        assert_eq!(Rtype::from_int(65280).to_string(), "TYPE65280");
        assert_eq!(Class::IN.to_string(), "IN");
        assert_eq!(Class::from_int(42).to_string(), "CLASS42");
        assert_eq!(Rcode::NOTAUTH.to_string(), "NOTAUTH");
    }

    #[test]
    fn int_conversion() {
        assert_eq!(u16::from(Rtype::IXFR), 251);
        assert_eq!(Rtype::from(252), Rtype::AXFR);
        assert_eq!(Rcode::FORMERR.to_int(), 1);
    }
}
