//! Absolute domain names.
//!
//! A [`Name`] holds a domain name in its uncompressed wire format, backed by
//! [`Bytes`] so that the owner names of records can be shared cheaply
//! between a zone, its snapshots, and the streams that transfer it.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use core::fmt;

use bytes::Bytes;

/// The maximum length of a name in its wire format.
pub const MAX_NAME_LEN: usize = 255;

/// The maximum length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// The maximum number of labels a name can have, excluding the root label.
const MAX_LABELS: usize = 127;

//------------ Name ----------------------------------------------------------

/// An absolute domain name in uncompressed wire format.
///
/// Comparison, hashing, and ordering ignore ASCII case. Ordering follows
/// the canonical DNS name order of [RFC 4034, section 6.1].
///
/// [RFC 4034, section 6.1]:
///     https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
#[derive(Clone)]
pub struct Name(Bytes);

impl Name {
    /// Returns the root name.
    #[must_use]
    pub fn root() -> Self {
        Self(Bytes::from_static(b"\0"))
    }

    /// Creates a name from its wire format, checking that it is valid.
    pub fn from_octets(octets: Bytes) -> Result<Self, NameError> {
        Self::check(&octets)?;
        Ok(Self(octets))
    }

    /// Creates a name from a slice with the wire format.
    pub fn from_slice(slice: &[u8]) -> Result<Self, NameError> {
        Self::from_octets(Bytes::copy_from_slice(slice))
    }

    fn check(octets: &[u8]) -> Result<(), NameError> {
        if octets.len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        let mut pos = 0;
        loop {
            let Some(&len) = octets.get(pos) else {
                return Err(NameError::RelativeName);
            };
            let len = usize::from(len);
            if len > MAX_LABEL_LEN {
                return Err(NameError::BadLabel);
            }
            pos += 1 + len;
            if len == 0 {
                break;
            }
        }
        if pos != octets.len() {
            return Err(NameError::TrailingData);
        }
        Ok(())
    }

    /// Returns the wire format of the name.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the underlying octets.
    pub fn as_octets(&self) -> &Bytes {
        &self.0
    }

    /// Returns the length of the wire format of the name.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns the name with the first label removed.
    ///
    /// Returns `None` for the root name.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let len = usize::from(self.0[0]);
        Some(Self(self.0.slice(1 + len..)))
    }

    /// Returns an iterator over the labels, excluding the root label.
    pub fn labels(&self) -> Labels<'_> {
        Labels {
            octets: self.as_slice(),
        }
    }

    /// Returns the number of labels, excluding the root label.
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Returns whether `self` is equal to or a subdomain of `base`.
    pub fn ends_with(&self, base: &Name) -> bool {
        let (ours, ours_len) = self.label_starts();
        let (theirs, theirs_len) = base.label_starts();
        if theirs_len > ours_len {
            return false;
        }
        let skip = ours_len - theirs_len;
        self.as_slice()[usize::from(ours[skip])..]
            .eq_ignore_ascii_case(&base.as_slice()[usize::from(theirs[0])..])
    }

    /// Returns the start offsets of all labels and their number.
    ///
    /// The offsets array has room for the root label, too.
    fn label_starts(&self) -> ([u8; MAX_LABELS + 1], usize) {
        let mut res = [0u8; MAX_LABELS + 1];
        let mut count = 0;
        let mut pos = 0usize;
        let octets = self.as_slice();
        while octets[pos] != 0 {
            // Names are at most 255 octets, so offsets fit into a u8.
            res[count] = pos as u8;
            count += 1;
            pos += 1 + usize::from(octets[pos]);
        }
        res[count] = pos as u8;
        (res, count)
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    /// Parses a name from its presentation format.
    ///
    /// The name is always taken as absolute, a trailing dot is optional.
    /// The escape sequences `\X` and `\DDD` are supported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            return Ok(Self::root());
        }
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(NameError::EmptyLabel);
        }

        let mut octets = Vec::with_capacity(s.len() + 2);
        let mut label = Vec::with_capacity(MAX_LABEL_LEN);
        let mut chars = s.bytes();
        loop {
            let ch = chars.next();
            match ch {
                None | Some(b'.') => {
                    if label.is_empty() {
                        return Err(NameError::EmptyLabel);
                    }
                    if label.len() > MAX_LABEL_LEN {
                        return Err(NameError::BadLabel);
                    }
                    octets.push(label.len() as u8);
                    octets.append(&mut label);
                    if ch.is_none() {
                        break;
                    }
                }
                Some(b'\\') => {
                    let first = chars.next().ok_or(NameError::BadEscape)?;
                    if first.is_ascii_digit() {
                        let second =
                            chars.next().ok_or(NameError::BadEscape)?;
                        let third =
                            chars.next().ok_or(NameError::BadEscape)?;
                        if !second.is_ascii_digit() || !third.is_ascii_digit()
                        {
                            return Err(NameError::BadEscape);
                        }
                        let value = u32::from(first - b'0') * 100
                            + u32::from(second - b'0') * 10
                            + u32::from(third - b'0');
                        let value = u8::try_from(value)
                            .map_err(|_| NameError::BadEscape)?;
                        label.push(value);
                    } else {
                        label.push(first);
                    }
                }
                Some(other) => label.push(other),
            }
        }
        octets.push(0);
        if octets.len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        Ok(Self(octets.into()))
    }
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice().eq_ignore_ascii_case(other.as_slice())
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in self.as_slice() {
            state.write_u8(ch.to_ascii_lowercase())
        }
    }
}

//--- PartialOrd and Ord

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ours, ours_len) = self.label_starts();
        let (theirs, theirs_len) = other.label_starts();
        let (ours_octets, theirs_octets) = (self.as_slice(), other.as_slice());

        let mut i = ours_len;
        let mut j = theirs_len;
        while i > 0 && j > 0 {
            i -= 1;
            j -= 1;
            let left = label_at(ours_octets, ours[i]);
            let right = label_at(theirs_octets, theirs[j]);
            let ord = left
                .iter()
                .map(u8::to_ascii_lowercase)
                .cmp(right.iter().map(u8::to_ascii_lowercase));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        ours_len.cmp(&theirs_len)
    }
}

fn label_at(octets: &[u8], start: u8) -> &[u8] {
    let start = usize::from(start);
    let len = usize::from(octets[start]);
    &octets[start + 1..start + 1 + len]
}

//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels() {
            for &ch in label {
                if ch == b'.' || ch == b'\\' {
                    write!(f, "\\{}", ch as char)?;
                } else if ch.is_ascii_graphic() {
                    write!(f, "{}", ch as char)?;
                } else {
                    write!(f, "\\{ch:03}")?;
                }
            }
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

//------------ Labels --------------------------------------------------------

/// An iterator over the labels of a name, excluding the root label.
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    octets: &'a [u8],
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.octets.split_first()?;
        if len == 0 {
            return None;
        }
        let (label, rest) = rest.split_at(usize::from(len));
        self.octets = rest;
        Some(label)
    }
}

//------------ NameError -----------------------------------------------------

/// A domain name could not be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name is longer than 255 octets.
    LongName,

    /// A label is longer than 63 octets or has an unknown label type.
    BadLabel,

    /// The text contained an empty label.
    EmptyLabel,

    /// The text contained an invalid escape sequence.
    BadEscape,

    /// The wire format ended before the root label.
    RelativeName,

    /// There was data after the root label.
    TrailingData,
}

//--- Display and Error

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameError::LongName => "long domain name",
            NameError::BadLabel => "invalid label",
            NameError::EmptyLabel => "empty label",
            NameError::BadEscape => "invalid escape sequence",
            NameError::RelativeName => "relative domain name",
            NameError::TrailingData => "trailing data after domain name",
        })
    }
}

impl std::error::Error for NameError {}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn parse_and_display() {
        let name = n("www.Example.com");
        assert_eq!(name.as_slice(), b"\x03www\x07Example\x03com\x00");
        assert_eq!(name.to_string(), "www.Example.com.");
        assert_eq!(n(".").to_string(), ".");
        assert_eq!(n("a\\.b.c").label_count(), 2);
        assert_eq!(n("\\065.c").as_slice(), b"\x01A\x01c\x00");
        assert_eq!(Name::from_str("a..b"), Err(NameError::EmptyLabel));
        assert_eq!(
            Name::from_str(&"a".repeat(64)),
            Err(NameError::BadLabel)
        );
    }

    #[test]
    fn wire_format_checks() {
        assert!(Name::from_slice(b"\x03com\x00").is_ok());
        assert_eq!(
            Name::from_slice(b"\x03com"),
            Err(NameError::RelativeName)
        );
        assert_eq!(
            Name::from_slice(b"\x03com\x00\x00"),
            Err(NameError::TrailingData)
        );
    }

    #[test]
    fn case_insensitive_eq() {
        assert_eq!(n("EXAMPLE.com"), n("example.COM"));
        assert_ne!(n("example.com"), n("example.net"));
    }

    #[test]
    fn canonical_order() {
        // The example from RFC 4034, section 6.1.
        let mut names = vec![
            n("*.z.example"),
            n("zABC.a.EXAMPLE"),
            n("example"),
            n("Z.a.example"),
            n("\\200.z.example"),
            n("a.example"),
            n("yljkjljk.a.example"),
            n("z.example"),
            n("\\001.z.example"),
        ];
        names.sort();
        let sorted: Vec<_> =
            names.iter().map(|name| name.to_string()).collect();
        assert_eq!(
            sorted,
            [
                "example.",
                "a.example.",
                "yljkjljk.a.example.",
                "Z.a.example.",
                "zABC.a.EXAMPLE.",
                "z.example.",
                "\\001.z.example.",
                "*.z.example.",
                "\\200.z.example.",
            ]
        );
    }

    #[test]
    fn ends_with() {
        assert!(n("www.example.com").ends_with(&n("EXAMPLE.com")));
        assert!(n("example.com").ends_with(&n("example.com")));
        assert!(n("example.com").ends_with(&Name::root()));
        assert!(!n("example.com").ends_with(&n("www.example.com")));
        assert!(!n("badexample.com").ends_with(&n("example.com")));
    }
}
