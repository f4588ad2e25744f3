//! The scratch buffer collecting the records of one message.

use crate::base::record::Record;

use super::error::XfrError;

//------------ ScratchBuffer -------------------------------------------------

/// A buffer of fixed capacity holding records in uncompressed wire format.
///
/// The capacity is allocated once when the buffer is created. Records are
/// only pushed after checking they [fit][Self::fits], so the buffer never
/// grows.
pub struct ScratchBuffer {
    octets: Vec<u8>,

    /// For each record, the end of its owner name and the end of the record.
    bounds: Vec<(usize, usize)>,

    /// Space taken up by things other than the records.
    reserved: usize,

    limit: usize,
}

impl ScratchBuffer {
    /// Creates a buffer for up to `limit` bytes.
    pub fn with_capacity(limit: usize) -> Result<Self, XfrError> {
        let mut octets = Vec::new();
        octets.try_reserve_exact(limit)?;
        Ok(Self {
            octets,
            bounds: Vec::new(),
            reserved: 0,
            limit,
        })
    }

    /// Empties the buffer, keeping its allocation.
    pub fn clear(&mut self) {
        self.octets.clear();
        self.bounds.clear();
        self.reserved = 0;
    }

    /// Sets aside `len` bytes of the capacity.
    pub fn reserve(&mut self, len: usize) -> Result<(), XfrError> {
        if !self.fits(len) {
            return Err(XfrError::Internal("reservation exceeds capacity"));
        }
        self.reserved += len;
        Ok(())
    }

    /// Returns the number of bytes still available.
    pub fn remaining(&self) -> usize {
        self.limit - self.reserved - self.octets.len()
    }

    /// Returns whether `len` more bytes fit.
    pub fn fits(&self, len: usize) -> bool {
        len <= self.remaining()
    }

    /// Appends a record.
    ///
    /// The caller has to check that the record fits.
    pub fn push(&mut self, record: &Record) -> Result<(), XfrError> {
        let len = record.wire_len();
        if !self.fits(len) {
            return Err(XfrError::RecordTooLarge(len));
        }
        let start = self.octets.len();
        record.compose(&mut self.octets);
        self.bounds
            .push((start + record.owner().len(), self.octets.len()));
        Ok(())
    }

    /// Returns an iterator over the owner names and remainders of the
    /// records in the buffer.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        let mut start = 0;
        self.bounds.iter().map(move |&(owner_end, end)| {
            let res = (
                &self.octets[start..owner_end],
                &self.octets[owner_end..end],
            );
            start = end;
            res
        })
    }

    /// Returns the number of records in the buffer.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use core::str::FromStr;
    use std::net::Ipv4Addr;

    use crate::base::iana::Class;
    use crate::base::name::Name;
    use crate::base::record::RecordData;

    use super::*;

    fn a(owner: &str) -> Record {
        Record::new(
            Name::from_str(owner).unwrap(),
            Class::IN,
            300,
            RecordData::a(Ipv4Addr::new(192, 0, 2, 1)),
        )
    }

    #[test]
    fn fit_is_inclusive() {
        let record = a("www.example.com");
        let len = record.wire_len();
        let mut buf = ScratchBuffer::with_capacity(12 + 2 * len).unwrap();
        buf.reserve(12).unwrap();
        assert!(buf.fits(len));
        buf.push(&record).unwrap();
        assert_eq!(buf.remaining(), len);
        assert!(buf.fits(len));
        buf.push(&record).unwrap();
        assert_eq!(buf.remaining(), 0);
        assert!(!buf.fits(1));
        assert!(matches!(
            buf.push(&record),
            Err(XfrError::RecordTooLarge(l)) if l == len
        ));
        assert_eq!(buf.len(), 2);

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), buf.limit());
    }

    #[test]
    fn iter_splits_owner() {
        let mut buf = ScratchBuffer::with_capacity(512).unwrap();
        buf.push(&a("www.example.com")).unwrap();
        buf.push(&a("mail.example.com")).unwrap();
        let parts: Vec<_> = buf.iter().collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, Name::from_str("www.example.com").unwrap().as_slice());
        assert_eq!(parts[1].0, Name::from_str("mail.example.com").unwrap().as_slice());
        assert_eq!(parts[0].1.len(), 10 + 4);
        assert_eq!(parts[0].1, parts[1].1);
    }
}
