//------------ Version -------------------------------------------------------

/// A version of zone content.
///
/// Versions are local to a zone instance and only ever increase.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(u64);

impl Version {
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }
}

//------------ Versioned -----------------------------------------------------

/// A value that changes between versions.
///
/// Each entry holds the value as of its version. An entry of `None` marks
/// the value as removed as of that version.
#[derive(Clone, Debug)]
pub struct Versioned<T> {
    data: Vec<(Version, Option<T>)>,
}

impl<T> Versioned<T> {
    pub fn new() -> Self {
        Versioned { data: Vec::new() }
    }

    pub fn get(&self, version: Version) -> Option<&T> {
        self.data
            .iter()
            .rev()
            .find(|item| item.0 <= version)
            .and_then(|item| item.1.as_ref())
    }

    pub fn update(&mut self, version: Version, value: T) {
        if let Some(last) = self.data.last_mut() {
            if last.0 == version {
                last.1 = Some(value);
                return;
            }
        }
        self.data.push((version, Some(value)))
    }

    /// Drops the last version if it is `version`.
    pub fn rollback(&mut self, version: Version) {
        if self.data.last().map(|item| item.0) == Some(version) {
            self.data.pop();
        }
    }

    pub fn remove(&mut self, version: Version) {
        // Older versions may still be read, so the value is masked for
        // `version` rather than dropped.
        let len = self.data.len();
        if let Some(last) = self.data.last_mut() {
            if last.1.is_none() {
                return;
            }
            if last.0 == version {
                if len == 1 {
                    let _ = self.data.pop();
                } else {
                    last.1 = None;
                }
                return;
            }
        }
        if !self.data.is_empty() {
            self.data.push((version, None))
        }
    }

    /// Forgets everything not visible from `oldest` or later versions.
    pub fn clean(&mut self, oldest: Version) {
        let Some(keep) = self.data.iter().rposition(|item| item.0 <= oldest)
        else {
            return;
        };
        self.data.drain(..keep);
        if matches!(self.data.first(), Some((_, None))) {
            self.data.remove(0);
        }
    }

    /// Returns whether there are no entries left at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for Versioned<T> {
    fn default() -> Self {
        Self::new()
    }
}

//------------ VersionMarker -------------------------------------------------

/// Held by everyone using a version, keeping it from being cleaned.
#[derive(Debug)]
pub struct VersionMarker;

//============ Tests =========================================================
