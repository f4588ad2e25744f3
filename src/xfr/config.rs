//! Configuration of outgoing zone transfers.

use core::cmp;

//------------ DefMinMax -----------------------------------------------------

/// The default, minimum, and maximum values for a config variable.
#[derive(Clone, Copy)]
struct DefMinMax<T> {
    def: T,
    min: T,
    max: T,
}

impl<T: Copy + Ord> DefMinMax<T> {
    const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    fn default(self) -> T {
        self.def
    }

    /// Trims the given value to fit into the minimum/maximum range.
    fn limit(self, value: T) -> T {
        cmp::max(self.min, cmp::min(self.max, value))
    }
}

/// The limit for the size of a single transfer message.
///
/// Messages on stream transports are preceded by a 16 bit length, so they
/// can't be larger than 65,535 bytes. They can't be smaller than the 512
/// bytes every DNS message may be long.
const MAX_MESSAGE_SIZE: DefMinMax<usize> = DefMinMax::new(65535, 512, 65535);

//------------ XfrMode -------------------------------------------------------

/// Which kinds of transfer to offer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum XfrMode {
    /// Answer IXFR requests incrementally where the history allows.
    #[default]
    AxfrAndIxfr,

    /// Answer IXFR requests with full transfers.
    AxfrOnly,
}

//------------ XfrConfig -----------------------------------------------------

/// Configuration for outgoing zone transfers.
#[derive(Clone, Debug)]
pub struct XfrConfig {
    max_message_size: usize,
    xfr_mode: XfrMode,
    one_answer: bool,
}

impl XfrConfig {
    /// Creates a new, default config.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the maximum size of a transfer message.
    ///
    /// The value is limited to between 512 and 65,535. The default value
    /// is 65,535. Space needed for signing each message is taken from this.
    pub fn set_max_message_size(&mut self, value: usize) {
        self.max_message_size = MAX_MESSAGE_SIZE.limit(value);
    }

    /// Sets which kinds of transfer to offer.
    ///
    /// The default is to offer both.
    pub fn set_xfr_mode(&mut self, value: XfrMode) {
        self.xfr_mode = value;
    }

    /// Sets whether to put only a single record in each message.
    ///
    /// Some old secondaries can't handle more. The default is `false`.
    pub fn set_one_answer(&mut self, value: bool) {
        self.one_answer = value;
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn xfr_mode(&self) -> XfrMode {
        self.xfr_mode
    }

    pub fn one_answer(&self) -> bool {
        self.one_answer
    }
}

//--- Default

impl Default for XfrConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE.default(),
            xfr_mode: XfrMode::default(),
            one_answer: false,
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_size_is_clamped() {
        let mut config = XfrConfig::new();
        assert_eq!(config.max_message_size(), 65535);
        config.set_max_message_size(100);
        assert_eq!(config.max_message_size(), 512);
        config.set_max_message_size(1_000_000);
        assert_eq!(config.max_message_size(), 65535);
        config.set_max_message_size(4096);
        assert_eq!(config.max_message_size(), 4096);
    }
}
