//! `displayMode` bitmask for benefit detail requests.

use std::fmt;

use bitflags::bitflags;
use portal_rpc_sdk::BenefitRequestOptions;

bitflags! {
    /// Bit-flag encoding of the benefit display preferences.
    ///
    /// Each flag owns one bit, so every combination encodes to a distinct value.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DisplayMode: u8 {
        const GROUP_BY_SERVICE_CLASS = 0b001;
        const GROUP_BY_NETWORK_TIER  = 0b010;
        const AUTO_SORT              = 0b100;
    }
}

impl DisplayMode {
    #[must_use]
    pub fn from_options(options: &BenefitRequestOptions) -> Self {
        let mut mode = Self::empty();
        mode.set(Self::GROUP_BY_SERVICE_CLASS, options.group_by_service_class);
        mode.set(Self::GROUP_BY_NETWORK_TIER, options.group_by_network_tier);
        mode.set(Self::AUTO_SORT, options.auto_sort);
        mode
    }
}

/// The wire form is the plain decimal value.
impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
