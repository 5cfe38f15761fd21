//! Events emitted by the protocol contracts.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::CollateralId;

/// Posted collateral of `user` changed by `amount`, a decrease when `negative`
#[odra::event]
pub struct Posted {
    pub collateral: CollateralId,
    pub user: Address,
    pub amount: U256,
    pub negative: bool,
}

/// Nominal fyDai debt of `user` in series `maturity` changed by `amount`,
/// a decrease when `negative`
#[odra::event]
pub struct Borrowed {
    pub collateral: CollateralId,
    pub maturity: u64,
    pub user: Address,
    pub amount: U256,
    pub negative: bool,
}

/// A fyDai series was registered
#[odra::event]
pub struct SeriesAdded {
    pub maturity: u64,
    pub fy_dai: Address,
}

/// `user` enabled or disabled `delegate`
#[odra::event]
pub struct Delegate {
    pub user: Address,
    pub delegate: Address,
    pub enabled: bool,
}

/// `access` may call orchestrated entry points
#[odra::event]
pub struct GrantedAccess {
    pub access: Address,
}

#[odra::event]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Option<Address>,
}

/// The Treasury granted the unwind contract access to its reserves
#[odra::event]
pub struct UnwindRegistered {
    pub unwind: Address,
}

/// A contract left the live state
#[odra::event]
pub struct Shutdown {
    pub at: u64,
}
