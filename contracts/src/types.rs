//! Common types used across the fyDai protocol.

use odra::casper_types::U256;

/// Collateral type identifier
#[odra::odra_type]
#[derive(Copy, PartialOrd, Ord)]
pub enum CollateralId {
    /// Wrapped ether, priced by the money market spot
    Weth,
    /// Dai savings token, priced by the savings index (chi)
    Chai,
}

/// Unsigned magnitude with a sign flag.
///
/// Casper has no native signed 256-bit integer, so balance deltas carry the
/// sign next to the magnitude. Values are only built through
/// [`crate::math::to_signed`], which keeps the magnitude inside the
/// `int256` range.
#[odra::odra_type]
#[derive(Copy)]
pub struct SignedAmount {
    /// Absolute value of the delta
    pub magnitude: U256,
    /// Whether the delta decreases the balance
    pub negative: bool,
}

impl SignedAmount {
    /// A zero delta
    pub fn zero() -> Self {
        Self {
            magnitude: U256::zero(),
            negative: false,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }
}

/// What `erase` removed from a user position
#[odra::odra_type]
#[derive(Copy)]
pub struct ErasedPosition {
    /// Posted collateral removed (in collateral units)
    pub collateral: U256,
    /// Present value of the debt removed (in Dai)
    pub debt: U256,
}

/// Position held by an account in the money market
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct MarketPosition {
    /// Collateral locked in the market
    pub locked: U256,
    /// Normalized debt (multiply by `rate` to get Dai)
    pub debt_units: U256,
}

/// Money market parameters for the Weth collateral type
#[odra::odra_type]
#[derive(Copy)]
pub struct IlkParams {
    /// Accumulated stability fee rate (RAY)
    pub rate: U256,
    /// Collateral price with safety margin applied (RAY)
    pub spot: U256,
}
