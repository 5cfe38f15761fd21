//! Cross-contract interfaces consumed by the Controller and the Treasury.
//!
//! Argument names are part of the call ABI: Casper passes runtime arguments by
//! name, so implementations must use the same parameter names.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::{IlkParams, MarketPosition, SignedAmount};

/// CEP-18 token interface (Weth, Dai, Chai)
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
    fn balance_of(&self, account: Address) -> U256;
}

/// Fixed-maturity debt token, one contract per series
#[odra::external_contract]
pub trait FyDai {
    /// Mint debt tokens (callable by the Controller)
    fn mint(&mut self, to: Address, amount: U256);
    /// Burn debt tokens held by `from`; reverts on insufficient balance
    fn burn(&mut self, from: Address, amount: U256);
    /// Maturity timestamp of the series
    fn maturity(&self) -> u64;
    /// Whether the series has matured
    fn is_mature(&self) -> bool;
    /// Money market rate growth since maturity (RAY, >= 1)
    fn rate_growth(&self) -> U256;
    /// Savings index growth since maturity (RAY, >= 1)
    fn chi_growth(&self) -> U256;
}

/// External money market holding the Treasury's Weth-backed position.
///
/// The market moves tokens itself: locking collateral pulls Weth from the
/// caller, freeing sends it back, drawing debt sends `muld(units, rate)` Dai to
/// the caller and wiping debt pulls `muldrup(units, rate)` Dai from it.
#[odra::external_contract]
pub trait MoneyMarket {
    /// Current position of `owner`
    fn position(&self, owner: Address) -> MarketPosition;
    /// Accumulated rate and spot price of the Weth collateral type
    fn ilk_params(&self) -> IlkParams;
    /// Change the caller's locked collateral and debt units
    fn adjust_position(&mut self, collateral_change: SignedAmount, debt_change: SignedAmount);
    /// Whether the market has not been caged
    fn is_live(&self) -> bool;
}

/// Dai savings wrapper (Chai). Chai balances are read through [`Cep18Token`].
#[odra::external_contract]
pub trait SavingsVault {
    /// Savings rate accumulator (RAY)
    fn current_index(&self) -> U256;
    /// Pull `amount` Dai from the caller and mint the equivalent Chai to it
    fn join(&mut self, amount: U256);
    /// Burn Chai worth `amount` Dai from the caller and send it the Dai
    fn draw(&mut self, amount: U256);
    /// Dai value of the Chai held by `account`
    fn dai_of(&self, account: Address) -> U256;
}
