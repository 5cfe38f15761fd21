//! Collaborator contracts for host-side tests.
//!
//! Small stand-ins for the external systems the protocol talks to: CEP-18
//! tokens, fyDai series, the money market and the Chai savings wrapper.
//! Parameter names follow `fydai_cdp_contracts::interfaces`, since Casper
//! routes runtime arguments by name.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;
use fydai_cdp_contracts::interfaces::Cep18TokenContractRef;
use fydai_cdp_contracts::math;
use fydai_cdp_contracts::types::{IlkParams, MarketPosition, SignedAmount};

/// Failures raised by the mocks
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MockError {
    InsufficientBalance = 60_000,
    InsufficientAllowance = 60_001,
    UnsafePosition = 60_002,
    InsufficientPosition = 60_003,
    Math = 60_004,
}

impl From<MockError> for OdraError {
    fn from(error: MockError) -> Self {
        OdraError::user(error as u16, "mock failure")
    }
}

/// Minimal CEP-18 token with an open `mint`
#[odra::module]
pub struct MockToken {
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    total_supply: Var<U256>,
}

#[odra::module]
impl MockToken {
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.credit(to, amount);
        let supply = self.total_supply() + amount;
        self.total_supply.set(supply);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.move_tokens(owner, recipient, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            self.env().revert(MockError::InsufficientAllowance);
        }
        if allowance != U256::MAX {
            self.allowances.set(&(owner, spender), allowance - amount);
        }
        self.move_tokens(owner, recipient, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or_default()
    }

    fn move_tokens(&mut self, from: Address, to: Address, amount: U256) {
        self.debit(from, amount);
        self.credit(to, amount);
    }

    fn burn_tokens(&mut self, from: Address, amount: U256) {
        self.debit(from, amount);
        let supply = self.total_supply() - amount;
        self.total_supply.set(supply);
    }

    fn debit(&mut self, account: Address, amount: U256) {
        let balance = self.balance_of(account);
        if balance < amount {
            self.env().revert(MockError::InsufficientBalance);
        }
        self.balances.set(&account, balance - amount);
    }

    fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.balance_of(account);
        self.balances.set(&account, balance + amount);
    }
}

/// fyDai series whose maturity and growth factors are set by the test
#[odra::module]
pub struct MockFyToken {
    token: SubModule<MockToken>,
    maturity: Var<u64>,
    matured: Var<bool>,
    rate_growth: Var<U256>,
    chi_growth: Var<U256>,
}

#[odra::module]
impl MockFyToken {
    pub fn init(&mut self, maturity: u64) {
        self.maturity.set(maturity);
        self.matured.set(false);
        self.rate_growth.set(math::ray());
        self.chi_growth.set(math::ray());
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.token.mint(to, amount);
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        self.token.burn_tokens(from, amount);
    }

    pub fn maturity(&self) -> u64 {
        self.maturity.get().unwrap_or_default()
    }

    pub fn is_mature(&self) -> bool {
        self.matured.get().unwrap_or(false)
    }

    pub fn rate_growth(&self) -> U256 {
        self.rate_growth.get().unwrap_or_else(math::ray)
    }

    pub fn chi_growth(&self) -> U256 {
        self.chi_growth.get().unwrap_or_else(math::ray)
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.token.balance_of(account)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        self.token.transfer(recipient, amount)
    }

    /// Mature the series with the given growth factors
    pub fn mature(&mut self, rate_growth: U256, chi_growth: U256) {
        self.matured.set(true);
        self.rate_growth.set(rate_growth);
        self.chi_growth.set(chi_growth);
    }
}

/// Single-ilk money market.
///
/// Pulls Weth on lock, sends Dai on draw and pulls Dai on wipe. Must be
/// funded with Dai to lend.
#[odra::module]
pub struct MockMarket {
    weth: Var<Address>,
    dai: Var<Address>,
    rate: Var<U256>,
    spot: Var<U256>,
    live: Var<bool>,
    positions: Mapping<Address, MarketPosition>,
}

#[odra::module]
impl MockMarket {
    pub fn init(&mut self, weth: Address, dai: Address, rate: U256, spot: U256) {
        self.weth.set(weth);
        self.dai.set(dai);
        self.rate.set(rate);
        self.spot.set(spot);
        self.live.set(true);
    }

    pub fn position(&self, owner: Address) -> MarketPosition {
        self.positions.get(&owner).unwrap_or_default()
    }

    pub fn ilk_params(&self) -> IlkParams {
        IlkParams {
            rate: self.rate.get().unwrap_or_else(math::ray),
            spot: self.spot.get().unwrap_or_default(),
        }
    }

    pub fn adjust_position(&mut self, collateral_change: SignedAmount, debt_change: SignedAmount) {
        let owner = self.env().caller();
        let this = self.env().self_address();
        let params = self.ilk_params();
        let mut position = self.position(owner);

        if !collateral_change.is_zero() {
            let mut weth = self.token(self.weth.get());
            let amount = collateral_change.magnitude;
            if collateral_change.negative {
                position.locked = self.less(position.locked, amount);
                weth.transfer(owner, amount);
            } else {
                weth.transfer_from(owner, this, amount);
                position.locked = position.locked + amount;
            }
        }

        if !debt_change.is_zero() {
            let mut dai = self.token(self.dai.get());
            let units = debt_change.magnitude;
            if debt_change.negative {
                position.debt_units = self.less(position.debt_units, units);
                let owed = self.math(math::muldrup(units, params.rate));
                dai.transfer_from(owner, this, owed);
            } else {
                position.debt_units = position.debt_units + units;
                let drawn = self.math(math::muld(units, params.rate));
                dai.transfer(owner, drawn);
            }
        }

        let power = self.math(math::muld(position.locked, params.spot));
        let debt = self.math(math::muld(position.debt_units, params.rate));
        if debt > power {
            self.env().revert(MockError::UnsafePosition);
        }
        self.positions.set(&owner, position);
    }

    pub fn is_live(&self) -> bool {
        self.live.get().unwrap_or(false)
    }

    pub fn cage(&mut self) {
        self.live.set(false);
    }

    pub fn set_rate(&mut self, rate: U256) {
        self.rate.set(rate);
    }

    pub fn set_spot(&mut self, spot: U256) {
        self.spot.set(spot);
    }

    fn token(&self, address: Option<Address>) -> Cep18TokenContractRef {
        match address {
            Some(address) => Cep18TokenContractRef::new(self.env(), address),
            None => self.env().revert(MockError::Math),
        }
    }

    fn less(&self, value: U256, amount: U256) -> U256 {
        match value.checked_sub(amount) {
            Some(rest) => rest,
            None => self.env().revert(MockError::InsufficientPosition),
        }
    }

    fn math(&self, result: math::MathResult) -> U256 {
        result.unwrap_or_else(|_| self.env().revert(MockError::Math))
    }
}

/// Chai: a CEP-18 token wrapping Dai at the savings index `chi`
#[odra::module]
pub struct MockChai {
    token: SubModule<MockToken>,
    dai: Var<Address>,
    chi: Var<U256>,
}

#[odra::module]
impl MockChai {
    pub fn init(&mut self, dai: Address, chi: U256) {
        self.dai.set(dai);
        self.chi.set(chi);
    }

    pub fn current_index(&self) -> U256 {
        self.chi.get().unwrap_or_else(math::ray)
    }

    pub fn join(&mut self, amount: U256) {
        let caller = self.env().caller();
        let this = self.env().self_address();
        self.dai_token().transfer_from(caller, this, amount);
        let chai = self.math(math::divd(amount, self.current_index()));
        self.token.mint(caller, chai);
    }

    pub fn draw(&mut self, amount: U256) {
        let caller = self.env().caller();
        let chai = self.math(math::divdrup(amount, self.current_index()));
        self.token.burn_tokens(caller, chai);
        self.dai_token().transfer(caller, amount);
    }

    pub fn dai_of(&self, account: Address) -> U256 {
        self.math(math::muld(self.token.balance_of(account), self.current_index()))
    }

    pub fn set_chi(&mut self, chi: U256) {
        self.chi.set(chi);
    }

    // CEP-18 surface

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.token.mint(to, amount);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        self.token.transfer(recipient, amount)
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        self.token.transfer_from(owner, recipient, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.token.approve(spender, amount)
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.token.balance_of(account)
    }

    fn dai_token(&self) -> Cep18TokenContractRef {
        match self.dai.get() {
            Some(dai) => Cep18TokenContractRef::new(self.env(), dai),
            None => self.env().revert(MockError::Math),
        }
    }

    fn math(&self, result: math::MathResult) -> U256 {
        result.unwrap_or_else(|_| self.env().revert(MockError::Math))
    }
}
