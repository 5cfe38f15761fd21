//! Treasury Contract
//!
//! Holds the protocol reserves and settles them against the external markets:
//! - Weth collateral is locked in the money market as it arrives
//! - Dai coming in repays the money market debt first, the rest is saved as Chai
//! - Dai going out is released from Chai savings first, the rest is borrowed
//!
//! Only orchestrated contracts (the Controller) may push or pull, and only while
//! the Treasury is live. Pushes sweep the whole balance held at call time.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::access::Orchestrated;
use crate::errors::CdpError;
use crate::events::{GrantedAccess, OwnershipTransferred, Shutdown, UnwindRegistered};
use crate::interfaces::{Cep18TokenContractRef, MoneyMarketContractRef, SavingsVaultContractRef};
use crate::math::{self, MathResult};
use crate::types::{IlkParams, SignedAmount};

/// Treasury Contract for reserve management and market settlement
#[odra::module(events = [GrantedAccess, OwnershipTransferred, Shutdown, UnwindRegistered])]
pub struct Treasury {
    /// Owner and orchestrated callers
    access: SubModule<Orchestrated>,
    /// Money market contract address
    market: Var<Address>,
    /// Chai (Dai savings) contract address
    chai: Var<Address>,
    /// Weth token contract address
    weth: Var<Address>,
    /// Dai token contract address
    dai: Var<Address>,
    /// Unwind contract, once registered
    unwind: Var<Option<Address>>,
    /// Whether push/pull are enabled
    live: Var<bool>,
}

#[odra::module]
impl Treasury {
    /// Initialize the treasury; the deployer becomes the owner
    pub fn init(&mut self, market: Address, chai: Address, weth: Address, dai: Address) {
        let owner = self.env().caller();
        self.access.init(owner);
        self.market.set(market);
        self.chai.set(chai);
        self.weth.set(weth);
        self.dai.set(dai);
        self.unwind.set(None);
        self.live.set(true);
    }

    // ========== Settlement (Orchestrated Only) ==========

    /// Use the whole Dai balance to repay market debt, save the surplus as Chai
    pub fn push_dai(&mut self) {
        self.require_live();
        self.access.require_orchestrated();

        let this = self.env().self_address();
        let balance = self.dai_token().balance_of(this);
        if balance.is_zero() {
            return;
        }

        let to_repay = balance.min(self.debt());
        if !to_repay.is_zero() {
            self.repay_market(to_repay);
        }

        let to_save = self.checked(math::sub(balance, to_repay));
        if !to_save.is_zero() {
            let chai = self.chai_address();
            self.approve(self.dai_address(), chai, to_save);
            self.savings_vault().join(to_save);
        }
    }

    /// Use Chai savings to repay market debt; what is left stays as Chai
    pub fn push_chai(&mut self) {
        self.require_live();
        self.access.require_orchestrated();

        let to_repay = self.savings().min(self.debt());
        if to_repay.is_zero() {
            return;
        }

        self.savings_vault().draw(to_repay);
        self.repay_market(to_repay);
    }

    /// Lock the whole Weth balance in the money market
    pub fn push_weth(&mut self) {
        self.require_live();
        self.access.require_orchestrated();

        let this = self.env().self_address();
        let balance = self.weth_token().balance_of(this);
        if balance.is_zero() {
            return;
        }

        self.approve(self.weth_address(), self.market_address(), balance);
        let collateral_change = self.signed(balance, false);
        self.money_market()
            .adjust_position(collateral_change, SignedAmount::zero());
    }

    /// Send `amount` Dai to `to`, releasing savings before borrowing
    pub fn pull_dai(&mut self, to: Address, amount: U256) {
        self.require_live();
        self.access.require_orchestrated();

        let to_release = self.savings().min(amount);
        if !to_release.is_zero() {
            self.savings_vault().draw(to_release);
        }

        let to_borrow = self.checked(math::sub(amount, to_release));
        if !to_borrow.is_zero() {
            self.borrow_market(to_borrow);
        }

        let dai = self.dai_address();
        self.transfer(dai, to, amount);
    }

    /// Send `amount` Chai to `to`, borrowing and wrapping Dai for any shortfall
    pub fn pull_chai(&mut self, to: Address, amount: U256) {
        self.require_live();
        self.access.require_orchestrated();

        let chi = self.savings_vault().current_index();
        let dai_amount = self.checked(math::muldrup(amount, chi));
        let to_release = self.savings().min(dai_amount);

        let to_borrow = self.checked(math::sub(dai_amount, to_release));
        if !to_borrow.is_zero() {
            self.borrow_market(to_borrow);
            let chai = self.chai_address();
            self.approve(self.dai_address(), chai, to_borrow);
            self.savings_vault().join(to_borrow);
        }

        let chai = self.chai_address();
        self.transfer(chai, to, amount);
    }

    /// Free `amount` Weth from the money market and send it to `to`
    pub fn pull_weth(&mut self, to: Address, amount: U256) {
        self.require_live();
        self.access.require_orchestrated();

        let collateral_change = self.signed(amount, true);
        self.money_market()
            .adjust_position(collateral_change, SignedAmount::zero());

        let weth = self.weth_address();
        self.transfer(weth, to, amount);
    }

    // ========== Wind-down ==========

    /// Disable push/pull for good once the money market has been caged
    pub fn shutdown(&mut self) {
        if !self.is_live() {
            return;
        }
        if self.money_market().is_live() {
            self.env().revert(CdpError::MarketStillLive);
        }
        self.live.set(false);
        self.env().emit_event(Shutdown {
            at: self.env().get_block_time(),
        });
    }

    /// Register the unwind contract and let it move the reserves (owner only,
    /// once)
    pub fn register_unwind(&mut self, unwind: Address) {
        self.access.require_owner();
        if self.get_unwind().is_some() {
            self.env().revert(CdpError::UnwindAlreadyRegistered);
        }
        self.unwind.set(Some(unwind));

        for token in [self.weth_address(), self.dai_address(), self.chai_address()] {
            self.approve(token, unwind, U256::MAX);
        }

        self.env().emit_event(UnwindRegistered { unwind });
    }

    // ========== Access ==========

    /// Grant `account` access to push/pull (owner only)
    pub fn orchestrate(&mut self, account: Address) {
        self.access.orchestrate(account);
    }

    /// Give up ownership (owner only)
    pub fn renounce_ownership(&mut self) {
        self.access.renounce_ownership();
    }

    pub fn is_orchestrated(&self, account: Address) -> bool {
        self.access.is_orchestrated(account)
    }

    pub fn owner(&self) -> Option<Address> {
        self.access.owner()
    }

    // ========== View Functions ==========

    /// Dai owed to the money market, rounded up
    pub fn debt(&self) -> U256 {
        let rate = self.ilk_params().rate;
        let units = self.debt_units();
        self.checked(math::muldrup(units, rate))
    }

    /// Dai value of the Chai held
    pub fn savings(&self) -> U256 {
        self.savings_vault().dai_of(self.env().self_address())
    }

    pub fn is_live(&self) -> bool {
        self.live.get().unwrap_or(false)
    }

    pub fn get_unwind(&self) -> Option<Address> {
        self.unwind.get().flatten()
    }

    pub fn get_market(&self) -> Option<Address> {
        self.market.get()
    }

    pub fn get_chai(&self) -> Option<Address> {
        self.chai.get()
    }

    // ========== Internal Functions ==========

    /// Wipe market debt with `amount` Dai held by the Treasury
    fn repay_market(&mut self, amount: U256) {
        let rate = self.ilk_params().rate;
        let units = self
            .checked(math::divd(amount, rate))
            .min(self.debt_units());
        self.approve(self.dai_address(), self.market_address(), amount);

        let debt_change = self.signed(units, true);
        self.money_market()
            .adjust_position(SignedAmount::zero(), debt_change);
    }

    /// Draw at least `amount` Dai from the market into the Treasury
    fn borrow_market(&mut self, amount: U256) {
        let rate = self.ilk_params().rate;
        let units = self.checked(math::divdrup(amount, rate));

        let debt_change = self.signed(units, false);
        self.money_market()
            .adjust_position(SignedAmount::zero(), debt_change);
    }

    fn approve(&self, token: Address, spender: Address, amount: U256) {
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.approve(spender, amount) {
            self.env().revert(CdpError::TokenApprovalFailed);
        }
    }

    fn transfer(&self, token: Address, recipient: Address, amount: U256) {
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.transfer(recipient, amount) {
            self.env().revert(CdpError::TokenTransferFailed);
        }
    }

    fn debt_units(&self) -> U256 {
        self.money_market()
            .position(self.env().self_address())
            .debt_units
    }

    fn ilk_params(&self) -> IlkParams {
        self.money_market().ilk_params()
    }

    fn signed(&self, amount: U256, negative: bool) -> SignedAmount {
        match math::to_signed(amount, negative) {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }

    fn checked(&self, result: MathResult) -> U256 {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }

    fn require_live(&self) {
        if !self.is_live() {
            self.env().revert(CdpError::NotLive);
        }
    }

    fn money_market(&self) -> MoneyMarketContractRef {
        MoneyMarketContractRef::new(self.env(), self.market_address())
    }

    fn savings_vault(&self) -> SavingsVaultContractRef {
        SavingsVaultContractRef::new(self.env(), self.chai_address())
    }

    fn weth_token(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env(), self.weth_address())
    }

    fn dai_token(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env(), self.dai_address())
    }

    fn market_address(&self) -> Address {
        self.market.get().unwrap_or_else(|| self.env().revert(CdpError::NotConfigured))
    }

    fn chai_address(&self) -> Address {
        self.chai.get().unwrap_or_else(|| self.env().revert(CdpError::NotConfigured))
    }

    fn weth_address(&self) -> Address {
        self.weth.get().unwrap_or_else(|| self.env().revert(CdpError::NotConfigured))
    }

    fn dai_address(&self) -> Address {
        self.dai.get().unwrap_or_else(|| self.env().revert(CdpError::NotConfigured))
    }
}
