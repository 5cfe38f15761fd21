//! Controller Contract
//!
//! User-facing ledger of the protocol. Tracks, per collateral type:
//! - collateral posted by each user
//! - nominal fyDai debt of each user in each registered series
//!
//! Debt is valued in Dai through the series growth factors: a fyDai is worth
//! one Dai until maturity, and afterwards grows with the money market rate
//! (Weth-backed debt) or the savings index (Chai-backed debt).
//!
//! Every state change that could weaken a position is checked after the
//! ledger update and before any asset leaves the protocol; a failed check
//! reverts the whole call.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::access::{Delegable, Orchestrated};
use crate::errors::CdpError;
use crate::events::{Borrowed, Delegate, GrantedAccess, OwnershipTransferred, Posted, SeriesAdded, Shutdown};
use crate::interfaces::{Cep18TokenContractRef, FyDaiContractRef, MoneyMarketContractRef, SavingsVaultContractRef};
use crate::math::{self, MathResult};
use crate::treasury::TreasuryContractRef;
use crate::types::{CollateralId, ErasedPosition};

/// Minimum non-zero Weth position (0.05 WETH)
pub const DUST: u128 = 50_000_000_000_000_000;

/// Controller Contract
#[odra::module(events = [
    Posted,
    Borrowed,
    SeriesAdded,
    Shutdown,
    Delegate,
    GrantedAccess,
    OwnershipTransferred
])]
pub struct Controller {
    /// Owner and orchestrated callers
    access: SubModule<Orchestrated>,
    /// User delegates
    delegation: SubModule<Delegable>,
    /// Treasury contract address
    treasury: Var<Address>,
    /// Money market contract address (Weth spot)
    market: Var<Address>,
    /// Chai contract address (savings index, Chai token)
    chai: Var<Address>,
    /// Weth token contract address
    weth: Var<Address>,
    /// Dai token contract address
    dai: Var<Address>,
    /// Maturity -> fyDai contract
    series: Mapping<u64, Address>,
    /// Registration index -> maturity
    series_iterator: Mapping<u32, u64>,
    /// Number of registered series
    series_count: Var<u32>,
    /// (collateral, user) -> posted collateral
    posted: Mapping<(CollateralId, Address), U256>,
    /// (collateral, maturity, user) -> nominal fyDai debt
    debt_fy_dai: Mapping<(CollateralId, u64, Address), U256>,
    /// Whether user operations are enabled
    live: Var<bool>,
}

#[odra::module]
impl Controller {
    /// Initialize the controller; the deployer becomes the owner
    pub fn init(
        &mut self,
        treasury: Address,
        market: Address,
        chai: Address,
        weth: Address,
        dai: Address,
    ) {
        let owner = self.env().caller();
        self.access.init(owner);
        self.treasury.set(treasury);
        self.market.set(market);
        self.chai.set(chai);
        self.weth.set(weth);
        self.dai.set(dai);
        self.series_count.set(0);
        self.live.set(true);
    }

    // ========== Series Registry ==========

    /// Register a fyDai series under its maturity (owner only).
    ///
    /// Registration closes when the owner renounces ownership.
    pub fn add_series(&mut self, fy_dai: Address) {
        self.access.require_owner();

        let maturity = FyDaiContractRef::new(self.env(), fy_dai).maturity();
        if self.contains_series(maturity) {
            self.env().revert(CdpError::SeriesAlreadyExists);
        }

        let index = self.total_series();
        self.series.set(&maturity, fy_dai);
        self.series_iterator.set(&index, maturity);
        self.series_count.set(index + 1);

        self.env().emit_event(SeriesAdded { maturity, fy_dai });
    }

    pub fn total_series(&self) -> u32 {
        self.series_count.get().unwrap_or(0)
    }

    /// Maturity registered at `index` (registration order)
    pub fn series_maturity(&self, index: u32) -> Option<u64> {
        self.series_iterator.get(&index)
    }

    pub fn contains_series(&self, maturity: u64) -> bool {
        self.series.get(&maturity).is_some()
    }

    pub fn series_fy_dai(&self, maturity: u64) -> Option<Address> {
        self.series.get(&maturity)
    }

    // ========== Collateral ==========

    /// Post `amount` collateral from `from` to the position of `to`
    pub fn post(&mut self, collateral: CollateralId, from: Address, to: Address, amount: U256) {
        self.require_live();
        self.delegation.require_holder_or_delegate(from);

        let posted = self.checked(math::add(self.posted(collateral, to), amount));
        self.posted.set(&(collateral, to), posted);
        if !self.above_dust_or_zero(collateral, to) {
            self.env().revert(CdpError::BelowDust);
        }

        let treasury = self.treasury_address();
        self.transfer_from(self.collateral_token(collateral), from, treasury, amount);
        match collateral {
            CollateralId::Weth => self.treasury_ref().push_weth(),
            CollateralId::Chai => self.treasury_ref().push_chai(),
        }

        self.env().emit_event(Posted {
            collateral,
            user: to,
            amount,
            negative: false,
        });
    }

    /// Withdraw `amount` collateral from the position of `from` to `to`
    pub fn withdraw(&mut self, collateral: CollateralId, from: Address, to: Address, amount: U256) {
        self.require_live();
        self.delegation.require_holder_or_delegate(from);

        let posted = match self.posted(collateral, from).checked_sub(amount) {
            Some(posted) => posted,
            None => self.env().revert(CdpError::InsufficientCollateral),
        };
        self.posted.set(&(collateral, from), posted);

        if !self.is_collateralized(collateral, from) {
            self.env().revert(CdpError::UnderCollateralized);
        }
        if !self.above_dust_or_zero(collateral, from) {
            self.env().revert(CdpError::BelowDust);
        }

        match collateral {
            CollateralId::Weth => self.treasury_ref().pull_weth(to, amount),
            CollateralId::Chai => self.treasury_ref().pull_chai(to, amount),
        }

        self.env().emit_event(Posted {
            collateral,
            user: from,
            amount,
            negative: true,
        });
    }

    // ========== Debt ==========

    /// Borrow `fy_dai_amount` fyDai of series `maturity` against the
    /// `collateral` position of `from`, minting them to `to`.
    ///
    /// Matured series only accept repayments.
    pub fn borrow(
        &mut self,
        collateral: CollateralId,
        maturity: u64,
        from: Address,
        to: Address,
        fy_dai_amount: U256,
    ) {
        self.require_live();
        let mut fy_dai = self.fy_dai_ref(maturity);
        if fy_dai.is_mature() {
            self.env().revert(CdpError::SeriesMatured);
        }
        self.delegation.require_holder_or_delegate(from);

        let debt = self.checked(math::add(
            self.debt_fy_dai(collateral, maturity, from),
            fy_dai_amount,
        ));
        self.debt_fy_dai.set(&(collateral, maturity, from), debt);

        if !self.is_collateralized(collateral, from) {
            self.env().revert(CdpError::UnderCollateralized);
        }

        fy_dai.mint(to, fy_dai_amount);

        self.env().emit_event(Borrowed {
            collateral,
            maturity,
            user: from,
            amount: fy_dai_amount,
            negative: false,
        });
    }

    /// Repay the debt of `to` burning fyDai held by `from`.
    ///
    /// Repayment is capped at the outstanding debt; returns the fyDai burnt.
    pub fn repay_fy_dai(
        &mut self,
        collateral: CollateralId,
        maturity: u64,
        from: Address,
        to: Address,
        fy_dai_amount: U256,
    ) -> U256 {
        self.require_live();
        let mut fy_dai = self.fy_dai_ref(maturity);
        self.delegation.require_holder_or_delegate(from);

        let to_repay = fy_dai_amount.min(self.debt_fy_dai(collateral, maturity, to));
        fy_dai.burn(from, to_repay);
        self.reduce_debt(collateral, maturity, to, to_repay);

        to_repay
    }

    /// Repay the debt of `to` with Dai taken from `from`.
    ///
    /// Repayment is capped at the present value of the outstanding debt;
    /// returns the Dai taken.
    pub fn repay_dai(
        &mut self,
        collateral: CollateralId,
        maturity: u64,
        from: Address,
        to: Address,
        dai_amount: U256,
    ) -> U256 {
        self.require_live();
        // Validates the series before anything moves
        self.fy_dai_ref(maturity);
        self.delegation.require_holder_or_delegate(from);

        let nominal_debt = self.debt_fy_dai(collateral, maturity, to);
        let present_debt = self.in_dai(collateral, maturity, nominal_debt);
        let to_repay = dai_amount.min(present_debt);

        let (dai, treasury) = (self.dai_address(), self.treasury_address());
        self.transfer_from(dai, from, treasury, to_repay);
        self.treasury_ref().push_dai();

        // Settling the full present value clears the rounding remainder too
        let fy_dai_repaid = if to_repay == present_debt {
            nominal_debt
        } else {
            self.in_fy_dai(collateral, maturity, to_repay)
        };
        self.reduce_debt(collateral, maturity, to, fy_dai_repaid);

        to_repay
    }

    // ========== Wind-down ==========

    /// Remove all collateral and debt of `user` for `collateral`
    /// (orchestrated only). Returns what was removed; debt is valued in Dai.
    pub fn erase(&mut self, collateral: CollateralId, user: Address) -> ErasedPosition {
        self.access.require_orchestrated();

        let mut debt = U256::zero();
        for index in 0..self.total_series() {
            let maturity = self.maturity_at(index);
            let nominal = self.debt_fy_dai(collateral, maturity, user);
            if nominal.is_zero() {
                continue;
            }
            debt = self.checked(math::add(debt, self.in_dai(collateral, maturity, nominal)));
            self.debt_fy_dai.set(&(collateral, maturity, user), U256::zero());
        }

        let posted = self.posted(collateral, user);
        self.posted.set(&(collateral, user), U256::zero());

        ErasedPosition {
            collateral: posted,
            debt,
        }
    }

    /// Disable user operations for good; the Treasury must be shut down first
    pub fn shutdown(&mut self) {
        if !self.is_live() {
            return;
        }
        if self.treasury_ref().is_live() {
            self.env().revert(CdpError::TreasuryStillLive);
        }
        self.live.set(false);
        self.env().emit_event(Shutdown {
            at: self.env().get_block_time(),
        });
    }

    // ========== Delegation & Access ==========

    /// Allow `delegate` to post, withdraw, borrow and repay for the caller
    pub fn add_delegate(&mut self, delegate: Address) {
        self.delegation.add_delegate(delegate);
    }

    pub fn revoke_delegate(&mut self, delegate: Address) {
        self.delegation.revoke_delegate(delegate);
    }

    pub fn is_delegate(&self, user: Address, delegate: Address) -> bool {
        self.delegation.is_delegate(user, delegate)
    }

    /// Grant `account` access to `erase` (owner only)
    pub fn orchestrate(&mut self, account: Address) {
        self.access.orchestrate(account);
    }

    /// Give up ownership, closing series registration (owner only)
    pub fn renounce_ownership(&mut self) {
        self.access.renounce_ownership();
    }

    pub fn is_orchestrated(&self, account: Address) -> bool {
        self.access.is_orchestrated(account)
    }

    pub fn owner(&self) -> Option<Address> {
        self.access.owner()
    }

    // ========== Valuation ==========

    /// Dai value of `fy_dai_amount` fyDai of series `maturity`
    pub fn in_dai(&self, collateral: CollateralId, maturity: u64, fy_dai_amount: U256) -> U256 {
        let fy_dai = self.fy_dai_ref(maturity);
        if !fy_dai.is_mature() {
            return fy_dai_amount;
        }
        let growth = Self::growth(collateral, &fy_dai);
        self.checked(math::muld(fy_dai_amount, growth))
    }

    /// fyDai of series `maturity` worth `dai_amount` Dai
    pub fn in_fy_dai(&self, collateral: CollateralId, maturity: u64, dai_amount: U256) -> U256 {
        let fy_dai = self.fy_dai_ref(maturity);
        if !fy_dai.is_mature() {
            return dai_amount;
        }
        let growth = Self::growth(collateral, &fy_dai);
        self.checked(math::divd(dai_amount, growth))
    }

    /// Nominal fyDai debt of `user`
    pub fn debt_fy_dai(&self, collateral: CollateralId, maturity: u64, user: Address) -> U256 {
        self.debt_fy_dai
            .get(&(collateral, maturity, user))
            .unwrap_or(U256::zero())
    }

    /// Debt of `user` in series `maturity`, valued in Dai
    pub fn debt_dai(&self, collateral: CollateralId, maturity: u64, user: Address) -> U256 {
        let nominal = self.debt_fy_dai(collateral, maturity, user);
        self.in_dai(collateral, maturity, nominal)
    }

    /// Debt of `user` across all series, valued in Dai
    pub fn total_debt_dai(&self, collateral: CollateralId, user: Address) -> U256 {
        let mut total = U256::zero();
        for index in 0..self.total_series() {
            let maturity = self.maturity_at(index);
            let nominal = self.debt_fy_dai(collateral, maturity, user);
            if !nominal.is_zero() {
                total = self.checked(math::add(total, self.in_dai(collateral, maturity, nominal)));
            }
        }
        total
    }

    /// Collateral posted by `user`
    pub fn posted(&self, collateral: CollateralId, user: Address) -> U256 {
        self.posted.get(&(collateral, user)).unwrap_or(U256::zero())
    }

    /// Dai value of the collateral posted by `user`
    pub fn power_of(&self, collateral: CollateralId, user: Address) -> U256 {
        let price = self.price(collateral);
        self.checked(math::muld(self.posted(collateral, user), price))
    }

    /// Collateral needed to cover the current debt of `user`, rounded up
    pub fn locked(&self, collateral: CollateralId, user: Address) -> U256 {
        let price = self.price(collateral);
        self.checked(math::divdrup(self.total_debt_dai(collateral, user), price))
    }

    pub fn is_collateralized(&self, collateral: CollateralId, user: Address) -> bool {
        self.power_of(collateral, user) >= self.total_debt_dai(collateral, user)
    }

    /// Whether the position of `user` is either empty or above dust.
    /// Only Weth positions have a dust limit.
    pub fn above_dust_or_zero(&self, collateral: CollateralId, user: Address) -> bool {
        if collateral != CollateralId::Weth {
            return true;
        }
        let posted = self.posted(collateral, user);
        posted.is_zero() || posted > U256::from(DUST)
    }

    pub fn is_live(&self) -> bool {
        self.live.get().unwrap_or(false)
    }

    pub fn get_treasury(&self) -> Option<Address> {
        self.treasury.get()
    }

    // ========== Internal Functions ==========

    fn reduce_debt(&mut self, collateral: CollateralId, maturity: u64, user: Address, fy_dai_amount: U256) {
        let debt = self.checked(math::sub(
            self.debt_fy_dai(collateral, maturity, user),
            fy_dai_amount,
        ));
        self.debt_fy_dai.set(&(collateral, maturity, user), debt);

        self.env().emit_event(Borrowed {
            collateral,
            maturity,
            user,
            amount: fy_dai_amount,
            negative: true,
        });
    }

    /// Spot price for Weth, savings index for Chai
    fn price(&self, collateral: CollateralId) -> U256 {
        match collateral {
            CollateralId::Weth => {
                MoneyMarketContractRef::new(self.env(), self.market_address())
                    .ilk_params()
                    .spot
            }
            CollateralId::Chai => {
                SavingsVaultContractRef::new(self.env(), self.chai_address()).current_index()
            }
        }
    }

    /// Post-maturity growth factor applied to debt backed by `collateral`
    fn growth(collateral: CollateralId, fy_dai: &FyDaiContractRef) -> U256 {
        match collateral {
            CollateralId::Weth => fy_dai.rate_growth(),
            CollateralId::Chai => fy_dai.chi_growth(),
        }
    }

    fn maturity_at(&self, index: u32) -> u64 {
        self.series_iterator
            .get(&index)
            .unwrap_or_else(|| self.env().revert(CdpError::SeriesNotFound))
    }

    fn fy_dai_ref(&self, maturity: u64) -> FyDaiContractRef {
        match self.series.get(&maturity) {
            Some(fy_dai) => FyDaiContractRef::new(self.env(), fy_dai),
            None => self.env().revert(CdpError::SeriesNotFound),
        }
    }

    fn treasury_ref(&self) -> TreasuryContractRef {
        TreasuryContractRef::new(self.env(), self.treasury_address())
    }

    fn collateral_token(&self, collateral: CollateralId) -> Address {
        match collateral {
            CollateralId::Weth => self.weth_address(),
            CollateralId::Chai => self.chai_address(),
        }
    }

    fn transfer_from(&self, token: Address, owner: Address, recipient: Address, amount: U256) {
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.transfer_from(owner, recipient, amount) {
            self.env().revert(CdpError::TokenTransferFailed);
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

    fn treasury_address(&self) -> Address {
        self.treasury.get().unwrap_or_else(|| self.env().revert(CdpError::NotConfigured))
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
