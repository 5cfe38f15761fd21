//! Access control building blocks shared by the Controller and the Treasury.
//!
//! - [`Orchestrated`]: an owner plus a set of orchestrated contracts allowed to
//!   call privileged entry points. The owner wires the system during setup and
//!   renounces ownership afterwards, which freezes orchestration and every
//!   other owner-only setting.
//! - [`Delegable`]: per-user delegates that may act on the user's behalf.
//!
//! Both are embedded as `SubModule`s; the parent contract exposes the entry
//! points it needs.

use odra::prelude::*;
use crate::errors::CdpError;
use crate::events::{Delegate, GrantedAccess, OwnershipTransferred};

/// Owner and orchestrated-caller registry
#[odra::module(events = [GrantedAccess, OwnershipTransferred])]
pub struct Orchestrated {
    /// Current owner, `None` once renounced
    owner: Var<Option<Address>>,
    /// Accounts allowed to call orchestrated entry points
    orchestrated: Mapping<Address, bool>,
}

#[odra::module]
impl Orchestrated {
    /// Make `owner` the initial owner
    pub fn init(&mut self, owner: Address) {
        self.owner.set(Some(owner));
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get().flatten()
    }

    pub fn is_owner(&self, account: Address) -> bool {
        self.owner().map_or(false, |owner| owner == account)
    }

    pub fn is_orchestrated(&self, account: Address) -> bool {
        self.orchestrated.get(&account).unwrap_or(false)
    }

    /// Grant `account` access to orchestrated entry points (owner only)
    pub fn orchestrate(&mut self, account: Address) {
        self.require_owner();
        self.grant(account);
    }

    /// Give up ownership for good (owner only)
    pub fn renounce_ownership(&mut self) {
        self.require_owner();
        let previous_owner = self.env().caller();
        self.owner.set(None);
        self.env().emit_event(OwnershipTransferred {
            previous_owner,
            new_owner: None,
        });
    }

    /// Grant access without an ownership check, for the parent contract's
    /// own wiring.
    pub fn grant(&mut self, account: Address) {
        self.orchestrated.set(&account, true);
        self.env().emit_event(GrantedAccess { access: account });
    }

    pub fn require_owner(&self) {
        if !self.is_owner(self.env().caller()) {
            self.env().revert(CdpError::Unauthorized);
        }
    }

    pub fn require_orchestrated(&self) {
        if !self.is_orchestrated(self.env().caller()) {
            self.env().revert(CdpError::NotOrchestrated);
        }
    }
}

/// Per-user delegate registry
#[odra::module(events = [Delegate])]
pub struct Delegable {
    /// (user, delegate) -> enabled
    delegated: Mapping<(Address, Address), bool>,
}

#[odra::module]
impl Delegable {
    pub fn is_delegate(&self, user: Address, delegate: Address) -> bool {
        self.delegated.get(&(user, delegate)).unwrap_or(false)
    }

    /// Whether `caller` may act for `holder`
    pub fn is_holder_or_delegate(&self, holder: Address, caller: Address) -> bool {
        holder == caller || self.is_delegate(holder, caller)
    }

    /// Let `delegate` act on behalf of the caller
    pub fn add_delegate(&mut self, delegate: Address) {
        let user = self.env().caller();
        if self.is_delegate(user, delegate) {
            self.env().revert(CdpError::DelegateAlreadyAdded);
        }
        self.set_delegate(user, delegate, true);
    }

    /// Stop `delegate` from acting on behalf of the caller
    pub fn revoke_delegate(&mut self, delegate: Address) {
        let user = self.env().caller();
        if !self.is_delegate(user, delegate) {
            self.env().revert(CdpError::DelegateNotFound);
        }
        self.set_delegate(user, delegate, false);
    }

    pub fn require_holder_or_delegate(&self, holder: Address) {
        if !self.is_holder_or_delegate(holder, self.env().caller()) {
            self.env().revert(CdpError::NotHolderOrDelegate);
        }
    }

    fn set_delegate(&mut self, user: Address, delegate: Address, enabled: bool) {
        self.delegated.set(&(user, delegate), enabled);
        self.env().emit_event(Delegate {
            user,
            delegate,
            enabled,
        });
    }
}
