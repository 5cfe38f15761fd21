//! Protocol error definitions.

use odra::prelude::*;

/// fyDai protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CdpError {
    // Position invariants (1xx)
    InsufficientCollateral = 100,
    UnderCollateralized = 101,
    BelowDust = 102,

    // Arithmetic (2xx)
    MathOverflow = 200,
    MathUnderflow = 201,
    SignedCastOverflow = 202,
    DivisionByZero = 203,

    // Liveness (3xx)
    NotLive = 300,
    TreasuryStillLive = 301,
    MarketStillLive = 302,

    // Access control (4xx)
    Unauthorized = 400,
    NotOrchestrated = 401,
    NotHolderOrDelegate = 402,
    DelegateAlreadyAdded = 403,
    DelegateNotFound = 404,

    // Collaborators (5xx)
    TokenTransferFailed = 500,
    TokenApprovalFailed = 501,

    // Configuration (9xx)
    SeriesNotFound = 900,
    SeriesAlreadyExists = 901,
    NotConfigured = 902,
    SeriesMatured = 903,
    UnwindAlreadyRegistered = 904,
}

impl CdpError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Position
            CdpError::InsufficientCollateral => "Insufficient posted collateral",
            CdpError::UnderCollateralized => "Position would be under-collateralized",
            CdpError::BelowDust => "Posted collateral below dust",

            // Arithmetic
            CdpError::MathOverflow => "Arithmetic overflow",
            CdpError::MathUnderflow => "Arithmetic underflow",
            CdpError::SignedCastOverflow => "Amount exceeds signed range",
            CdpError::DivisionByZero => "Division by zero",

            // Liveness
            CdpError::NotLive => "Operation blocked: contract shut down",
            CdpError::TreasuryStillLive => "Treasury is still live",
            CdpError::MarketStillLive => "Money market is still live",

            // Access control
            CdpError::Unauthorized => "Unauthorized: caller is not owner",
            CdpError::NotOrchestrated => "Unauthorized: caller is not orchestrated",
            CdpError::NotHolderOrDelegate => "Unauthorized: caller is not holder or delegate",
            CdpError::DelegateAlreadyAdded => "Delegate already added",
            CdpError::DelegateNotFound => "Delegate not found",

            // Collaborators
            CdpError::TokenTransferFailed => "Token transfer failed",
            CdpError::TokenApprovalFailed => "Token approval failed",

            // Config
            CdpError::SeriesNotFound => "Series not found",
            CdpError::SeriesAlreadyExists => "Series already registered",
            CdpError::NotConfigured => "Collaborator address not configured",
            CdpError::SeriesMatured => "Series has matured",
            CdpError::UnwindAlreadyRegistered => "Unwind contract already registered",
        }
    }
}

impl core::fmt::Display for CdpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<CdpError> for OdraError {
    fn from(error: CdpError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
