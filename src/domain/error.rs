//! Contract rejection reasons.
//!
//! Every state-changing contract call either commits completely or fails
//! with exactly one of these variants and leaves state untouched.

use alloy::primitives::{Address, U256};
use thiserror::Error;

use super::listing::{AssetId, ListingId};

/// Rejections raised by the marketplace ledger, the asset registry and
/// the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    /// Listing price must be strictly positive.
    #[error("price must be greater than zero")]
    InvalidPrice,

    /// Attached value differs from the ledger's listing fee.
    #[error("listing fee must equal {expected} wei, got {attached}")]
    IncorrectListingFee { expected: U256, attached: U256 },

    /// Attached value differs from the listing price.
    #[error("payment must equal asking price {expected} wei, got {attached}")]
    IncorrectPayment { expected: U256, attached: U256 },

    #[error("listing {0} is already sold")]
    AlreadySold(ListingId),

    #[error("listing {0} does not exist")]
    UnknownListing(ListingId),

    /// Purchase named an asset other than the one the listing escrows.
    #[error("listing {listing_id} does not escrow asset {asset_id} of {asset_contract}")]
    AssetMismatch {
        listing_id: ListingId,
        asset_contract: Address,
        asset_id: AssetId,
    },

    #[error("asset {0} does not exist")]
    UnknownAsset(AssetId),

    #[error("{from} does not own asset {asset_id}")]
    NotTokenOwner { from: Address, asset_id: AssetId },

    /// Spender is neither the owner, the approved address, nor an operator.
    #[error("{spender} is not authorized to move asset {asset_id}")]
    NotAuthorized { spender: Address, asset_id: AssetId },

    #[error("transfer to the zero address")]
    ZeroAddress,

    #[error("no contract deployed at {0}")]
    UnknownContract(Address),

    #[error("{account} holds {available} wei, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: U256,
        required: U256,
    },

    #[error("balance of {0} overflows")]
    BalanceOverflow(Address),
}
