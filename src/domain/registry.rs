//! Asset registry contract: mint-and-track-ownership (ERC-721 subset).
//!
//! Minting records the marketplace as an approved operator for the minter,
//! so the ledger can later take custody without a separate approval call.

use std::collections::BTreeSet;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::error::MarketError;
use super::listing::{AssetId, ChainEvent};

/// Per-asset record. Asset id `n` lives at index `n - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Token {
    owner: Address,
    token_uri: String,
    approved: Option<Address>,
}

/// The asset registry contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    address: Address,
    /// Marketplace granted operator rights on every mint.
    marketplace: Address,
    tokens: Vec<Token>,
    /// (owner, operator) pairs.
    operators: BTreeSet<(Address, Address)>,
}

impl AssetRegistry {
    pub fn new(address: Address, marketplace: Address) -> Self {
        Self {
            address,
            marketplace,
            tokens: Vec::new(),
            operators: BTreeSet::new(),
        }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    pub const fn marketplace(&self) -> Address {
        self.marketplace
    }

    /// Number of assets minted so far (also the highest id).
    pub fn total_minted(&self) -> u64 {
        self.tokens.len() as u64
    }

    /// Mint the next sequential asset to `caller` with `token_uri`.
    pub fn mint(
        &mut self,
        caller: Address,
        token_uri: &str,
        events: &mut Vec<ChainEvent>,
    ) -> Result<AssetId, MarketError> {
        if caller.is_zero() {
            return Err(MarketError::ZeroAddress);
        }
        self.tokens.push(Token {
            owner: caller,
            token_uri: token_uri.to_string(),
            approved: None,
        });
        let asset_id = self.total_minted();
        events.push(ChainEvent::Transfer {
            registry: self.address,
            from: Address::ZERO,
            to: caller,
            asset_id,
        });
        self.set_approval_for_all(caller, self.marketplace, true, events);
        Ok(asset_id)
    }

    pub fn owner_of(&self, asset_id: AssetId) -> Result<Address, MarketError> {
        self.token(asset_id).map(|t| t.owner)
    }

    pub fn token_uri(&self, asset_id: AssetId) -> Result<&str, MarketError> {
        self.token(asset_id).map(|t| t.token_uri.as_str())
    }

    pub fn get_approved(&self, asset_id: AssetId) -> Result<Option<Address>, MarketError> {
        self.token(asset_id).map(|t| t.approved)
    }

    /// Number of assets held by `owner` (linear scan).
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.tokens.iter().filter(|t| t.owner == owner).count() as u64
    }

    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    pub fn set_approval_for_all(
        &mut self,
        owner: Address,
        operator: Address,
        approved: bool,
        events: &mut Vec<ChainEvent>,
    ) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
        events.push(ChainEvent::ApprovalForAll {
            registry: self.address,
            owner,
            operator,
            approved,
        });
    }

    /// Approve `to` to move a single asset. Only the owner or an operator may call.
    pub fn approve(
        &mut self,
        caller: Address,
        to: Address,
        asset_id: AssetId,
    ) -> Result<(), MarketError> {
        let owner = self.owner_of(asset_id)?;
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(MarketError::NotAuthorized {
                spender: caller,
                asset_id,
            });
        }
        self.token_mut(asset_id)?.approved = Some(to);
        Ok(())
    }

    /// Move `asset_id` from `from` to `to` on behalf of `spender`.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        asset_id: AssetId,
        events: &mut Vec<ChainEvent>,
    ) -> Result<(), MarketError> {
        let token = self.token(asset_id)?;
        if token.owner != from {
            return Err(MarketError::NotTokenOwner { from, asset_id });
        }
        if to.is_zero() {
            return Err(MarketError::ZeroAddress);
        }
        let authorized = spender == from
            || token.approved == Some(spender)
            || self.is_approved_for_all(from, spender);
        if !authorized {
            return Err(MarketError::NotAuthorized { spender, asset_id });
        }

        let token = self.token_mut(asset_id)?;
        token.owner = to;
        token.approved = None;
        events.push(ChainEvent::Transfer {
            registry: self.address,
            from,
            to,
            asset_id,
        });
        Ok(())
    }

    fn token(&self, asset_id: AssetId) -> Result<&Token, MarketError> {
        Self::index(asset_id)
            .and_then(|i| self.tokens.get(i))
            .ok_or(MarketError::UnknownAsset(asset_id))
    }

    fn token_mut(&mut self, asset_id: AssetId) -> Result<&mut Token, MarketError> {
        Self::index(asset_id)
            .and_then(|i| self.tokens.get_mut(i))
            .ok_or(MarketError::UnknownAsset(asset_id))
    }

    fn index(asset_id: AssetId) -> Option<usize> {
        asset_id.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: Address = Address::repeat_byte(0x10);
    const MARKET: Address = Address::repeat_byte(0x20);
    const ALICE: Address = Address::repeat_byte(0x01);
    const BOB: Address = Address::repeat_byte(0x02);

    fn registry() -> AssetRegistry {
        AssetRegistry::new(REGISTRY, MARKET)
    }

    #[test]
    fn test_mint_assigns_sequential_ids() {
        let mut reg = registry();
        let mut events = Vec::new();
        assert_eq!(reg.mint(ALICE, "ipfs://a", &mut events).unwrap(), 1);
        assert_eq!(reg.mint(BOB, "ipfs://b", &mut events).unwrap(), 2);
        assert_eq!(reg.owner_of(2).unwrap(), BOB);
        assert_eq!(reg.token_uri(1).unwrap(), "ipfs://a");
        assert_eq!(reg.total_minted(), 2);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_mint_approves_marketplace() {
        let mut reg = registry();
        let mut events = Vec::new();
        reg.mint(ALICE, "ipfs://a", &mut events).unwrap();
        assert!(reg.is_approved_for_all(ALICE, MARKET));
        assert!(!reg.is_approved_for_all(BOB, MARKET));
    }

    #[test]
    fn test_operator_can_transfer() {
        let mut reg = registry();
        let mut events = Vec::new();
        let id = reg.mint(ALICE, "ipfs://a", &mut events).unwrap();
        reg.transfer_from(MARKET, ALICE, MARKET, id, &mut events).unwrap();
        assert_eq!(reg.owner_of(id).unwrap(), MARKET);
        assert_eq!(reg.balance_of(ALICE), 0);
    }

    #[test]
    fn test_stranger_cannot_transfer() {
        let mut reg = registry();
        let mut events = Vec::new();
        let id = reg.mint(ALICE, "ipfs://a", &mut events).unwrap();
        let err = reg.transfer_from(BOB, ALICE, BOB, id, &mut events).unwrap_err();
        assert_eq!(err, MarketError::NotAuthorized { spender: BOB, asset_id: id });
    }

    #[test]
    fn test_transfer_from_wrong_owner() {
        let mut reg = registry();
        let mut events = Vec::new();
        let id = reg.mint(ALICE, "ipfs://a", &mut events).unwrap();
        let err = reg.transfer_from(BOB, BOB, ALICE, id, &mut events).unwrap_err();
        assert_eq!(err, MarketError::NotTokenOwner { from: BOB, asset_id: id });
    }

    #[test]
    fn test_single_approval_cleared_after_transfer() {
        let mut reg = registry();
        let mut events = Vec::new();
        let id = reg.mint(ALICE, "ipfs://a", &mut events).unwrap();
        reg.approve(ALICE, BOB, id).unwrap();
        assert_eq!(reg.get_approved(id).unwrap(), Some(BOB));
        reg.transfer_from(BOB, ALICE, BOB, id, &mut events).unwrap();
        assert_eq!(reg.get_approved(id).unwrap(), None);
    }

    #[test]
    fn test_unknown_asset() {
        let reg = registry();
        assert_eq!(reg.owner_of(0), Err(MarketError::UnknownAsset(0)));
        assert_eq!(reg.token_uri(3), Err(MarketError::UnknownAsset(3)));
    }
}
