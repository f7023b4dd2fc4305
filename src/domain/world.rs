//! Execution environment for the two contracts.
//!
//! `WorldState` owns balances and every deployed registry and marketplace.
//! Emitted events leave through the `Receipt` of the call. Each state-changing call runs against a scratch
//! copy of the state: attached value moves caller → contract first, then the
//! contract logic runs. Any error drops the copy; success replaces the state
//! wholesale. Calls are therefore atomic, and totally ordered by whoever
//! owns the `WorldState`.

use std::collections::{BTreeMap, HashMap};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::balances::Balances;
use super::error::MarketError;
use super::listing::{AssetId, ChainEvent, Listing, ListingId};
use super::marketplace::Marketplace;
use super::registry::AssetRegistry;

/// Caller identity and attached native value of a contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub value: U256,
}

impl Call {
    pub const fn new(caller: Address, value: U256) -> Self {
        Self { caller, value }
    }

    /// A call with no value attached.
    pub const fn plain(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
        }
    }
}

/// Result of a committed call: its return value and the events it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub block: u64,
    pub output: T,
    pub events: Vec<ChainEvent>,
}

/// Complete platform state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    chain_id: u64,
    block: u64,
    balances: Balances,
    nonces: HashMap<Address, u64>,
    registries: BTreeMap<Address, AssetRegistry>,
    markets: BTreeMap<Address, Marketplace>,
}

impl WorldState {
    /// Fresh state with `genesis` accounts pre-funded.
    pub fn genesis(
        chain_id: u64,
        genesis: impl IntoIterator<Item = (Address, U256)>,
    ) -> Result<Self, MarketError> {
        let mut state = Self {
            chain_id,
            ..Self::default()
        };
        for (account, amount) in genesis {
            state.balances.credit(account, amount)?;
        }
        Ok(state)
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Height of the last committed block.
    pub const fn block(&self) -> u64 {
        self.block
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.balance_of(account)
    }

    pub fn market(&self, address: Address) -> Result<&Marketplace, MarketError> {
        self.markets
            .get(&address)
            .ok_or(MarketError::UnknownContract(address))
    }

    pub fn registry(&self, address: Address) -> Result<&AssetRegistry, MarketError> {
        self.registries
            .get(&address)
            .ok_or(MarketError::UnknownContract(address))
    }

    // ── Deployment ─────────────────────────────────────────

    /// Deploy a marketplace owned by `deployer` charging `listing_fee`.
    pub fn deploy_marketplace(
        &mut self,
        deployer: Address,
        listing_fee: U256,
    ) -> Result<Receipt<Address>, MarketError> {
        self.transact(Call::plain(deployer), |scratch, _events| {
            let address = scratch.next_contract_address(deployer);
            scratch
                .markets
                .insert(address, Marketplace::new(address, deployer, listing_fee));
            Ok(address)
        })
    }

    /// Deploy a registry that grants `marketplace` operator rights on mint.
    pub fn deploy_registry(
        &mut self,
        deployer: Address,
        marketplace: Address,
    ) -> Result<Receipt<Address>, MarketError> {
        self.transact(Call::plain(deployer), |scratch, _events| {
            let address = scratch.next_contract_address(deployer);
            scratch
                .registries
                .insert(address, AssetRegistry::new(address, marketplace));
            Ok(address)
        })
    }

    // ── Registry calls ─────────────────────────────────────

    pub fn mint(
        &mut self,
        caller: Address,
        registry: Address,
        token_uri: &str,
    ) -> Result<Receipt<AssetId>, MarketError> {
        self.transact(Call::plain(caller), |scratch, events| {
            scratch
                .registries
                .get_mut(&registry)
                .ok_or(MarketError::UnknownContract(registry))?
                .mint(caller, token_uri, events)
        })
    }

    /// Grant or revoke `operator` rights over all of `caller`'s assets.
    pub fn set_approval_for_all(
        &mut self,
        caller: Address,
        registry: Address,
        operator: Address,
        approved: bool,
    ) -> Result<Receipt<()>, MarketError> {
        self.transact(Call::plain(caller), |scratch, events| {
            scratch
                .registries
                .get_mut(&registry)
                .ok_or(MarketError::UnknownContract(registry))?
                .set_approval_for_all(caller, operator, approved, events);
            Ok(())
        })
    }

    pub fn approve(
        &mut self,
        caller: Address,
        registry: Address,
        to: Address,
        asset_id: AssetId,
    ) -> Result<Receipt<()>, MarketError> {
        self.transact(Call::plain(caller), |scratch, _events| {
            scratch
                .registries
                .get_mut(&registry)
                .ok_or(MarketError::UnknownContract(registry))?
                .approve(caller, to, asset_id)
        })
    }

    // ── Marketplace calls ──────────────────────────────────

    pub fn create_listing(
        &mut self,
        call: Call,
        market: Address,
        asset_contract: Address,
        asset_id: AssetId,
        price: U256,
    ) -> Result<Receipt<ListingId>, MarketError> {
        self.transact(call, |scratch, events| {
            scratch.pay_contract(call, market)?;
            let Self {
                markets,
                registries,
                ..
            } = scratch;
            let ledger = markets
                .get_mut(&market)
                .ok_or(MarketError::UnknownContract(market))?;
            let registry = registries
                .get_mut(&asset_contract)
                .ok_or(MarketError::UnknownContract(asset_contract))?;
            ledger.create_listing(&call, registry, asset_id, price, events)
        })
    }

    pub fn purchase(
        &mut self,
        call: Call,
        market: Address,
        asset_contract: Address,
        asset_id: AssetId,
        listing_id: ListingId,
    ) -> Result<Receipt<()>, MarketError> {
        self.transact(call, |scratch, events| {
            scratch.pay_contract(call, market)?;
            let Self {
                markets,
                registries,
                balances,
                ..
            } = scratch;
            let ledger = markets
                .get_mut(&market)
                .ok_or(MarketError::UnknownContract(market))?;
            let registry = registries
                .get_mut(&asset_contract)
                .ok_or(MarketError::UnknownContract(asset_contract))?;
            ledger.purchase(&call, registry, balances, asset_id, listing_id, events)
        })
    }

    // ── Views ──────────────────────────────────────────────

    pub fn fetch_unsold_listings(&self, market: Address) -> Result<Vec<Listing>, MarketError> {
        Ok(self.market(market)?.fetch_unsold_listings())
    }

    pub fn fetch_listings_owned_by(
        &self,
        market: Address,
        owner: Address,
    ) -> Result<Vec<Listing>, MarketError> {
        Ok(self.market(market)?.fetch_listings_owned_by(owner))
    }

    pub fn fetch_listings_created_by(
        &self,
        market: Address,
        seller: Address,
    ) -> Result<Vec<Listing>, MarketError> {
        Ok(self.market(market)?.fetch_listings_created_by(seller))
    }

    // ── Internals ──────────────────────────────────────────

    /// Run `f` against a scratch copy; commit only on success.
    fn transact<T, F>(&mut self, call: Call, f: F) -> Result<Receipt<T>, MarketError>
    where
        F: FnOnce(&mut Self, &mut Vec<ChainEvent>) -> Result<T, MarketError>,
    {
        let mut scratch = self.clone();
        let mut events = Vec::new();
        let output = f(&mut scratch, &mut events)?;

        *scratch.nonces.entry(call.caller).or_insert(0) += 1;
        scratch.block += 1;
        let block = scratch.block;

        *self = scratch;
        Ok(Receipt {
            block,
            output,
            events,
        })
    }

    /// Move the attached value from caller to the called contract.
    fn pay_contract(&mut self, call: Call, contract: Address) -> Result<(), MarketError> {
        self.balances.transfer(call.caller, contract, call.value)
    }

    /// CREATE-style address: keccak(rlp(sender, nonce)).
    fn next_contract_address(&self, deployer: Address) -> Address {
        let nonce = self.nonces.get(&deployer).copied().unwrap_or(0);
        deployer.create(nonce)
    }
}
