//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that the contracts and the execution
//! environment maintain their invariants across random call sequences.

use alloy::primitives::{Address, U256};
use proptest::prelude::*;

use nft_marketplace::domain::balances::Balances;
use nft_marketplace::domain::world::{Call, WorldState};

const DEPLOYER: Address = Address::repeat_byte(0x0d);
const FEE: u64 = 25;

fn account(index: u8) -> Address {
    Address::repeat_byte(0x10 + index)
}

/// A random client action against a deployed pair.
#[derive(Debug, Clone)]
enum Action {
    Mint { who: u8 },
    List { who: u8, asset: u64, price: u64, fee: u64 },
    Buy { who: u8, listing: u64, payment: u64 },
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..4).prop_map(|who| Action::Mint { who }),
        (0u8..4, 1u64..8, 0u64..2_000, prop_oneof![Just(FEE), 0u64..50]).prop_map(
            |(who, asset, price, fee)| Action::List { who, asset, price, fee }
        ),
        (0u8..4, 1u64..8, 0u64..2_000)
            .prop_map(|(who, listing, payment)| Action::Buy { who, listing, payment }),
    ]
}

fn deployed() -> (WorldState, Address, Address) {
    let genesis = std::iter::once(DEPLOYER)
        .chain((0..4).map(account))
        .map(|a| (a, U256::from(1_000_000u64)));
    let mut world = WorldState::genesis(1337, genesis).unwrap();
    let market = world.deploy_marketplace(DEPLOYER, U256::from(FEE)).unwrap().output;
    let registry = world.deploy_registry(DEPLOYER, market).unwrap().output;
    (world, market, registry)
}

fn total_value(world: &WorldState, market: Address) -> U256 {
    std::iter::once(DEPLOYER)
        .chain((0..4).map(account))
        .chain(std::iter::once(market))
        .fold(U256::ZERO, |acc, a| acc + world.balance_of(a))
}

fn apply(world: &mut WorldState, market: Address, registry: Address, action: &Action) -> bool {
    match *action {
        Action::Mint { who } => world.mint(account(who), registry, "ipfs://doc").is_ok(),
        Action::List { who, asset, price, fee } => world
            .create_listing(
                Call::new(account(who), U256::from(fee)),
                market,
                registry,
                asset,
                U256::from(price),
            )
            .is_ok(),
        Action::Buy { who, listing, payment } => {
            let asset = world
                .market(market)
                .ok()
                .and_then(|m| m.listing(listing).ok())
                .map_or(0, |l| l.asset_id);
            world
                .purchase(
                    Call::new(account(who), U256::from(payment)),
                    market,
                    registry,
                    asset,
                    listing,
                )
                .is_ok()
        }
    }
}

// ── Balances ────────────────────────────────────────────────

proptest! {
    /// Transfers never create or destroy value.
    #[test]
    fn transfers_conserve_supply(
        start in 0u64..1_000_000,
        amounts in prop::collection::vec(0u64..2_000_000, 1..20),
    ) {
        let (a, b) = (account(0), account(1));
        let mut balances = Balances::new();
        balances.credit(a, U256::from(start)).unwrap();

        for (i, amount) in amounts.into_iter().enumerate() {
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            let _ = balances.transfer(from, to, U256::from(amount));
            prop_assert_eq!(balances.total_supply(), U256::from(start));
        }
    }
}

// ── Marketplace ─────────────────────────────────────────────

proptest! {
    /// Value is conserved and sold counters stay consistent under any
    /// sequence of accepted or rejected calls.
    #[test]
    fn ledger_invariants_hold(actions in prop::collection::vec(action(), 1..40)) {
        let (mut world, market, registry) = deployed();
        let supply = total_value(&world, market);

        for action in &actions {
            let before = world.clone();
            let committed = apply(&mut world, market, registry, action);
            if !committed {
                prop_assert_eq!(&world, &before, "rejected call changed state");
            }

            prop_assert_eq!(total_value(&world, market), supply);

            let ledger = world.market(market).unwrap();
            let listings: Vec<_> = (1..=ledger.item_count())
                .map(|id| ledger.listing(id).unwrap().clone())
                .collect();
            let sold = listings.iter().filter(|l| l.sold).count() as u64;
            prop_assert_eq!(ledger.items_sold(), sold);
            prop_assert_eq!(
                ledger.fetch_unsold_listings().len() as u64,
                ledger.item_count() - sold
            );

            // Ids are 1-based and sequential.
            for (index, listing) in listings.iter().enumerate() {
                prop_assert_eq!(listing.id, index as u64 + 1);
                prop_assert!(listing.price > U256::ZERO);
            }

            // Escrow: every unsold asset sits with the ledger.
            let tokens = world.registry(registry).unwrap();
            for listing in listings.iter().filter(|l| !l.sold) {
                prop_assert_eq!(listing.owner, market);
                prop_assert_eq!(tokens.owner_of(listing.asset_id).unwrap(), market);
            }

            // Unsold listings hold exactly their fees.
            let unsold = ledger.fetch_unsold_listings().len() as u64;
            prop_assert_eq!(world.balance_of(market), U256::from(unsold * FEE));
        }
    }

    /// Minted ids are sequential from 1 regardless of who mints.
    #[test]
    fn mint_ids_sequential(minters in prop::collection::vec(0u8..4, 1..20)) {
        let (mut world, _market, registry) = deployed();
        for (index, who) in minters.iter().enumerate() {
            let id = world.mint(account(*who), registry, "ipfs://doc").unwrap().output;
            prop_assert_eq!(id, index as u64 + 1);
        }
        prop_assert_eq!(
            world.registry(registry).unwrap().total_minted(),
            minters.len() as u64
        );
    }
}
