//! App wiring: constructs the poker and dealer keepers over a shared store
//! and closes the late-bound capability cycle between them (spec §9 design
//! note). This is the only place that knows both modules concretely; every
//! other module sees the other only through a narrow trait.

use std::cell::RefCell;
use std::rc::Rc;

use crate::chain::bank::{BankKeeper, InMemoryBankKeeper};
use crate::chain::staking::{BondedValidator, InMemoryStakingKeeper, StakingKeeper};
use crate::config::DealerModuleParams;
use crate::dealer::keeper::DealerKeeper;
use crate::poker::keeper::PokerKeeper;
use crate::store::kv::{InMemoryStore, Store};

/// Block-level context passed into every message handler. The chain supplies
/// `block_time`; nothing in either module reads the wall clock directly
/// (spec §5 determinism requirement).
#[derive(Clone, Copy, Debug)]
pub struct BlockContext {
    pub block_time: i64,
    pub height: u64,
}

pub struct App {
    pub poker: Rc<PokerKeeper>,
    pub dealer: Rc<DealerKeeper>,
}

impl App {
    /// Wires a fresh in-memory app: one [`Store`], one [`BankKeeper`], one
    /// [`StakingKeeper`], and the poker/dealer keepers installed into each
    /// other via their late-bound capability setters.
    pub fn new_in_memory(bonded_validators: Vec<BondedValidator>, dealer_params: DealerModuleParams) -> Self {
        let store: Rc<RefCell<dyn Store>> = Rc::new(RefCell::new(InMemoryStore::new()));
        let bank: Rc<RefCell<dyn BankKeeper>> = Rc::new(RefCell::new(InMemoryBankKeeper::default()));
        let staking: Rc<RefCell<dyn StakingKeeper>> = Rc::new(RefCell::new(InMemoryStakingKeeper::new(bonded_validators)));
        Self::wire(store, bank, staking, dealer_params)
    }

    pub fn wire(
        store: Rc<RefCell<dyn Store>>,
        bank: Rc<RefCell<dyn BankKeeper>>,
        staking: Rc<RefCell<dyn StakingKeeper>>,
        dealer_params: DealerModuleParams,
    ) -> Self {
        let poker = Rc::new(PokerKeeper::new(store.clone(), bank));
        let dealer = Rc::new(DealerKeeper::new(store, staking, dealer_params));

        poker.install_dealer(dealer.clone());
        dealer.install_sink(poker.clone());

        App { poker, dealer }
    }
}
