//! Dealer module (spec §3-§4.5, §4.6): the Feldman DKG committee lifecycle,
//! per-hand shuffle/reveal protocol, and the liveness slashing that backs
//! it. Talks to the poker module only through [`sink::PokerStateSink`] and
//! [`crate::poker::keeper::DealerArtifactProducer`], avoiding a cyclic
//! module dependency (spec §9 design note).

pub mod dkg;
pub mod epoch;
pub mod errors;
pub mod events;
pub mod hand_key;
pub mod hole_cards;
pub mod keeper;
pub mod reveal;
pub mod shuffle_accept;
pub mod sink;
pub mod slashing;
pub mod timeout;
pub mod types;

pub use errors::DealerError;
pub use events::DealerEvent;
pub use keeper::{DealerKeeper, DealerOutcome};
pub use sink::{HandSnapshot, PokerStateSink};
pub use types::DealerEpoch;
