//! Round engine for the good deeds exchange.
//!
//! [`RoundEngine`] wraps a [`deeds_storage::Store`] and implements:
//! - membership (members, groups),
//! - the assignment generator ([`derangement`]) and deed allocator ([`allocator`]),
//! - the completion tracker ([`completion`]),
//! - the round lifecycle controller ([`lifecycle`]).
//!
//! The engine holds no mutable state of its own. Every transition that can
//! race is delegated to a compare-and-swap in the store, so any number of
//! engine handles may share one store.

use std::sync::Arc;

use deeds_storage::Store;

pub mod allocator;
pub mod completion;
pub mod config;
pub mod derangement;
pub mod error;
pub mod lifecycle;
pub mod members;

pub use completion::Decision;
pub use config::{CompletionPolicy, EngineConfig, ParseCompletionPolicyError};
pub use error::EngineError;
pub use lifecycle::{MemberStatus, RoundProgress};

pub struct RoundEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> Clone for RoundEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> RoundEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
