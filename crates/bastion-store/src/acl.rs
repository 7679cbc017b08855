//! In-memory implementation of [`AclBuilder`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bastion_core::error::BastionResult;
use bastion_core::models::acl::Acl;
use bastion_core::repository::AclBuilder;
use parking_lot::RwLock;

/// Builds snapshots from a mutable template graph.
#[derive(Clone, Default)]
pub struct MemoryAclBuilder {
    template: Arc<RwLock<Acl>>,
    builds: Arc<AtomicUsize>,
}

impl MemoryAclBuilder {
    pub fn new(template: Acl) -> Self {
        Self {
            template: Arc::new(RwLock::new(template)),
            builds: Arc::default(),
        }
    }

    /// Mutate the template. Snapshots already handed out are unaffected.
    pub fn update<T>(&self, f: impl FnOnce(&mut Acl) -> BastionResult<T>) -> BastionResult<T> {
        f(&mut self.template.write())
    }

    /// Number of snapshots built so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl AclBuilder for MemoryAclBuilder {
    async fn build_acl(&self) -> BastionResult<Acl> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(self.template.read().clone())
    }
}
