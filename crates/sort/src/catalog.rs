//! Creative catalog positions, used by [`SortOrder::Catalog`](crate::SortOrder::Catalog).
//!
//! [`CatalogIndex`] maps stack identity keys to positions in the reference
//! list. [`Catalog`] owns the current reference list and an index behind a
//! reader/writer lock, rebuilding the index on a worker thread whenever the
//! reference list changes. Rebuilds that would race an unrelated external
//! reload are parked and retried once that reload reports completion.

use crate::options::SortOptions;
use clientsort_core::{ItemFlags, ItemStack, StackMatcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Position reported for stacks absent from the catalog.
pub const NOT_FOUND: u32 = u32::MAX;

/// Anything that can rank stacks by catalog position.
pub trait CatalogPositions {
    /// Position of each stack, [`NOT_FOUND`] when unknown.
    fn positions(&self, stacks: &[ItemStack]) -> Vec<u32>;
}

/// No catalog at all: every stack is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

impl CatalogPositions for NoCatalog {
    fn positions(&self, stacks: &[ItemStack]) -> Vec<u32> {
        vec![NOT_FOUND; stacks.len()]
    }
}

/// Prebuilt identity-key to position map.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    positions: HashMap<StackMatcher, u32>,
}

impl CatalogIndex {
    /// Index a reference list.
    ///
    /// Each stack claims a position for its item-only key, unless it is foil
    /// and that key is already taken, then one for its exact key.
    pub fn build(reference: &[ItemStack]) -> Self {
        let mut positions = HashMap::with_capacity(reference.len() * 2);
        let mut next = 0u32;
        for stack in reference {
            let plain = StackMatcher::ignore_components(stack);
            if !stack.flags.contains(ItemFlags::FOIL)
                || !positions.contains_key(&plain)
            {
                positions.insert(plain, next);
                next += 1;
            }
            positions.insert(StackMatcher::exact(stack), next);
            next += 1;
        }
        Self { positions }
    }

    /// Position of a stack: exact key first, then the item-only key.
    /// Empty stacks are never found.
    pub fn position(&self, stack: &ItemStack) -> u32 {
        if stack.is_empty() {
            return NOT_FOUND;
        }
        self.positions
            .get(&StackMatcher::exact(stack))
            .or_else(|| self.positions.get(&StackMatcher::ignore_components(stack)))
            .copied()
            .unwrap_or(NOT_FOUND)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl CatalogPositions for CatalogIndex {
    fn positions(&self, stacks: &[ItemStack]) -> Vec<u32> {
        stacks.iter().map(|stack| self.position(stack)).collect()
    }
}

/// Unindexed lookups by scanning a reference list, memoized per call.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceList<'a>(pub &'a [ItemStack]);

impl ReferenceList<'_> {
    fn scan(&self, matcher: &StackMatcher) -> Option<u32> {
        self.0
            .iter()
            .position(|stack| matcher.matches(stack))
            .and_then(|index| u32::try_from(index).ok())
    }
}

impl CatalogPositions for ReferenceList<'_> {
    fn positions(&self, stacks: &[ItemStack]) -> Vec<u32> {
        let mut memo: HashMap<StackMatcher, u32> = HashMap::with_capacity(stacks.len());
        stacks
            .iter()
            .map(|stack| {
                if stack.is_empty() {
                    return NOT_FOUND;
                }
                let exact = StackMatcher::exact(stack);
                if let Some(&position) = memo.get(&exact) {
                    return position;
                }
                let position = match self.scan(&exact) {
                    Some(position) => position,
                    None => {
                        let plain = StackMatcher::ignore_components(stack);
                        match memo.get(&plain) {
                            Some(&position) => position,
                            None => {
                                let position = self.scan(&plain).unwrap_or(NOT_FOUND);
                                memo.insert(plain, position);
                                position
                            }
                        }
                    }
                };
                memo.insert(exact, position);
                position
            })
            .collect()
    }
}

/// What a call to [`Catalog::refresh`] did.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Indexing is disabled; the index was emptied.
    Cleared,
    /// A worker thread is rebuilding the index.
    Spawned(JoinHandle<()>),
    /// The worker could not be started; the index was rebuilt inline.
    Rebuilt,
    /// An external reload holds the gate; the rebuild waits for
    /// [`Catalog::on_external_reload_finished`].
    Deferred,
}

/// Reference list plus its lazily rebuilt index.
#[derive(Debug)]
pub struct Catalog {
    reference: RwLock<Arc<Vec<ItemStack>>>,
    index: Arc<RwLock<CatalogIndex>>,
    reload_gate: Arc<Mutex<()>>,
    blocked: Mutex<Option<Arc<Vec<ItemStack>>>>,
    optimized: AtomicBool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(())))
    }
}

impl Catalog {
    /// Empty catalog sharing `reload_gate` with an external reload process.
    ///
    /// The external side holds the gate for the duration of its reload and
    /// calls [`Catalog::on_external_reload_finished`] after releasing it.
    pub fn new(reload_gate: Arc<Mutex<()>>) -> Self {
        Self {
            reference: RwLock::new(Arc::new(Vec::new())),
            index: Arc::new(RwLock::new(CatalogIndex::default())),
            reload_gate,
            blocked: Mutex::new(None),
            optimized: AtomicBool::new(true),
        }
    }

    /// Install a new reference list and rebuild the index per `options`.
    pub fn refresh(&self, reference: Vec<ItemStack>, options: &SortOptions) -> RefreshOutcome {
        let reference = Arc::new(reference);
        *self
            .reference
            .write()
            .unwrap_or_else(PoisonError::into_inner) = reference.clone();
        self.optimized
            .store(options.optimized_catalog_sorting, Ordering::Release);

        if !options.optimized_catalog_sorting {
            *self.index.write().unwrap_or_else(PoisonError::into_inner) = CatalogIndex::default();
            return RefreshOutcome::Cleared;
        }

        let _gate = match self.reload_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                info!("Catalog index rebuild blocked by external reload, waiting");
                *self.blocked.lock().unwrap_or_else(PoisonError::into_inner) = Some(reference);
                return RefreshOutcome::Deferred;
            }
        };
        self.spawn_rebuild(reference)
    }

    /// Retry a rebuild parked by [`Catalog::refresh`]. Returns `None` when
    /// nothing was waiting.
    pub fn on_external_reload_finished(&self, options: &SortOptions) -> Option<RefreshOutcome> {
        let pending = self
            .blocked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        debug!("Retrying deferred catalog index rebuild");
        Some(self.refresh(Arc::unwrap_or_clone(pending), options))
    }

    /// Whether a rebuild is parked behind the external reload.
    pub fn is_blocked(&self) -> bool {
        self.blocked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn spawn_rebuild(&self, reference: Arc<Vec<ItemStack>>) -> RefreshOutcome {
        let index = Arc::clone(&self.index);
        let worker_reference = Arc::clone(&reference);
        let spawned = thread::Builder::new()
            .name("clientsort catalog index builder".into())
            .spawn(move || rebuild(&index, &worker_reference));
        match spawned {
            Ok(handle) => RefreshOutcome::Spawned(handle),
            Err(err) => {
                warn!("Failed to start catalog index builder: {err}. Rebuilding inline");
                rebuild(&self.index, &reference);
                RefreshOutcome::Rebuilt
            }
        }
    }

    /// Number of keys in the current index.
    pub fn indexed_len(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn rebuild(index: &RwLock<CatalogIndex>, reference: &[ItemStack]) {
    let mut guard = index.write().unwrap_or_else(PoisonError::into_inner);
    *guard = CatalogIndex::build(reference);
    debug!(keys = guard.len(), "Catalog index rebuilt");
}

impl CatalogPositions for Catalog {
    fn positions(&self, stacks: &[ItemStack]) -> Vec<u32> {
        if self.optimized.load(Ordering::Acquire) {
            self.index
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .positions(stacks)
        } else {
            let reference = self
                .reference
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            ReferenceList(&reference).positions(stacks)
        }
    }
}
