//! The microgame pool: an ordered registry of descriptors and the
//! repeat-avoiding selection policy.

use microrush_core::error::GameError;
use microrush_core::microgame::MicrogameDescriptor;
use microrush_core::rng::DeterministicRng;

/// Ordered collection of registered microgames. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct MicrogamePool {
    descriptors: Vec<MicrogameDescriptor>,
}

impl MicrogamePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from `descriptors`, in order.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DuplicateMicrogame` if two descriptors share an id.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = MicrogameDescriptor>,
    ) -> Result<Self, GameError> {
        let mut pool = Self::new();
        for descriptor in descriptors {
            pool.register(descriptor)?;
        }
        Ok(pool)
    }

    /// Adds a descriptor at the end of the pool.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DuplicateMicrogame` if the id is already taken.
    pub fn register(&mut self, descriptor: MicrogameDescriptor) -> Result<(), GameError> {
        if self.get(descriptor.id()).is_some() {
            return Err(GameError::DuplicateMicrogame(descriptor.id().to_owned()));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Number of registered microgames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Looks up a descriptor by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MicrogameDescriptor> {
        self.descriptors.iter().find(|d| d.id() == id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(MicrogameDescriptor::id)
    }

    /// Picks the next microgame uniformly at random.
    ///
    /// When the pool has more than one member, the descriptor with id
    /// `previous` is excluded. If exclusion leaves nothing to pick from, the
    /// whole pool is used instead.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyPool` if the pool is empty.
    pub fn select(
        &self,
        previous: Option<&str>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<&MicrogameDescriptor, GameError> {
        if self.descriptors.is_empty() {
            return Err(GameError::EmptyPool);
        }

        let mut candidates: Vec<&MicrogameDescriptor> = if self.descriptors.len() > 1 {
            self.descriptors
                .iter()
                .filter(|d| Some(d.id()) != previous)
                .collect()
        } else {
            Vec::new()
        };
        if candidates.is_empty() {
            candidates = self.descriptors.iter().collect();
        }

        let index = rng
            .pick_index(candidates.len())
            .ok_or(GameError::EmptyPool)?;
        candidates.get(index).copied().ok_or(GameError::EmptyPool)
    }
}
