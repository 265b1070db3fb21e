//! Random selection of winners and reserves by pool position.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

use super::draw::{DrawCaps, DrawSelection};

/// Pick winners and reserves out of a pool of `pool_size` entries.
///
/// Winners are a uniform sample of `min(caps.winners, pool_size)` positions;
/// reserves are a uniform sample of the remaining positions, capped at
/// `caps.reserves`. Everything else is left unselected.
pub fn select_draw<R: Rng + ?Sized>(pool_size: usize, caps: DrawCaps, rng: &mut R) -> DrawSelection {
    let winners = pool_size.min(caps.winners);
    let reserves = (pool_size - winners).min(caps.reserves);

    // `index::sample` returns distinct positions in random order, so splitting
    // it gives a uniform winner set and a uniform reserve set from the rest.
    let picked = index::sample(rng, pool_size, winners + reserves).into_vec();
    let (winner_idx, reserve_idx) = picked.split_at(winners);

    DrawSelection {
        winners: winner_idx.to_vec(),
        reserves: reserve_idx.to_vec(),
    }
}

type SelectFn = dyn Fn(usize) -> DrawSelection + Send + Sync;

/// Source of draw selections handed to the repository.
#[derive(Clone)]
pub struct DrawSelector {
    select: Arc<SelectFn>,
}

impl DrawSelector {
    /// Selections drawn from the thread-local OS-seeded generator.
    pub fn random(caps: DrawCaps) -> Self {
        Self {
            select: Arc::new(move |pool_size| {
                select_draw(pool_size, caps, &mut rand::thread_rng())
            }),
        }
    }

    /// Reproducible selections from a fixed seed.
    pub fn seeded(caps: DrawCaps, seed: u64) -> Self {
        let rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        Self {
            select: Arc::new(move |pool_size| {
                let mut rng = rng.lock();
                select_draw(pool_size, caps, &mut *rng)
            }),
        }
    }

    /// Wrap an arbitrary selection function.
    pub fn from_fn<F>(select: F) -> Self
    where
        F: Fn(usize) -> DrawSelection + Send + Sync + 'static,
    {
        Self {
            select: Arc::new(select),
        }
    }

    pub fn select(&self, pool_size: usize) -> DrawSelection {
        (self.select)(pool_size)
    }
}

impl fmt::Debug for DrawSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawSelector").finish_non_exhaustive()
    }
}
