use rand::seq::{index, SliceRandom};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The one random source of a trainer run. Pack draws, display order,
/// distractor choice and question order all pull from it, so a seed
/// replays a whole session.
#[derive(Clone)]
pub struct TrainerRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl TrainerRng {
    /// Seeded from `seed`, or from OS entropy when none is given
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
        TrainerRng {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed to pass to `--seed` to replay this run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// True with probability `p`; values outside [0, 1] are clamped
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen::<f64>() < p.clamp(0.0, 1.0)
    }

    /// Uniform element of `items`, None when empty
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Up to `amount` distinct elements in random order; all of them if the slice is shorter
    pub fn sample<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        let amount = amount.min(items.len());
        index::sample(&mut self.inner, items.len(), amount)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}
