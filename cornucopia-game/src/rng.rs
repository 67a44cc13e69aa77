//! Randomness seam for the simulation.
//!
//! Every decision in the arena draws from a [`RandomSource`], which only has
//! to produce uniforms in `[0, 1)`. Production runs use seeded ChaCha streams
//! wrapped in [`CountingRng`]; tests script exact outcomes with
//! [`ScriptedRng`].

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;

use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::numbers::{floor_f64_to_u32, floor_f64_to_usize, usize_to_f64};

/// Source of uniform draws used by every probabilistic rule.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Roll a die with `sides` faces, returning `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        let face = floor_f64_to_u32(self.uniform() * f64::from(sides)) + 1;
        face.min(sides)
    }

    /// Standard twenty-sided check die.
    fn d20(&mut self) -> u32 {
        self.roll(20)
    }

    /// True with probability `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    /// Uniform index into a collection of `len` elements.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        floor_f64_to_usize(self.uniform() * usize_to_f64(len)).min(len - 1)
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        items.get(self.index(items.len()))
    }

    /// Fisher-Yates shuffle in place, walking from the back.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    /// Seed a ChaCha stream directly.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Wrap an existing generator.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl<R: RngCore> RandomSource for CountingRng<R> {
    fn uniform(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

/// Deterministic bundle of RNG streams segregated by simulation phase.
///
/// Reaping, training and the arena days draw from separate streams so that
/// changing how many draws one phase makes never shifts the others.
#[derive(Debug, Clone)]
pub struct RngBundle {
    reaping: RefCell<CountingRng<ChaCha20Rng>>,
    training: RefCell<CountingRng<ChaCha20Rng>>,
    arena: RefCell<CountingRng<ChaCha20Rng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            reaping: RefCell::new(CountingRng::seeded(derive_stream_seed(seed, b"reaping"))),
            training: RefCell::new(CountingRng::seeded(derive_stream_seed(seed, b"training"))),
            arena: RefCell::new(CountingRng::seeded(derive_stream_seed(seed, b"arena"))),
        }
    }

    /// Stream used for roster generation and arena selection.
    #[must_use]
    pub fn reaping(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.reaping.borrow_mut()
    }

    /// Stream used by the pre-game training phase.
    #[must_use]
    pub fn training(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.training.borrow_mut()
    }

    /// Stream used by every in-arena day, culling, finale and sudden death.
    #[must_use]
    pub fn arena(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.arena.borrow_mut()
    }

    /// Total draws across all streams.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.reaping.borrow().draws() + self.training.borrow().draws() + self.arena.borrow().draws()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Replays a fixed queue of uniforms, then repeats a fallback value.
///
/// Useful for tests and fixtures that need to force a specific branch.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    queue: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedRng {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback: fallback.clamp(0.0, 0.999_999),
            consumed: 0,
        }
    }

    /// Script a sequence of die faces, each rolled on a die with `sides` faces.
    #[must_use]
    pub fn from_rolls(faces: &[(u32, u32)], fallback: f64) -> Self {
        Self::new(faces.iter().map(|&(face, sides)| Self::die(face, sides)), fallback)
    }

    /// Uniform that makes `roll(sides)` return exactly `face`.
    #[must_use]
    pub fn die(face: u32, sides: u32) -> f64 {
        let sides = sides.max(1);
        let face = face.clamp(1, sides);
        (f64::from(face) - 0.5) / f64::from(sides)
    }

    /// Append more uniforms to the script.
    pub fn push(&mut self, value: f64) {
        self.queue.push_back(value);
    }

    /// Number of uniforms handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Scripted values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RandomSource for ScriptedRng {
    fn uniform(&mut self) -> f64 {
        self.consumed += 1;
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}
