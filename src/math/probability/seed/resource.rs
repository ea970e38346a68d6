use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Reproduzierbare Zufallsquelle der Anwendung.
///
/// Alle Zufallsentscheidungen (Radien, Startpositionen, neue Zellen) ziehen
/// aus diesem einen Generator; gleicher Seed und gleiche Befehlsfolge ergeben
/// dasselbe Zellfeld.
#[derive(Resource, Debug, Clone)]
pub struct SeedResource {
    pub seed: u64,
    rng: StdRng,
}

impl SeedResource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_text<S: AsRef<str>>(text: S) -> Self {
        let mut hasher = DefaultHasher::new();
        text.as_ref().hash(&mut hasher);
        let seed = hasher.finish();
        Self::from_seed(seed)
    }

    /// Startet den Generator mit `seed` neu.
    pub fn reset_with_new_seed(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for SeedResource {
    fn default() -> Self {
        let seed_number = rand::random::<u64>();
        Self::from_seed(seed_number)
    }
}
