//! Lucky quest selection.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::types::DbId;

/// Pick the next lucky quest uniformly at random from `candidates`.
///
/// Returns `None` when there is nothing eligible.
pub fn pick_lucky<R: Rng + ?Sized>(candidates: &[DbId], rng: &mut R) -> Option<DbId> {
    candidates.choose(rng).copied()
}
