//! Variation operators over [`Tour`] permutations.
//!
//! - [`random_population`] — Uniform random permutations of the terminal set
//! - [`mutate`] — 2-opt segment reversal between two distinct positions
//! - [`crossover`] — Half-prefix crossover: first half of one parent, rest in the other's order
//!
//! Every operator returns a new tour and leaves its inputs untouched.

use std::collections::HashSet;

use rand::Rng;

use super::Tour;
use crate::error::{Result, RoutingError};
use crate::models::NodeId;

/// Draws one uniformly random permutation of `terminals`.
///
/// Repeatedly picks a random remaining identifier and appends it.
pub fn random_tour<R: Rng>(terminals: &[NodeId], rng: &mut R) -> Tour {
    let mut remaining = terminals.to_vec();
    let mut nodes = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let k = rng.random_range(0..remaining.len());
        nodes.push(remaining.swap_remove(k));
    }
    Tour::new(nodes)
}

/// Draws `size` independent random tours over `terminals`.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::random_population;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let population = random_population(&[1, 2, 3, 4], 10, &mut rng);
/// assert_eq!(population.len(), 10);
/// for tour in &population {
///     let mut nodes = tour.nodes().to_vec();
///     nodes.sort();
///     assert_eq!(nodes, vec![1, 2, 3, 4]);
/// }
/// ```
pub fn random_population<R: Rng>(terminals: &[NodeId], size: usize, rng: &mut R) -> Vec<Tour> {
    (0..size).map(|_| random_tour(terminals, rng)).collect()
}

/// Reverses the stops between two distinct random positions, both included.
///
/// # Errors
///
/// [`RoutingError::TourTooShort`] if the tour has fewer than two stops.
pub fn mutate<R: Rng>(tour: &Tour, rng: &mut R) -> Result<Tour> {
    let n = tour.len();
    if n < 2 {
        return Err(RoutingError::TourTooShort { len: n });
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }

    let mut nodes = tour.nodes().to_vec();
    nodes[i.min(j)..=i.max(j)].reverse();
    Ok(Tour::new(nodes))
}

/// Combines two parents over the same identifier set.
///
/// The child starts with the first `len / 2` stops of `a`, then takes the
/// remaining identifiers in the order they appear in `b`.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::{crossover, Tour};
///
/// let a = Tour::new(vec![1, 2, 3, 4]);
/// let b = Tour::new(vec![4, 3, 2, 1]);
/// assert_eq!(crossover(&a, &b).nodes(), &[1, 2, 4, 3]);
/// ```
pub fn crossover(a: &Tour, b: &Tour) -> Tour {
    debug_assert_eq!(a.len(), b.len(), "parents must have equal length");
    let prefix = &a.nodes()[..a.len() / 2];
    let mut seen: HashSet<NodeId> = prefix.iter().copied().collect();

    let mut nodes = Vec::with_capacity(a.len());
    nodes.extend_from_slice(prefix);
    nodes.extend(b.nodes().iter().copied().filter(|id| seen.insert(*id)));
    Tour::new(nodes)
}
