//! Assignment generator: a random fixed-point-free pairing of members.
//!
//! Shuffling once and pairing each member with the next one in the shuffled
//! order (wrapping around) yields a single cycle over all members, so nobody
//! is ever paired with themselves and every member gives and receives exactly
//! once. Two members always end up swapping with each other.

use std::collections::HashSet;

use deeds_storage::MemberId;
use rand::{seq::SliceRandom, Rng};

use crate::EngineError;

/// One giver → recipient pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub giver: MemberId,
    pub recipient: MemberId,
}

/// Pair every member with another member.
///
/// Fails with `InsufficientMembers` for fewer than two members and with
/// `InvalidInput` if a member id appears twice.
pub fn derange<R: Rng + ?Sized>(
    members: &[MemberId],
    rng: &mut R,
) -> Result<Vec<Pairing>, EngineError> {
    if members.len() < 2 {
        return Err(EngineError::InsufficientMembers {
            found: members.len(),
        });
    }

    let mut seen = HashSet::with_capacity(members.len());
    if let Some(dup) = members.iter().find(|m| !seen.insert(**m)) {
        return Err(EngineError::InvalidInput(format!(
            "member {} listed twice",
            dup.0
        )));
    }

    let mut order = members.to_vec();
    order.shuffle(rng);

    let n = order.len();
    Ok((0..n)
        .map(|i| Pairing {
            giver: order[i],
            recipient: order[(i + 1) % n],
        })
        .collect())
}
