//! Visual output of the engine: one [`VisualState`] per region.
//!
//! Bindings and controllers write channels here; the host reads them after each
//! tick and applies them to whatever actually draws. Positional channels of a
//! container can be claimed so exactly one controller writes them.

use std::collections::BTreeMap;

use crate::animation::props::{Prop, VisualState};
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{ClaimOwner, RegionId};

/// Per-region visual state store.
#[derive(Debug, Default)]
pub struct Stage {
    states: BTreeMap<RegionId, VisualState>,
    claims: BTreeMap<(RegionId, Prop), ClaimOwner>,
    next_owner: u64,
}

impl Stage {
    /// Empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `region` (rest state when never written).
    pub fn state(&self, region: &RegionId) -> VisualState {
        self.states.get(region).copied().unwrap_or_default()
    }

    /// Current value of one channel.
    pub fn get(&self, region: &RegionId, prop: Prop) -> f64 {
        self.states
            .get(region)
            .map_or_else(|| prop.rest_value(), |s| s.get(prop))
    }

    /// Write an unclaimed channel. Returns `false` (and writes nothing) when
    /// another owner holds the channel.
    pub fn set(&mut self, region: &RegionId, prop: Prop, value: f64) -> bool {
        if self.claims.contains_key(&(region.clone(), prop)) {
            tracing::trace!(%region, prop = prop.name(), "write to claimed channel ignored");
            return false;
        }
        self.write(region, prop, value);
        true
    }

    /// Write a channel on behalf of its claim owner.
    pub(crate) fn set_owned(&mut self, owner: ClaimOwner, region: &RegionId, prop: Prop, value: f64) {
        debug_assert_eq!(
            self.claims.get(&(region.clone(), prop)),
            Some(&owner),
            "set_owned without a matching claim"
        );
        self.write(region, prop, value);
    }

    fn write(&mut self, region: &RegionId, prop: Prop, value: f64) {
        match self.states.get_mut(region) {
            Some(state) => state.set(prop, value),
            None => {
                let mut state = VisualState::default();
                state.set(prop, value);
                self.states.insert(region.clone(), state);
            }
        }
    }

    /// Allocate a fresh claim owner.
    pub(crate) fn new_owner(&mut self) -> ClaimOwner {
        self.next_owner += 1;
        ClaimOwner(self.next_owner)
    }

    /// Claim exclusive write access to `prop` on `region`.
    pub(crate) fn claim(&mut self, region: &RegionId, prop: Prop, owner: ClaimOwner) -> CineResult<()> {
        match self.claims.get(&(region.clone(), prop)) {
            Some(existing) if *existing != owner => Err(CineError::conflict(format!(
                "channel '{}' of region '{region}' is already owned",
                prop.name()
            ))),
            _ => {
                self.claims.insert((region.clone(), prop), owner);
                Ok(())
            }
        }
    }

    /// Drop every claim held by `owner`.
    pub(crate) fn release(&mut self, owner: ClaimOwner) {
        self.claims.retain(|_, o| *o != owner);
    }

    /// Owner of a channel, if claimed.
    pub fn owner_of(&self, region: &RegionId, prop: Prop) -> Option<ClaimOwner> {
        self.claims.get(&(region.clone(), prop)).copied()
    }

    /// Iterate every written region.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &VisualState)> {
        self.states.iter()
    }

    /// Forget all written state and claims.
    pub fn clear(&mut self) {
        self.states.clear();
        self.claims.clear();
    }
}

#[cfg(test)]
#[path = "../tests/unit/stage.rs"]
mod tests;
