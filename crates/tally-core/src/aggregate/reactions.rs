//! Reaction tally.

use std::collections::{BTreeMap, HashSet};

use crate::post::ReactionMap;

/// Count distinct reactors per reaction kind.
///
/// Only kinds present in the map appear in the output; a present kind with
/// no reactor list counts as zero.
pub fn tally_reactions(reactions: Option<&ReactionMap>) -> BTreeMap<String, u64> {
  let Some(reactions) = reactions else {
    return BTreeMap::new();
  };

  reactions
    .iter()
    .map(|(kind, reactors)| {
      let count = reactors
        .as_deref()
        .map(|ids| ids.iter().collect::<HashSet<_>>().len())
        .unwrap_or(0);
      (kind.clone(), count as u64)
    })
    .collect()
}
