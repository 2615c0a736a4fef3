use crate::core::account::AccountId;
use std::collections::BTreeMap;

/// A merged group of accounts tied together by one or more detectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub id: String,
    /// Sorted lexicographically.
    pub members: Vec<AccountId>,
    pub pattern: &'static str,
}

/// Union-find over account identifiers, keyed deterministically.
///
/// Union direction is decided by rank only; it never affects the final
/// partition, so the resulting components are independent of discovery
/// order.
struct DisjointSet {
    parent: BTreeMap<AccountId, AccountId>,
    rank: BTreeMap<AccountId, usize>,
}

impl DisjointSet {
    fn new() -> Self {
        Self {
            parent: BTreeMap::new(),
            rank: BTreeMap::new(),
        }
    }

    fn make_set(&mut self, x: &AccountId) {
        self.parent.entry(x.clone()).or_insert_with(|| x.clone());
        self.rank.entry(x.clone()).or_insert(0);
    }

    fn find(&mut self, x: &AccountId) -> AccountId {
        let parent = self.parent.get(x).cloned().unwrap_or_else(|| x.clone());
        if &parent == x {
            return x.clone();
        }
        let root = self.find(&parent);
        self.parent.insert(x.clone(), root.clone());
        root
    }

    fn union(&mut self, a: &AccountId, b: &AccountId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let rank_a = *self.rank.get(&ra).unwrap_or(&0);
        let rank_b = *self.rank.get(&rb).unwrap_or(&0);
        if rank_a < rank_b {
            self.parent.insert(ra, rb);
        } else if rank_a > rank_b {
            self.parent.insert(rb, ra);
        } else {
            self.parent.insert(rb.clone(), ra.clone());
            self.rank.insert(ra, rank_a + 1);
        }
    }

    fn members(&self) -> impl Iterator<Item = &AccountId> {
        self.parent.keys()
    }
}

/// Merge cycle, smurfing, and shell-chain groups whenever they share an
/// account, and assign stable `RING_NNN` identifiers.
///
/// Velocity findings are deliberately excluded — pass-through behavior
/// marks an individual account, not a coordinated ring. When a merged
/// component combines more than one pattern, the reported `pattern` is the
/// highest-priority one present: cycle, then smurfing, then shell-layering.
pub fn group_rings(
    cycle_groups: &[Vec<AccountId>],
    smurfing_groups: &[Vec<AccountId>],
    shell_groups: &[Vec<AccountId>],
) -> Vec<Ring> {
    let mut uf = DisjointSet::new();
    let mut tagged: Vec<(&[AccountId], &'static str)> = Vec::new();
    for g in cycle_groups {
        tagged.push((g, "cycle"));
    }
    for g in smurfing_groups {
        tagged.push((g, "smurfing"));
    }
    for g in shell_groups {
        tagged.push((g, "shell_layering"));
    }

    for (members, _) in &tagged {
        for m in members.iter() {
            uf.make_set(m);
        }
        for pair in members.windows(2) {
            uf.union(&pair[0], &pair[1]);
        }
    }

    let mut component_members: BTreeMap<AccountId, std::collections::BTreeSet<AccountId>> = BTreeMap::new();
    let all_accounts: Vec<AccountId> = uf.members().cloned().collect();
    for account in &all_accounts {
        let root = uf.find(account);
        component_members.entry(root).or_default().insert(account.clone());
    }

    let mut component_patterns: BTreeMap<AccountId, std::collections::BTreeSet<&'static str>> = BTreeMap::new();
    for (members, pattern) in &tagged {
        if let Some(first) = members.first() {
            let root = uf.find(first);
            component_patterns.entry(root).or_default().insert(pattern);
        }
    }

    let mut rings: Vec<(Vec<AccountId>, &'static str)> = Vec::new();
    for (root, members_set) in component_members {
        let mut members: Vec<AccountId> = members_set.into_iter().collect();
        members.sort();
        let patterns = component_patterns.get(&root).cloned().unwrap_or_default();
        let dominant = if patterns.contains("cycle") {
            "cycle"
        } else if patterns.contains("smurfing") {
            "smurfing"
        } else {
            "shell_layering"
        };
        rings.push((members, dominant));
    }

    rings.sort_by(|a, b| a.0[0].cmp(&b.0[0]));

    rings
        .into_iter()
        .enumerate()
        .map(|(i, (members, pattern))| Ring {
            id: format!("RING_{:03}", i + 1),
            members,
            pattern,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(s: &str) -> AccountId {
        AccountId::new(s)
    }

    #[test]
    fn test_disjoint_groups_become_separate_rings() {
        let cycles = vec![vec![acc("A"), acc("B"), acc("C")]];
        let smurfing = vec![vec![acc("X"), acc("Y")]];
        let rings = group_rings(&cycles, &smurfing, &[]);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].id, "RING_001");
        assert_eq!(rings[0].members, vec![acc("A"), acc("B"), acc("C")]);
        assert_eq!(rings[0].pattern, "cycle");
        assert_eq!(rings[1].id, "RING_002");
        assert_eq!(rings[1].members, vec![acc("X"), acc("Y")]);
        assert_eq!(rings[1].pattern, "smurfing");
    }

    #[test]
    fn test_overlapping_groups_merge_with_cycle_priority() {
        let cycles = vec![vec![acc("A"), acc("B"), acc("C")]];
        let smurfing = vec![vec![acc("C"), acc("D")]];
        let rings = group_rings(&cycles, &smurfing, &[]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].members, vec![acc("A"), acc("B"), acc("C"), acc("D")]);
        assert_eq!(rings[0].pattern, "cycle");
    }

    #[test]
    fn test_rings_sorted_by_smallest_member() {
        let cycles = vec![vec![acc("M"), acc("N")], vec![acc("A"), acc("B")]];
        let rings = group_rings(&cycles, &[], &[]);
        assert_eq!(rings[0].members[0], acc("A"));
        assert_eq!(rings[1].members[0], acc("M"));
    }
}
