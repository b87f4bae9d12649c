//! # Certificates
//!
//! A read-state reply carries a certificate: a hash tree of the requested
//! state plus the subnet's signature over its root. Only path lookup is
//! provided here; signature verification is left to callers holding the
//! root key.

/// Node of a (possibly pruned) hash tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashTree {
    /// Empty subtree.
    Empty,
    /// Two subtrees.
    Fork(Box<HashTree>, Box<HashTree>),
    /// Labeled subtree.
    Labeled(Vec<u8>, Box<HashTree>),
    /// Leaf value.
    Leaf(Vec<u8>),
    /// Subtree replaced by its hash.
    Pruned([u8; 32]),
}

/// Result of looking up a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupResult<'a> {
    /// The path is provably absent.
    Absent,
    /// The path may exist but was pruned away.
    Unknown,
    /// The value at the path.
    Found(&'a [u8]),
    /// The path ends at an inner node.
    Error,
}

impl HashTree {
    /// Look up the leaf at `path`.
    pub fn lookup_path<L: AsRef<[u8]>>(&self, path: &[L]) -> LookupResult<'_> {
        let Some((label, rest)) = path.split_first() else {
            return match self {
                HashTree::Empty => LookupResult::Absent,
                HashTree::Leaf(value) => LookupResult::Found(value),
                HashTree::Pruned(_) => LookupResult::Unknown,
                HashTree::Fork(..) | HashTree::Labeled(..) => LookupResult::Error,
            };
        };

        let mut children = Vec::new();
        self.flatten_forks(&mut children);

        let mut saw_pruned = false;
        for child in children {
            match child {
                HashTree::Labeled(l, subtree) if l.as_slice() == label.as_ref() => {
                    return subtree.lookup_path(rest);
                }
                HashTree::Pruned(_) => saw_pruned = true,
                _ => {}
            }
        }

        if saw_pruned {
            LookupResult::Unknown
        } else {
            LookupResult::Absent
        }
    }

    fn flatten_forks<'a>(&'a self, out: &mut Vec<&'a HashTree>) {
        match self {
            HashTree::Fork(left, right) => {
                left.flatten_forks(out);
                right.flatten_forks(out);
            }
            HashTree::Empty => {}
            other => out.push(other),
        }
    }
}

/// Certificate returned by a read-state request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    /// State tree.
    pub tree: HashTree,
    /// BLS signature over the tree's root hash.
    pub signature: Vec<u8>,
}
