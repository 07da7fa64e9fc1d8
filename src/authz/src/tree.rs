//! Permission trees
//!
//! A trie over scope tiers. Every stored permission sits at the node
//! reached by walking its scope's tiers; resolving a query explores the
//! literal and wildcard branch of every tier at once and applies the
//! highest-priority permission that matched.

use crate::error::Result;
use crate::permission::{Decision, Permission};
use crate::scope::{AsScope, WILDCARD};
use lazy_static::lazy_static;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Index of a node inside a tree's arena
type NodeId = usize;

/// The root is always a branch
const ROOT: NodeId = 0;

lazy_static! {
    /// Shared tree allowing every non-empty scope
    ///
    /// Holds a single `*` ALLOW permission at depth one.
    pub static ref FULL_ACCESS: Arc<PermissionTree> = Arc::new(PermissionTree::full_access());
}

/// Arena node: either more tiers or a stored permission
#[derive(Debug, Clone)]
enum Node {
    Branch(BTreeMap<String, NodeId>),
    Leaf(Permission),
}

/// Trie of permissions keyed by scope tier
///
/// # Examples
///
/// ```
/// use scope_authz::{Decision, Permission, PermissionTree};
///
/// let tree = PermissionTree::with_permissions([
///     Permission::allow("glimpse:tags:*"),
///     Permission::deny("glimpse:tags:Private:*"),
/// ]);
///
/// assert_eq!(tree.evaluate("glimpse:tags:Private:read"), Decision::Deny);
/// assert_eq!(tree.evaluate("glimpse:tags:Public:read"), Decision::Allow);
/// assert_eq!(tree.evaluate("glimpse:users"), Decision::NoOpinion);
/// ```
#[derive(Debug, Clone)]
pub struct PermissionTree {
    /// Node storage; replaced sub-trees stay here unreachable
    nodes: Vec<Node>,
}

impl PermissionTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Branch(BTreeMap::new())],
        }
    }

    /// Create a tree holding the given permissions
    pub fn with_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut tree = Self::new();
        tree.add(permissions);
        tree
    }

    /// Fresh tree with a single `*` ALLOW permission
    ///
    /// Use [`FULL_ACCESS`] to share one instance instead.
    pub fn full_access() -> Self {
        Self::with_permissions([Permission::allow(WILDCARD)])
    }

    /// Add permissions in order
    pub fn add(&mut self, permissions: impl IntoIterator<Item = Permission>) {
        for permission in permissions {
            self.add_one(permission);
        }
    }

    /// Add a single permission
    ///
    /// Whatever is stored at the permission's full path is overwritten. A
    /// permission sitting on an intermediate tier of the path is replaced
    /// by an empty branch, dropping it. A permission with no tiers is
    /// ignored.
    pub fn add_one(&mut self, permission: Permission) {
        let mut tiers = permission.scope_ref().tiers();
        let Some(last) = tiers.pop() else {
            trace!("Ignoring permission with empty scope");
            return;
        };

        trace!("Adding permission {}", permission);

        let mut current = ROOT;
        for tier in tiers {
            current = self.branch_for(current, tier);
        }

        let leaf = self.alloc(Node::Leaf(permission));
        if let Node::Branch(children) = &mut self.nodes[current] {
            children.insert(last, leaf);
        }
    }

    /// Resolve a scope to a decision
    ///
    /// Returns the decision of the highest-priority matching permission
    /// that is not NO-OPINION, or NO-OPINION when nothing qualifies.
    pub fn evaluate(&self, scope: impl AsScope) -> Decision {
        let scope = scope.as_scope();
        let decision = self
            .matching(&*scope)
            .into_iter()
            .map(Permission::decision)
            .find(|decision| decision.is_explicit())
            .unwrap_or(Decision::NoOpinion);

        debug!("Tree evaluated {} to {}", scope, decision.as_str());
        decision
    }

    /// Every permission matching `scope`, highest priority first
    ///
    /// Permissions of equal priority keep the order in which they were
    /// reached.
    pub fn matching(&self, scope: impl AsScope) -> Vec<&Permission> {
        let scope = scope.as_scope();
        let mut frontier: Vec<NodeId> = vec![ROOT];

        for tier in scope.iter() {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            for id in frontier {
                match &self.nodes[id] {
                    Node::Branch(children) => {
                        next.extend(children.get(tier.as_str()).copied());
                        if tier != WILDCARD {
                            next.extend(children.get(WILDCARD).copied());
                        }
                    }
                    // A shorter stored pattern only survives deeper tiers
                    // when it ends in a wildcard
                    Node::Leaf(permission) => {
                        if permission.scope_ref().ends_with_wildcard() {
                            next.push(id);
                        }
                    }
                }
            }
            frontier = next;
        }

        let mut matches: Vec<&Permission> = frontier
            .into_iter()
            .filter_map(|id| match &self.nodes[id] {
                Node::Leaf(permission) => Some(permission),
                Node::Branch(_) => None,
            })
            .collect();
        matches.sort_by(|a, b| a.compare(b));
        matches
    }

    /// Read-only view of the root mapping
    pub fn root(&self) -> NodeRef<'_> {
        self.node(ROOT)
    }

    /// Number of reachable permissions
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![ROOT];
        while let Some(id) = pending.pop() {
            match &self.nodes[id] {
                Node::Branch(children) => pending.extend(children.values().copied()),
                Node::Leaf(_) => count += 1,
            }
        }
        count
    }

    /// Returns whether no permission is reachable
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nested JSON export of the tree structure
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn node(&self, id: NodeId) -> NodeRef<'_> {
        match &self.nodes[id] {
            Node::Branch(children) => NodeRef::Branch(BranchRef { tree: self, children }),
            Node::Leaf(permission) => NodeRef::Leaf(permission),
        }
    }

    /// Child branch of `parent` at `tier`, created or replaced as needed
    fn branch_for(&mut self, parent: NodeId, tier: String) -> NodeId {
        let existing = match &self.nodes[parent] {
            Node::Branch(children) => children.get(&tier).copied(),
            Node::Leaf(_) => None,
        };

        if let Some(child) = existing {
            if let Node::Branch(_) = self.nodes[child] {
                return child;
            }
            trace!("Replacing permission at tier {} with an empty branch", tier);
        }

        let branch = self.alloc(Node::Branch(BTreeMap::new()));
        if let Node::Branch(children) = &mut self.nodes[parent] {
            children.insert(tier, branch);
        }
        branch
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

impl Default for PermissionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Permission> for PermissionTree {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::with_permissions(iter)
    }
}

impl Extend<Permission> for PermissionTree {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl Serialize for PermissionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

/// Read-only reference to a tree node
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// Mapping from tier to deeper nodes
    Branch(BranchRef<'a>),
    /// Stored permission
    Leaf(&'a Permission),
}

impl<'a> NodeRef<'a> {
    /// The permission, if this is a leaf
    pub fn as_permission(&self) -> Option<&'a Permission> {
        match self {
            Self::Leaf(permission) => Some(permission),
            Self::Branch(_) => None,
        }
    }

    /// The mapping, if this is a branch
    pub fn as_branch(&self) -> Option<BranchRef<'a>> {
        match self {
            Self::Branch(branch) => Some(*branch),
            Self::Leaf(_) => None,
        }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Branch(branch) => {
                let mut map = serializer.serialize_map(Some(branch.len()))?;
                for (tier, child) in branch.iter() {
                    map.serialize_entry(tier, &child)?;
                }
                map.end()
            }
            Self::Leaf(permission) => Serialize::serialize(*permission, serializer),
        }
    }
}

/// Read-only view of a branch's children, ordered by tier
#[derive(Clone, Copy)]
pub struct BranchRef<'a> {
    tree: &'a PermissionTree,
    children: &'a BTreeMap<String, NodeId>,
}

impl<'a> BranchRef<'a> {
    /// Child stored under `tier`
    pub fn get(&self, tier: &str) -> Option<NodeRef<'a>> {
        self.children.get(tier).map(|&id| self.tree.node(id))
    }

    /// Tiers present in this branch
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.children.keys().map(String::as_str)
    }

    /// Children paired with their tier
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, NodeRef<'a>)> + 'a {
        let tree = self.tree;
        self.children
            .iter()
            .map(move |(tier, &id)| (tier.as_str(), tree.node(id)))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Debug for BranchRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generate_filled_tree() -> PermissionTree {
        let mut tree = PermissionTree::new();
        tree.add_one(Permission::new("glimpse:users:robere2:email:write", true));
        tree.add_one(Permission::new("glimpse:users:robere2:email:read", true));
        tree.add_one(Permission::new("glimpse:users:robere2:name:read", true));
        tree.add_one(Permission::new("glimpse:users:daoj:email:read", true));
        tree.add_one(Permission::new("glimpse:users:daoj:*", true));
        tree.add_one(Permission::new("glimpse:tags:*", true));
        tree.add_one(Permission::new("glimpse:tags:Private:*", false));
        tree.add_one(Permission::new("glimpse:tags:Protected:write", false));
        tree.add_one(Permission::new("glimpse:tags:*", true));
        tree.add_one(Permission::new("glimpse:productions:*:read", true));
        tree.add_one(Permission::new("glimpse:productions:testing:read", false));
        tree.add_one(Permission::new("glimpse:productions:*:read", true));
        tree
    }

    #[test]
    fn test_constructor_permissions() {
        let tree = PermissionTree::with_permissions([
            Permission::new("glimpse:test", true),
            Permission::new("glimpse:test2:read", false),
        ]);

        assert_eq!(tree.evaluate("glimpse:test"), Decision::Allow);
        assert_eq!(tree.evaluate("glimpse:test2:read"), Decision::Deny);
        assert_eq!(tree.evaluate("glimpse:test2"), Decision::NoOpinion);
    }

    #[test]
    fn test_add() {
        let mut tree = PermissionTree::new();
        assert_eq!(tree.evaluate("glimpse:test"), Decision::NoOpinion);
        assert_eq!(tree.evaluate("glimpse:test2:read"), Decision::NoOpinion);

        tree.add([
            Permission::new("glimpse:test", true),
            Permission::new("glimpse:test2:read", false),
        ]);
        assert_eq!(tree.evaluate("glimpse:test"), Decision::Allow);
        assert_eq!(tree.evaluate("glimpse:test2:read"), Decision::Deny);
        assert_eq!(tree.evaluate("glimpse:test2"), Decision::NoOpinion);
    }

    #[test]
    fn test_filled_tree_evaluation() {
        let tree = generate_filled_tree();
        let cases = [
            ("glimpse:users:*", Decision::NoOpinion),
            ("glimpse:users:robere2:*", Decision::NoOpinion),
            ("glimpse:users:robere2", Decision::NoOpinion),
            ("glimpse:users:daoj:email:read", Decision::Allow),
            ("glimpse:users:robere2:daoj:email:read", Decision::NoOpinion),
            ("glimpse:tags:*", Decision::Allow),
            ("glimpse:tags:Private:read", Decision::Deny),
            ("glimpse:tags:Private:write", Decision::Deny),
            ("glimpse:tags:Private:write:read", Decision::Deny),
            ("glimpse:tags:Private:*", Decision::Deny),
            ("glimpse:tags:Protected:write", Decision::Deny),
            ("glimpse:tags:Protected:read", Decision::Allow),
            ("glimpse:productions:testing:read", Decision::Deny),
            ("glimpse:productions:*:read", Decision::Allow),
            ("glimpse:productions:testing:write", Decision::NoOpinion),
        ];

        for (scope, expected) in cases {
            assert_eq!(tree.evaluate(scope), expected, "scope {}", scope);
        }
    }

    #[test]
    fn test_empty_tree_and_empty_query() {
        let tree = PermissionTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.evaluate(""), Decision::NoOpinion);
        assert_eq!(tree.evaluate("anything:at:all"), Decision::NoOpinion);
        assert_eq!(FULL_ACCESS.evaluate(""), Decision::NoOpinion);
    }

    #[test]
    fn test_full_access() {
        let tree = &*FULL_ACCESS;
        assert_eq!(tree.evaluate("glimpse:test"), Decision::Allow);
        assert_eq!(tree.evaluate("glimpse:test2:read"), Decision::Allow);
        assert_eq!(tree.evaluate("glimpse:test2"), Decision::Allow);
        assert_eq!(tree.evaluate("*"), Decision::Allow);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_leaf_on_path_is_replaced_by_branch() {
        let mut tree = PermissionTree::with_permissions([Permission::allow("a:b")]);
        tree.add_one(Permission::deny("a:b:c"));

        assert_eq!(tree.evaluate("a:b"), Decision::NoOpinion);
        assert_eq!(tree.evaluate("a:b:c"), Decision::Deny);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_leaf_overwrites_branch() {
        let mut tree = PermissionTree::with_permissions([Permission::deny("a:b:c")]);
        tree.add_one(Permission::allow("a:b"));

        assert_eq!(tree.evaluate("a:b"), Decision::Allow);
        assert_eq!(tree.evaluate("a:b:c"), Decision::NoOpinion);
    }

    #[test]
    fn test_no_opinion_entries_are_skipped() {
        let tree = PermissionTree::with_permissions([
            Permission::new("a:b", Decision::NoOpinion),
            Permission::allow("a:*"),
        ]);
        assert_eq!(tree.evaluate("a:b"), Decision::Allow);

        let tree = PermissionTree::with_permissions([Permission::new("a:b", Decision::NoOpinion)]);
        assert_eq!(tree.evaluate("a:b"), Decision::NoOpinion);
    }

    #[test]
    fn test_empty_scope_permission_is_ignored() {
        let tree = PermissionTree::with_permissions([Permission::allow("")]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_matching_order() {
        let tree = generate_filled_tree();
        let matches: Vec<String> = tree
            .matching("glimpse:tags:Private:write:read")
            .iter()
            .map(|permission| permission.to_string())
            .collect();
        assert_eq!(matches, vec!["glimpse:tags:Private:* = 1", "glimpse:tags:* = 0"]);
    }

    #[test]
    fn test_json_export() {
        let tree = PermissionTree::with_permissions([
            Permission::new("*", false),
            Permission::new("glimpse:test", true),
            Permission::new("glimpse:test2:read", false),
        ]);

        let expected = json!({
            "*": {"scope": "*", "decision": "DENY"},
            "glimpse": {
                "test": {"scope": "glimpse:test", "decision": "ALLOW"},
                "test2": {
                    "read": {"scope": "glimpse:test2:read", "decision": "DENY"}
                }
            }
        });
        assert_eq!(tree.to_json().unwrap(), expected);
    }

    #[test]
    fn test_structural_view() {
        let tree = PermissionTree::with_permissions([Permission::allow("glimpse:test")]);
        let glimpse = tree.root().as_branch().unwrap().get("glimpse").unwrap();
        let branch = glimpse.as_branch().unwrap();
        assert_eq!(branch.keys().collect::<Vec<_>>(), vec!["test"]);

        let leaf = branch.get("test").unwrap().as_permission().unwrap();
        assert_eq!(leaf.decision(), Decision::Allow);
        assert!(branch.get("missing").is_none());
    }
}
