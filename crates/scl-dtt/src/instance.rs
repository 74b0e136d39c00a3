// crates/scl-dtt/src/instance.rs
//! The instantiated value tree of one logical node: `DOI -> SDI* -> DAI`.
//!
//! Nodes live in an arena owned by the `LnInstance` and are addressed by
//! `InstanceId`. Nodes are only ever appended, never removed.
//!
//! The tree records what a document instantiates, not what its LNodeType
//! declares. Names are not checked against the type library here; the
//! `InstanceTracker` walks both side by side and creates missing nodes on
//! demand when a value is written.
//!
//! Values are keyed by setting group. A DAI without `sGroup` stores its value
//! under `NO_SETTING_GROUP`, and a DAI may hold several groups at once.

use crate::attribute::LnRef;
use crate::error::DttError;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Index of a node inside one `LnInstance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(usize);

/// Handle to a DAI node, used to read and write its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DaiHandle(InstanceId);

impl DaiHandle {
    pub fn id(&self) -> InstanceId {
        self.0
    }
}

/// A DOI or SDI: a named node with ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataNode {
    pub name: String,
    children: Vec<InstanceId>,
}

impl DataNode {
    pub fn children(&self) -> &[InstanceId] {
        &self.children
    }
}

/// A DAI: a leaf holding values per setting group (`0` when no `sGroup`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaiNode {
    pub name: String,
    /// Explicit `valImport` of the instance, if the document sets one.
    pub val_import: Option<bool>,
    pub values: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceNode {
    Doi(DataNode),
    Sdi(DataNode),
    Dai(DaiNode),
}

impl InstanceNode {
    pub fn name(&self) -> &str {
        match self {
            InstanceNode::Doi(n) | InstanceNode::Sdi(n) => &n.name,
            InstanceNode::Dai(n) => &n.name,
        }
    }

    pub fn children(&self) -> &[InstanceId] {
        match self {
            InstanceNode::Doi(n) | InstanceNode::Sdi(n) => n.children(),
            InstanceNode::Dai(_) => &[],
        }
    }
}

/// One logical node instance and its DOI/SDI/DAI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnInstance {
    ln: LnRef,
    nodes: Vec<InstanceNode>,
    dois: Vec<InstanceId>,
}

impl LnInstance {
    pub fn new(ln: LnRef) -> Self {
        Self {
            ln,
            nodes: Vec::new(),
            dois: Vec::new(),
        }
    }

    pub fn ln(&self) -> &LnRef {
        &self.ln
    }

    /// Points the instance at another LNodeType, e.g. after its type was renamed by a merge.
    pub fn set_ln_type(&mut self, ln_type: &str) {
        self.ln.ln_type = ln_type.to_string();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: InstanceId) -> Option<&InstanceNode> {
        self.nodes.get(id.0)
    }

    pub fn dois(&self) -> &[InstanceId] {
        &self.dois
    }

    // --- Lookup ---

    /// First DOI named `name`.
    pub fn doi(&self, name: &str) -> Option<InstanceId> {
        self.dois
            .iter()
            .copied()
            .find(|&id| self.node(id).is_some_and(|n| n.name() == name))
    }

    /// First child of `parent` named `name`, of any kind.
    pub fn child(&self, parent: InstanceId, name: &str) -> Option<InstanceId> {
        self.node(parent)?
            .children()
            .iter()
            .copied()
            .find(|&id| self.node(id).is_some_and(|n| n.name() == name))
    }

    /// First SDI child of `parent` named `name`.
    pub fn child_sdi(&self, parent: InstanceId, name: &str) -> Option<InstanceId> {
        self.node(parent)?.children().iter().copied().find(|&id| {
            matches!(self.node(id), Some(InstanceNode::Sdi(n)) if n.name == name)
        })
    }

    /// First DAI child of `parent` named `name`.
    pub fn child_dai(&self, parent: InstanceId, name: &str) -> Option<DaiHandle> {
        self.node(parent)?
            .children()
            .iter()
            .copied()
            .find(|&id| matches!(self.node(id), Some(InstanceNode::Dai(n)) if n.name == name))
            .map(DaiHandle)
    }

    pub fn dai(&self, handle: DaiHandle) -> Option<&DaiNode> {
        match self.node(handle.0) {
            Some(InstanceNode::Dai(dai)) => Some(dai),
            _ => None,
        }
    }

    // --- Insertion ---

    fn push(&mut self, node: InstanceNode) -> InstanceId {
        let id = InstanceId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Appends a top-level DOI. Duplicate names are kept; lookups return the first.
    pub fn add_doi(&mut self, name: &str) -> InstanceId {
        let id = self.push(InstanceNode::Doi(DataNode {
            name: name.to_string(),
            children: Vec::new(),
        }));
        self.dois.push(id);
        id
    }

    fn attach(&mut self, parent: InstanceId, name: &str, node: InstanceNode) -> Result<InstanceId, DttError> {
        match self.nodes.get(parent.0) {
            Some(InstanceNode::Doi(_) | InstanceNode::Sdi(_)) => {}
            Some(InstanceNode::Dai(_)) => {
                return Err(DttError::InvalidInstanceNode {
                    name: name.to_string(),
                    reason: "a DAI cannot have children",
                });
            }
            None => {
                return Err(DttError::InvalidInstanceNode {
                    name: name.to_string(),
                    reason: "unknown parent node",
                });
            }
        }
        let id = self.push(node);
        if let Some(InstanceNode::Doi(p) | InstanceNode::Sdi(p)) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Appends an SDI under a DOI or SDI.
    ///
    /// Fails with `InvalidInstanceNode` when `parent` is a DAI or does not exist.
    pub fn add_sdi(&mut self, parent: InstanceId, name: &str) -> Result<InstanceId, DttError> {
        let node = InstanceNode::Sdi(DataNode {
            name: name.to_string(),
            children: Vec::new(),
        });
        self.attach(parent, name, node)
    }

    /// Appends an empty DAI under a DOI or SDI.
    ///
    /// `val_import` is the instance's own `valImport`; `None` leaves the
    /// decision to the attribute definition.
    pub fn add_dai(
        &mut self,
        parent: InstanceId,
        name: &str,
        val_import: Option<bool>,
    ) -> Result<DaiHandle, DttError> {
        let node = InstanceNode::Dai(DaiNode {
            name: name.to_string(),
            val_import,
            values: BTreeMap::new(),
        });
        self.attach(parent, name, node).map(DaiHandle)
    }

    /// Writes the value of one setting group, replacing any previous value of that group.
    pub fn set_value(&mut self, handle: DaiHandle, s_group: u32, value: &str) -> Result<(), DttError> {
        match self.nodes.get_mut(handle.0.0) {
            Some(InstanceNode::Dai(dai)) => {
                dai.values.insert(s_group, value.to_string());
                Ok(())
            }
            _ => Err(DttError::InvalidInstanceNode {
                name: format!("{:?}", handle),
                reason: "not a DAI of this logical node",
            }),
        }
    }

    /// Dotted names of every DAI, depth first in insertion order.
    pub fn dai_refs(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for &doi in &self.dois {
            self.collect_dai_refs(doi, String::new(), &mut refs);
        }
        refs
    }

    fn collect_dai_refs(&self, id: InstanceId, prefix: String, refs: &mut Vec<String>) {
        let Some(node) = self.node(id) else {
            return;
        };
        let path = if prefix.is_empty() {
            node.name().to_string()
        } else {
            format!("{}.{}", prefix, node.name())
        };
        match node {
            InstanceNode::Dai(_) => refs.push(path),
            InstanceNode::Doi(n) | InstanceNode::Sdi(n) => {
                for &child in n.children() {
                    self.collect_dai_refs(child, path.clone(), refs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> LnInstance {
        let mut ln = LnInstance::new(LnRef::new("PTOC", "1", "PTOC_1"));
        let str_val = ln.add_doi("StrVal");
        let set_mag = ln.add_sdi(str_val, "setMag").unwrap();
        let f = ln.add_dai(set_mag, "f", Some(true)).unwrap();
        ln.set_value(f, 1, "10").unwrap();
        let beh = ln.add_doi("Beh");
        ln.add_dai(beh, "stVal", None).unwrap();
        ln
    }

    #[test]
    fn test_lookup_by_name_and_kind() {
        let ln = instance();
        let str_val = ln.doi("StrVal").unwrap();
        let set_mag = ln.child_sdi(str_val, "setMag").unwrap();
        assert!(ln.child_dai(str_val, "setMag").is_none());
        let f = ln.child_dai(set_mag, "f").unwrap();
        assert_eq!(ln.dai(f).unwrap().values.get(&1).map(String::as_str), Some("10"));
        assert_eq!(ln.dai(f).unwrap().val_import, Some(true));
        assert!(ln.doi("Mod").is_none());
        assert_eq!(ln.child(str_val, "setMag"), Some(set_mag));
    }

    #[test]
    fn test_nodes_are_appended() {
        let mut ln = instance();
        let before = ln.len();
        let beh = ln.doi("Beh").unwrap();
        ln.add_dai(beh, "q", None).unwrap();
        assert_eq!(ln.len(), before + 1);
        assert_eq!(ln.dai_refs(), ["StrVal.setMag.f", "Beh.stVal", "Beh.q"]);
    }

    #[test]
    fn test_dai_cannot_have_children() {
        let mut ln = instance();
        let beh = ln.doi("Beh").unwrap();
        let st_val = ln.child_dai(beh, "stVal").unwrap();
        let err = ln.add_sdi(st_val.id(), "x").unwrap_err();
        assert!(matches!(err, DttError::InvalidInstanceNode { .. }));
    }

    #[test]
    fn test_set_value_replaces_group_value() {
        let mut ln = instance();
        let beh = ln.doi("Beh").unwrap();
        let st_val = ln.child_dai(beh, "stVal").unwrap();
        ln.set_value(st_val, 0, "on").unwrap();
        ln.set_value(st_val, 0, "off").unwrap();
        assert_eq!(ln.dai(st_val).unwrap().values.len(), 1);
        assert_eq!(ln.dai(st_val).unwrap().values[&0], "off");

        let not_a_dai = DaiHandle(beh);
        assert!(ln.set_value(not_a_dai, 0, "x").is_err());
    }

    #[test]
    fn test_ln_type_can_be_repointed() {
        let mut ln = instance();
        ln.set_ln_type("IED1_PTOC_1");
        assert_eq!(ln.ln().ln_type, "IED1_PTOC_1");
    }
}
