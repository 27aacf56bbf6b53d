//! Staged articulation construction.
//!
//! Link and joint definitions are accumulated first and validated as a
//! whole in [`ArticulationBuilder::build`]. The two-phase shape mirrors
//! how physics backends allocate articulations: mass matrices and
//! constraint structures need the complete tree before anything physical
//! exists.

use slotmap::{new_key_type, SlotMap};
use std::collections::HashSet;

use crate::articulation::{Articulation, Joint, Link};
use crate::error::{BuildError, Result};
use crate::joint::JointSpec;
use crate::shape::{CollisionShape, VisualShape};

new_key_type! {
    /// Opaque handle for a link added to an [`ArticulationBuilder`].
    pub struct LinkId;
}

/// Description of one link accumulated by the builder.
#[derive(Debug, Clone, Default)]
pub struct LinkSpec {
    /// Link name, unique within the articulation.
    pub name: String,
    /// Collision shapes.
    pub collisions: Vec<CollisionShape>,
    /// Visual shapes.
    pub visuals: Vec<VisualShape>,
}

impl LinkSpec {
    /// Create an empty link spec with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collisions: Vec::new(),
            visuals: Vec::new(),
        }
    }

    /// Append a collision shape.
    pub fn with_collision(mut self, shape: CollisionShape) -> Self {
        self.collisions.push(shape);
        self
    }

    /// Append a visual shape.
    pub fn with_visual(mut self, shape: VisualShape) -> Self {
        self.visuals.push(shape);
        self
    }
}

#[derive(Debug, Clone)]
struct LinkEntry {
    spec: LinkSpec,
    parent: Option<LinkId>,
    joint: Option<JointSpec>,
}

/// Accumulates link and joint specs, then finalizes them into an
/// immutable [`Articulation`].
///
/// Parents must be added before their children, which makes cycles
/// unrepresentable; the remaining tree properties are checked in
/// [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ArticulationBuilder {
    name: String,
    links: SlotMap<LinkId, LinkEntry>,
    order: Vec<LinkId>,
}

impl ArticulationBuilder {
    /// Create a builder for an articulation with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Add a link. `parent` is `None` for the root link.
    ///
    /// Fails with [`BuildError::InvalidTopology`] if the parent handle
    /// does not belong to this builder or the link name is already taken.
    pub fn add_link(&mut self, parent: Option<LinkId>, spec: LinkSpec) -> Result<LinkId> {
        if let Some(parent) = parent {
            if !self.links.contains_key(parent) {
                return Err(BuildError::InvalidTopology(format!(
                    "unresolved parent for link '{}'",
                    spec.name
                )));
            }
        }
        if self.order.iter().any(|&id| self.links[id].spec.name == spec.name) {
            return Err(BuildError::InvalidTopology(format!(
                "duplicate link name '{}'",
                spec.name
            )));
        }

        let id = self.links.insert(LinkEntry {
            spec,
            parent,
            joint: None,
        });
        self.order.push(id);
        Ok(id)
    }

    /// Set the joint connecting `link` to its parent.
    ///
    /// Fails with [`BuildError::InvalidJointSpec`] if the limit count does
    /// not match the joint kind, the joint name is already used on this
    /// articulation, or `link` is the root; fails with
    /// [`BuildError::InvalidTopology`] if `link` does not resolve.
    /// Setting a joint on a link that already has one replaces that
    /// link's own spec; a name used by any other joint in the
    /// articulation is rejected, never silently overwritten.
    pub fn set_joint(&mut self, link: LinkId, joint: JointSpec) -> Result<()> {
        let entry = self
            .links
            .get(link)
            .ok_or_else(|| BuildError::InvalidTopology("unresolved link handle".to_string()))?;

        if entry.parent.is_none() {
            return Err(BuildError::InvalidJointSpec {
                joint: joint.name.clone(),
                reason: "root link cannot have a joint".to_string(),
            });
        }

        let required = joint.kind.required_limit_pairs();
        if joint.limits.len() != required {
            return Err(BuildError::InvalidJointSpec {
                joint: joint.name.clone(),
                reason: format!(
                    "{:?} joint requires {} limit pair(s), got {}",
                    joint.kind,
                    required,
                    joint.limits.len()
                ),
            });
        }

        let collides = self.order.iter().any(|&id| {
            id != link
                && self.links[id]
                    .joint
                    .as_ref()
                    .is_some_and(|j| j.name == joint.name)
        });
        if collides {
            return Err(BuildError::InvalidJointSpec {
                joint: joint.name.clone(),
                reason: "joint name already used in this articulation".to_string(),
            });
        }

        self.links[link].joint = Some(joint);
        Ok(())
    }

    /// Number of links added so far.
    pub fn num_links(&self) -> usize {
        self.order.len()
    }

    /// Finalize the accumulated description.
    ///
    /// Fails with [`BuildError::IncompleteTopology`] if there is no link,
    /// no root, more than one root, or a non-root link without a joint.
    /// Building does not consume the builder and repeated calls produce
    /// equal articulations.
    pub fn build(&self) -> Result<Articulation> {
        if self.order.is_empty() {
            return Err(BuildError::IncompleteTopology(
                "articulation has no links".to_string(),
            ));
        }

        let roots: Vec<&LinkEntry> = self
            .order
            .iter()
            .map(|&id| &self.links[id])
            .filter(|e| e.parent.is_none())
            .collect();
        match roots.len() {
            0 => {
                return Err(BuildError::IncompleteTopology(
                    "articulation has no root link".to_string(),
                ))
            }
            1 => {}
            n => {
                return Err(BuildError::IncompleteTopology(format!(
                    "link graph is disconnected: {n} root links"
                )))
            }
        }

        // Handle → dense index, in insertion order. Insertion order is a
        // valid topological order because parents pre-exist children.
        let index_of = |id: LinkId| -> usize {
            self.order.iter().position(|&o| o == id).unwrap_or(usize::MAX)
        };

        let mut links = Vec::with_capacity(self.order.len());
        let mut joints = Vec::new();
        let mut seen_joint_names = HashSet::new();

        for &id in &self.order {
            let entry = &self.links[id];
            let parent = entry.parent.map(index_of);

            let joint = match (&entry.parent, &entry.joint) {
                (None, _) => None,
                (Some(_), None) => {
                    return Err(BuildError::IncompleteTopology(format!(
                        "link '{}' has no joint to its parent",
                        entry.spec.name
                    )))
                }
                (Some(_), Some(spec)) => {
                    // set_joint already rejects collisions; this guards the
                    // finalize pass independently.
                    if !seen_joint_names.insert(spec.name.clone()) {
                        return Err(BuildError::InvalidJointSpec {
                            joint: spec.name.clone(),
                            reason: "joint name already used in this articulation".to_string(),
                        });
                    }
                    joints.push(Joint {
                        name: spec.name.clone(),
                        kind: spec.kind,
                        limits: spec.limits.clone(),
                        pose_in_parent: spec.pose_in_parent,
                        pose_in_child: spec.pose_in_child,
                        friction: spec.friction,
                        damping: spec.damping,
                        child_link: links.len(),
                    });
                    Some(joints.len() - 1)
                }
            };

            links.push(Link {
                name: entry.spec.name.clone(),
                parent,
                collisions: entry.spec.collisions.clone(),
                visuals: entry.spec.visuals.clone(),
                joint,
            });
        }

        Ok(Articulation::from_parts(self.name.clone(), links, joints))
    }
}
