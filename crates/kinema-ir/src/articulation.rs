//! The finalized, immutable articulation description.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::joint::{JointKind, JointLimits};
use crate::pose::Pose;
use crate::shape::{CollisionShape, VisualShape};

/// One rigid body in a finalized articulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Link name, unique within the articulation.
    pub name: String,
    /// Index of the parent link, `None` for the root.
    pub parent: Option<usize>,
    /// Collision shapes.
    pub collisions: Vec<CollisionShape>,
    /// Visual shapes.
    pub visuals: Vec<VisualShape>,
    /// Index into [`Articulation::joints`] of the joint to the parent,
    /// `None` for the root.
    pub joint: Option<usize>,
}

/// A finalized joint connecting a link to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Joint name, unique within the articulation.
    pub name: String,
    /// Kind of motion.
    pub kind: JointKind,
    /// One limit pair per degree of freedom.
    pub limits: Vec<JointLimits>,
    /// Joint frame pose relative to the parent link frame.
    pub pose_in_parent: Pose,
    /// Joint frame pose relative to the child link frame.
    pub pose_in_child: Pose,
    /// Passive friction coefficient.
    pub friction: f64,
    /// Passive damping coefficient.
    pub damping: f64,
    /// Index of the child link this joint drives.
    pub child_link: usize,
}

/// An immutable tree of links connected by joints.
///
/// Produced by [`ArticulationBuilder::build`](crate::ArticulationBuilder::build).
/// The topology is frozen: links are stored in a topological order with
/// parent indices (the root is always index 0), joints in a parallel
/// array addressed through a name map built once at finalize time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Articulation {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    joint_index: HashMap<String, usize>,
}

impl Articulation {
    pub(crate) fn from_parts(name: String, links: Vec<Link>, joints: Vec<Joint>) -> Self {
        let joint_index = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.name.clone(), i))
            .collect();
        Self {
            name,
            links,
            joints,
            joint_index,
        }
    }

    /// Articulation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All links, root first, parents before children.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All joints, in link order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The root link.
    pub fn root(&self) -> &Link {
        &self.links[0]
    }

    /// Look up a joint by name.
    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joint_index.get(name).map(|&i| &self.joints[i])
    }

    /// Stable index of a named joint into [`joints`](Self::joints).
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_index.get(name).copied()
    }

    /// Index of a named link.
    pub fn link_index(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|l| l.name == name)
    }

    /// Total degrees of freedom: the sum over non-fixed joints.
    pub fn dof(&self) -> usize {
        self.joints.iter().map(|j| j.kind.dof()).sum()
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{ArticulationBuilder, LinkSpec};
    use crate::joint::{JointLimits, JointSpec};
    use crate::shape::{CollisionShape, ShapeGeometry};

    fn two_link() -> crate::Articulation {
        let mut builder = ArticulationBuilder::new("arm");
        let root = builder
            .add_link(
                None,
                LinkSpec::named("base").with_collision(CollisionShape::new(
                    ShapeGeometry::Sphere { radius: 0.2 },
                    1.0,
                )),
            )
            .unwrap();
        let tip = builder.add_link(Some(root), LinkSpec::named("tip")).unwrap();
        builder
            .set_joint(
                tip,
                JointSpec::revolute("hinge", JointLimits::from_degrees(-15.0, 15.0)),
            )
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_root_is_first_and_parentless() {
        let articulation = two_link();
        assert_eq!(articulation.root().name, "base");
        assert!(articulation.root().parent.is_none());
        assert_eq!(articulation.links()[1].parent, Some(0));
    }

    #[test]
    fn test_joint_lookup() {
        let articulation = two_link();
        assert_eq!(articulation.joint_index("hinge"), Some(0));
        assert!(articulation.joint("hinge").is_some());
        assert!(articulation.joint("nope").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let articulation = two_link();
        let json = articulation.to_json().unwrap();
        let back = crate::Articulation::from_json(&json).unwrap();

        assert_eq!(back.name(), articulation.name());
        assert_eq!(back.dof(), articulation.dof());
        assert_eq!(back.links(), articulation.links());
        assert_eq!(back.joints(), articulation.joints());
        assert_eq!(back.joint_index("hinge"), Some(0));
    }
}
