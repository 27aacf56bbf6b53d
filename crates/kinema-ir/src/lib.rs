#![warn(missing_docs)]

//! Articulation description layer for the kinema simulation stack.
//!
//! This crate defines the declarative model of an articulated rigid body:
//! links carrying collision/visual shapes, joints parameterized by kind,
//! limits and frame poses, and the staged [`ArticulationBuilder`] that
//! validates a link tree and finalizes it into an immutable
//! [`Articulation`].
//!
//! The description is purely declarative — no physics or render resources.
//! Handing it to a simulation backend is the job of downstream crates.
//!
//! # Example
//!
//! ```
//! use kinema_ir::{
//!     ArticulationBuilder, CollisionShape, JointLimits, JointSpec, LinkSpec,
//!     ShapeGeometry,
//! };
//!
//! let mut builder = ArticulationBuilder::new("pendulum");
//! let base = builder
//!     .add_link(
//!         None,
//!         LinkSpec::named("base").with_collision(CollisionShape::new(
//!             ShapeGeometry::Box { half_extents: [0.5, 0.5, 0.1] },
//!             1.0,
//!         )),
//!     )
//!     .unwrap();
//! let arm = builder
//!     .add_link(Some(base), LinkSpec::named("arm"))
//!     .unwrap();
//! builder
//!     .set_joint(arm, JointSpec::revolute("hinge", JointLimits::FREE))
//!     .unwrap();
//!
//! let articulation = builder.build().unwrap();
//! assert_eq!(articulation.dof(), 1);
//! ```

mod articulation;
mod builder;
mod error;
mod joint;
mod pose;
mod shape;

pub use articulation::{Articulation, Joint, Link};
pub use builder::{ArticulationBuilder, LinkId, LinkSpec};
pub use error::{BuildError, Result};
pub use joint::{JointKind, JointLimits, JointSpec};
pub use pose::Pose;
pub use shape::{CollisionShape, ShapeGeometry, VisualShape};
