#![warn(missing_docs)]

//! Frame encoding and point-cloud export.
//!
//! The simulation loop produces float [`Frame`](kinema_render::Frame)s;
//! this crate turns ordered frame sequences into animated GIFs (with an
//! optional size-optimizing re-encode pass), single frames into PNGs,
//! and depth frames into colored point clouds serialized as ASCII PCD.

mod error;
mod gif;
mod pointcloud;

pub use error::ExportError;
pub use gif::{encode_gif, frame_to_rgba, optimize_gif, save_png, GifSettings};
pub use pointcloud::PointCloud;
