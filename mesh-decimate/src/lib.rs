//! Seam-aware quadric-error-metric mesh decimation.
//!
//! Reduces a triangle mesh's vertex count by greedily collapsing the
//! cheapest edge under a quadric error metric extended into combined
//! position + UV space. Texture-seam chains are preserved: seam vertices
//! only slide along their own seam, chart junctions never move, and
//! collapses that would fold a triangle over in 3D or in UV space are
//! rejected before mutation.
//!
//! The collapse loop is single-threaded and synchronous over one owned
//! context per run; distinct meshes can be decimated in parallel with no
//! shared state.
//!
//! # Examples
//!
//! ```
//! use mesh_decimate::{decimate_mesh, DecimateParams, Strictness};
//! use mesh_types::seamed_cube;
//!
//! let params = DecimateParams::new()
//!     .with_target_percent(50.0)
//!     .with_strictness(Strictness::Finite);
//! let result = decimate_mesh(&seamed_cube(), &params)?;
//! assert!(result.final_vertices <= result.original_vertices);
//! println!("{result}");
//! # Ok::<(), mesh_decimate::DecimateError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod collapse;
mod connectivity;
mod cost;
mod decimate;
mod error;
mod heap;
mod params;
mod qp;
mod quadric;
mod result;
mod seam;
mod state;
mod validity;

pub use decimate::decimate_mesh;
pub use error::DecimateError;
pub use params::{DecimateParams, Strictness};
pub use result::{DecimationResult, StopReason};
