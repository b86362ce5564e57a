//! Geodesic (surface) distances and shortest paths on triangle meshes.
//!
//! This crate propagates a front over a [`TriMesh`] with the Fast Marching
//! Method and walks back down the resulting field:
//!
//! - [`FastMarching`] - Front propagation from one or more seed vertices,
//!   with per-vertex costs, stop criteria and exclusion sets
//! - [`DistanceField`] - Per-vertex arrival times with an unreached sentinel
//! - [`GeodesicPath`] - Steepest-descent tracing from any vertex to the seeds
//! - [`solve_batch`] - Independent solves over one shared mesh, in parallel
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Other game engines
//! - Python bindings
//!
//! # Algorithm
//!
//! Each finalized vertex re-solves the Eikonal equation `|∇T| = F` for the
//! non-finalized corners of its faces. Two update rules are available (see
//! [`UpdateMethod`]). Both fall back to an edge update when the solution is
//! not causal. Obtuse angles are handled by unfolding neighboring faces into
//! the plane until a vertex inside the obtuse cone is found.
//!
//! Unlike shortest paths along edges, fast marching lets the front cut across
//! faces: a plane wave on a flat mesh is reproduced exactly.
//!
//! # Example
//!
//! ```
//! use mesh_connectivity::primitives::grid;
//! use mesh_geodesic::{FastMarching, GeodesicPath, TraceStatus};
//!
//! let mesh = grid(10, 10, 0.1);
//!
//! // Distances from the corner vertex, stopping 0.5 away
//! let mut fmm = FastMarching::new(&mesh).unwrap().with_stop_radius(0.5);
//! fmm.add_seed(0).unwrap();
//! let summary = fmm.solve().unwrap();
//! assert!(summary.stopped_early);
//!
//! // Full field, then the path back from the far corner
//! let mut fmm = FastMarching::new(&mesh).unwrap();
//! fmm.add_seed(0).unwrap();
//! fmm.solve().unwrap();
//! let field = fmm.distance_field();
//!
//! let mut tracer = GeodesicPath::new(&mesh, &field).unwrap();
//! assert_eq!(tracer.compute_path(99, 200).unwrap(), TraceStatus::ReachedSeed);
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards:
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod batch;
mod config;
mod distance;
pub mod eikonal;
mod error;
mod fast_marching;
mod path;
mod summary;
mod trace;
mod unfold;

pub use batch::{solve_batch, try_solve_batch};
pub use config::{DEFAULT_MAX_UNFOLD_STEPS, FmmConfig, TracerConfig, UpdateMethod};
pub use distance::DistanceField;
pub use error::{GeodesicError, GeodesicResult};
pub use fast_marching::{FastMarching, VertexState, geodesic_distance};
pub use path::{GeodesicPath, PathPoint, PathStep, TraceStatus};
pub use summary::SolveSummary;
pub use trace::{TracedPath, TracedSample, trace_geodesic};

// Re-export the mesh store for convenience
pub use mesh_connectivity::TriMesh;
