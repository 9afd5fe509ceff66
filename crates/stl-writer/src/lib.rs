//! Streaming STL writer for triangulated surface geometry.
//!
//! Writes binary or text STL one facet at a time, with no mesh buffering. Normals are
//! computed from vertex winding unless supplied, and quads and axis-aligned boxes are
//! decomposed into triangles on the way in.
//!
//! ```no_run
//! use stl_writer::{write_stl_file, MeshSink, Mode, Triangle};
//!
//! write_stl_file("part.stl", Mode::Binary, "", |stl| {
//!     stl.add_triangle(Triangle::new([0.0, 0.0, 0.5], [0.0, 1.0, 0.0], [1.0, 1.0, 0.5]))
//! })?;
//! # Ok::<(), stl_writer::StlError>(())
//! ```
//!
//! # Key Components
//!
//! - [`StlWriter`] — header/trailer lifecycle over any sink, generic over the encoding
//! - [`StlFile`] / [`write_stl_file`] — file-backed writer with the encoding picked at runtime
//! - [`MeshSink`] — triangle, quad and cuboid submission
//! - [`format`] — the [`Binary`] and [`Text`] encoders
//! - [`geometry`] — vectors, triangles, normals

pub mod config;
pub mod errors;
pub mod format;
pub mod geometry;
pub mod shapes;
pub mod writer;

pub use config::{Mode, WriterConfig};
pub use errors::{Result, StlError};
pub use format::{Binary, StlFormat, Text};
pub use geometry::{
    calc_normal, try_unit_vector, unit_vector, vector_length, Facet, Triangle, Vec3,
};
pub use shapes::MeshSink;
pub use writer::{write_stl_file, write_stl_file_with_config, FileSink, StlFile, StlWriter};
