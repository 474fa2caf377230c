//! Deterministic offscreen preview rendering.
//!
//! This crate turns a normalized, tinted mesh into standardized PNG
//! previews. Rendering is a pure function of the mesh and a fixed scene
//! recipe: two canonical camera poses ([`camera::top_view`] and
//! [`camera::front_view`]), one ambient term, one directional light, and
//! a dark background. The same mesh always produces byte-identical
//! pixels.
//!
//! # Example
//!
//! ```
//! use gallery_render::{camera, render, RenderParams};
//! use gallery_types::{unit_cube, Vector3};
//!
//! let mut mesh = unit_cube();
//! mesh.translate(Vector3::new(-0.5, -0.5, -0.5));
//!
//! let image = render(&mesh, &camera::top_view(), &RenderParams::for_tests(64))?;
//! assert_eq!(image.dimensions(), (64, 64));
//! # Ok::<(), gallery_render::RenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod camera;
mod error;
mod output;
mod params;
mod raster;

pub use error::{RenderError, RenderResult};
pub use output::{enforce_background, render_to_file};
pub use params::{RenderParams, BACKGROUND};
pub use raster::render;
