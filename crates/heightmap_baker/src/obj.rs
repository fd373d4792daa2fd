//! Minimal Wavefront OBJ reader.
//!
//! Only geometry is read: `v` positions and `f` faces. Polygons are fan
//! triangulated. Normals, texture coordinates, groups and materials are
//! skipped.

use anyhow::{Context, Result};
use mesh_terrain::TriangleMesh;
use std::path::Path;

/// Positions and triangle indices read from an OBJ file.
#[derive(Debug, Default)]
pub struct ObjGeometry {
	pub positions: Vec<[f32; 3]>,
	pub indices: Vec<u32>,
}

impl ObjGeometry {
	/// Read and parse an OBJ file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read mesh: {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("Failed to parse OBJ: {}", path.display()))
	}

	/// Parse OBJ text.
	pub fn parse(content: &str) -> Result<Self> {
		let mut geometry = Self::default();

		for (line_idx, line) in content.lines().enumerate() {
			let line_no = line_idx + 1;
			let mut tokens = line.split_whitespace();

			match tokens.next() {
				Some("v") => {
					let mut position = [0.0f32; 3];
					for axis in &mut position {
						let token = tokens
							.next()
							.with_context(|| format!("line {}: vertex needs 3 coordinates", line_no))?;
						*axis = token
							.parse()
							.with_context(|| format!("line {}: bad coordinate '{}'", line_no, token))?;
					}
					geometry.positions.push(position);
				}
				Some("f") => {
					let corners = tokens
						.map(|token| geometry.resolve_index(token, line_no))
						.collect::<Result<Vec<_>>>()?;
					if corners.len() < 3 {
						anyhow::bail!("line {}: face needs at least 3 vertices", line_no);
					}
					// Fan triangulation around the first corner
					for pair in corners[1..].windows(2) {
						geometry.indices.extend_from_slice(&[corners[0], pair[0], pair[1]]);
					}
				}
				_ => {}
			}
		}

		Ok(geometry)
	}

	/// Resolve a face corner (`v`, `v/vt`, `v//vn`, `v/vt/vn`) to a zero-based
	/// position index. Negative indices count back from the latest vertex.
	fn resolve_index(&self, token: &str, line_no: usize) -> Result<u32> {
		let vertex = token.split('/').next().unwrap_or(token);
		let index: i64 = vertex
			.parse()
			.with_context(|| format!("line {}: bad face index '{}'", line_no, token))?;

		let count = self.positions.len() as i64;
		let resolved = match index {
			i if i > 0 => i - 1,
			i if i < 0 => count + i,
			_ => anyhow::bail!("line {}: face index 0 is not valid", line_no),
		};
		if !(0..count).contains(&resolved) {
			anyhow::bail!(
				"line {}: face index {} out of range for {} vertices",
				line_no,
				index,
				count
			);
		}

		Ok(resolved as u32)
	}

	/// Build a raycastable mesh from the geometry.
	pub fn into_mesh(self) -> Result<TriangleMesh> {
		TriangleMesh::new(self.positions, self.indices).context("Invalid mesh geometry")
	}
}
