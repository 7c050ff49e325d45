//! Static scene assembly: one batch per level surface.

use std::collections::HashMap;

use crate::batch::{GeometryBatcher, MeshLocation, SkippedMesh, Vertex};
use crate::core::{Error, Result};
use crate::math::{Aabb, BoundsAccumulator, Transform};

use super::texture::{TextureCache, TextureHandle, TextureRef, TextureResolver};

/// Parsed surface as handed over by the level parser
#[derive(Clone, Debug, Default)]
pub struct SurfaceMesh {
    /// Face index in the level's face lump
    pub face: usize,
    pub vertices: Vec<Vertex>,
    /// Triangle list into `vertices`
    pub indices: Vec<u32>,
    pub texture: String,
}

/// One drawable level surface in world space
#[derive(Clone, Debug)]
pub struct Batch {
    pub face: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub texture_name: String,
    /// Patched in place when a background load finishes
    pub texture: TextureRef,
    pub bounds: Aabb,
}

/// Output of static assembly for the level or one of its embedded models
#[derive(Debug, Default)]
pub struct LevelGeometry {
    batches: Vec<Batch>,
    bounds: Option<Aabb>,
    sky_bounds: Option<Aabb>,
    /// Texture name -> indices of batches still on the placeholder
    pending_textures: HashMap<String, Vec<usize>>,
    skipped: Vec<SkippedMesh>,
}

impl LevelGeometry {
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch(&self, index: usize) -> Option<&Batch> {
        self.batches.get(index)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Highest face index across all batches, plus one
    pub fn face_count(&self) -> usize {
        self.batches.iter().map(|b| b.face + 1).max().unwrap_or(0)
    }

    /// Bounds of every world-space vertex
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// World bounds scaled about their center, used to size the sky
    pub fn sky_bounds(&self) -> Option<Aabb> {
        self.sky_bounds
    }

    pub fn skipped(&self) -> &[SkippedMesh] {
        &self.skipped
    }

    /// Names whose batches are still waiting for a texture
    pub fn pending_texture_names(&self) -> impl Iterator<Item = &str> {
        self.pending_textures.keys().map(String::as_str)
    }

    /// Bind `handle` to every batch waiting on `name`.
    ///
    /// Replaces one `TextureRef` per affected batch; the batch list itself
    /// is never resized. Returns the number of batches patched.
    pub fn patch_texture(&mut self, name: &str, handle: TextureHandle) -> usize {
        let Some(indices) = self.pending_textures.remove(name) else {
            return 0;
        };
        let mut patched = 0;
        for i in indices {
            if let Some(batch) = self.batches.get_mut(i) {
                batch.texture = TextureRef::Resolved(handle);
                patched += 1;
            }
        }
        patched
    }
}

/// Builds `LevelGeometry` from parsed surfaces.
#[derive(Clone, Copy, Debug)]
pub struct StaticAssembler {
    batcher: GeometryBatcher,
    sky_scale: f32,
}

impl StaticAssembler {
    pub fn new(batcher: GeometryBatcher, sky_scale: f32) -> Self {
        Self { batcher, sky_scale }
    }

    /// Check that a surface fits in one batch and its indices are in range.
    pub fn validate_surface(&self, surface: &SurfaceMesh) -> Result<()> {
        if surface.vertices.is_empty() {
            return Err(Error::MalformedMesh("surface has no vertices".into()));
        }
        if surface.indices.len() % 3 != 0 {
            return Err(Error::MalformedMesh(format!(
                "index count {} is not a multiple of 3",
                surface.indices.len()
            )));
        }
        if surface.vertices.len() > self.batcher.capacity() {
            return Err(Error::MalformedMesh(format!(
                "{} vertices exceed batch capacity {}",
                surface.vertices.len(),
                self.batcher.capacity()
            )));
        }
        let vertex_count = surface.vertices.len();
        if let Some(&bad) = surface.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::MalformedMesh(format!(
                "index {} out of range for {} vertices",
                bad,
                surface.vertices.len()
            )));
        }
        Ok(())
    }

    /// Transform surfaces into world space, one batch each.
    ///
    /// Invalid surfaces are recorded in `skipped()` and left out. Textures
    /// that are neither in `cache` nor already loaded by `resolver` stay on
    /// the placeholder and are listed by `pending_texture_names()`.
    pub fn assemble(
        &self,
        surfaces: Vec<SurfaceMesh>,
        transform: &Transform,
        cache: &mut TextureCache,
        resolver: &dyn TextureResolver,
    ) -> LevelGeometry {
        let mut geometry = LevelGeometry::default();
        let mut world = BoundsAccumulator::new();

        for (index, surface) in surfaces.into_iter().enumerate() {
            if let Err(error) = self.validate_surface(&surface) {
                let location = MeshLocation::Surface { index, face: surface.face };
                geometry.skipped.push(SkippedMesh::new(location, error));
                continue;
            }

            let mut local = BoundsAccumulator::new();
            let vertices: Vec<Vertex> = surface
                .vertices
                .iter()
                .map(|v| {
                    let w = v.transformed(transform);
                    local.extend(w.position());
                    w
                })
                .collect();
            world.merge(&local);

            let texture = match cache.resolve(&surface.texture, resolver) {
                Some(handle) => TextureRef::Resolved(handle),
                None => {
                    geometry
                        .pending_textures
                        .entry(surface.texture.clone())
                        .or_default()
                        .push(geometry.batches.len());
                    TextureRef::Placeholder
                }
            };

            geometry.batches.push(Batch {
                face: surface.face,
                vertices,
                indices: surface.indices,
                texture_name: surface.texture,
                texture,
                // validated non-empty above
                bounds: local.finish().unwrap_or_default(),
            });
        }

        geometry.bounds = world.finish();
        geometry.sky_bounds = geometry.bounds.map(|b| b.scaled_about_center(self.sky_scale));

        log::info!(
            "Assembled {} surface batches ({} skipped, {} textures pending)",
            geometry.batches.len(),
            geometry.skipped.len(),
            geometry.pending_textures.len()
        );
        geometry
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::types::{Vec2, Vec3, Vec4};
    use crate::level::texture::tests::FakeResolver;

    /// Single-triangle surface spanning `min..min+1` on X and Y
    pub(crate) fn tri_surface(face: usize, min: Vec3, texture: &str) -> SurfaceMesh {
        let v = |p: Vec3| Vertex::new(p, Vec3::Z, Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO);
        SurfaceMesh {
            face,
            vertices: vec![v(min), v(min + Vec3::X), v(min + Vec3::Y)],
            indices: vec![0, 1, 2],
            texture: texture.to_string(),
        }
    }

    fn assembler() -> StaticAssembler {
        StaticAssembler::new(GeometryBatcher::new(6).unwrap(), 2.0)
    }

    #[test]
    fn test_one_batch_per_surface() {
        let mut resolver = FakeResolver::default();
        resolver.cached.insert("stone".into(), TextureHandle(3));
        let mut cache = TextureCache::new();

        let geo = assembler().assemble(
            vec![tri_surface(0, Vec3::ZERO, "stone"), tri_surface(4, Vec3::splat(2.0), "stone")],
            &Transform::identity(),
            &mut cache,
            &resolver,
        );

        assert_eq!(geo.len(), 2);
        assert_eq!(geo.face_count(), 5);
        assert!(geo.batches().iter().all(|b| b.texture == TextureRef::Resolved(TextureHandle(3))));
        assert_eq!(geo.pending_texture_names().count(), 0);
    }

    #[test]
    fn test_malformed_surfaces_are_skipped() {
        let resolver = FakeResolver::default();
        let mut cache = TextureCache::new();

        let mut bad_index = tri_surface(1, Vec3::ZERO, "a");
        bad_index.indices = vec![0, 1, 9];
        let mut bad_count = tri_surface(2, Vec3::ZERO, "a");
        bad_count.indices = vec![0, 1];
        let mut too_big = tri_surface(3, Vec3::ZERO, "a");
        too_big.vertices = vec![Vertex::default(); 7];

        let geo = assembler().assemble(
            vec![
                bad_index,
                tri_surface(0, Vec3::ZERO, "a"),
                bad_count,
                too_big,
                SurfaceMesh::default(),
            ],
            &Transform::identity(),
            &mut cache,
            &resolver,
        );

        assert_eq!(geo.len(), 1);
        assert_eq!(geo.batches()[0].face, 0);
        assert_eq!(geo.skipped().len(), 4);
        assert_eq!(geo.skipped()[0].location, MeshLocation::Surface { index: 0, face: 1 });
        assert!(geo.skipped().iter().all(|s| matches!(s.error, Error::MalformedMesh(_))));
    }

    #[test]
    fn test_patch_texture_only_touches_waiting_batches() {
        let mut resolver = FakeResolver::default();
        resolver.cached.insert("ready".into(), TextureHandle(1));
        let mut cache = TextureCache::new();

        let mut geo = assembler().assemble(
            vec![
                tri_surface(0, Vec3::ZERO, "late"),
                tri_surface(1, Vec3::ZERO, "ready"),
                tri_surface(2, Vec3::ZERO, "late"),
            ],
            &Transform::identity(),
            &mut cache,
            &resolver,
        );
        assert_eq!(geo.pending_texture_names().collect::<Vec<_>>(), vec!["late"]);

        assert_eq!(geo.patch_texture("late", TextureHandle(9)), 2);
        assert_eq!(geo.batches()[0].texture, TextureRef::Resolved(TextureHandle(9)));
        assert_eq!(geo.batches()[1].texture, TextureRef::Resolved(TextureHandle(1)));
        assert_eq!(geo.batches()[2].texture, TextureRef::Resolved(TextureHandle(9)));
        assert_eq!(geo.patch_texture("late", TextureHandle(10)), 0);
        assert_eq!(geo.len(), 3);
    }

    #[test]
    fn test_bounds_and_sky_bounds() {
        let resolver = FakeResolver::default();
        let mut cache = TextureCache::new();
        let geo = assembler().assemble(
            vec![tri_surface(0, Vec3::ZERO, "a"), tri_surface(1, Vec3::new(3.0, 3.0, 2.0), "a")],
            &Transform::from_position(Vec3::new(0.0, 0.0, 1.0)),
            &mut cache,
            &resolver,
        );

        let b = geo.bounds().unwrap();
        assert_eq!(b.min, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(b.max, Vec3::new(4.0, 4.0, 3.0));
        let sky = geo.sky_bounds().unwrap();
        assert_eq!(sky.center(), b.center());
        assert_eq!(sky.size(), b.size() * 2.0);
        assert!(geo.batches()[0].bounds.contains_point(Vec3::new(0.5, 0.5, 1.0)));
    }
}
