//! Animated model assembly: body part -> submodel -> animation -> frame -> batches.

use rayon::prelude::*;

use crate::batch::{BatchSegment, GeometryBatcher, MeshLocation, SkippedMesh};
use crate::core::types::{Vec2, Vec3};
use crate::entity::{EntityId, EntityKeyValues};
use crate::level::TextureRef;
use crate::math::{Aabb, BoundsAccumulator, Transform};

use super::light::{closest_light, LightSource, RenderTint};
use super::submodel::SubmodelTable;

/// Raw triangle soup for one frame, in the source format's reversed order
#[derive(Clone, Debug, Default)]
pub struct FrameSource {
    pub positions: Vec<Vec3>,
    /// Empty, or one per position
    pub uvs: Vec<Vec2>,
}

#[derive(Clone, Debug, Default)]
pub struct SubmodelSource {
    pub name: String,
    /// Animation clips, each a list of frames
    pub animations: Vec<Vec<FrameSource>>,
}

#[derive(Clone, Debug, Default)]
pub struct BodyPartSource {
    pub name: String,
    pub submodels: Vec<SubmodelSource>,
}

/// Parsed model as handed over by the model parser
#[derive(Clone, Debug, Default)]
pub struct ModelSource {
    pub body_parts: Vec<BodyPartSource>,
    pub texture: String,
}

/// One animation clip: frame -> batches
#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub frames: Vec<Vec<BatchSegment>>,
}

#[derive(Clone, Debug, Default)]
pub struct Submodel {
    pub name: String,
    pub animations: Vec<Animation>,
}

impl Submodel {
    /// Batches for one frame; empty when the frame does not exist
    pub fn frame_batches(&self, animation: usize, frame: usize) -> &[BatchSegment] {
        self.animations
            .get(animation)
            .and_then(|a| a.frames.get(frame))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Group of interchangeable submodels, exactly one selected
#[derive(Clone, Debug, Default)]
pub struct BodyPart {
    pub name: String,
    pub submodels: Vec<Submodel>,
    selected: usize,
}

impl BodyPart {
    pub fn selected_submodel(&self) -> usize {
        self.selected
    }

    /// Make `submodel` the only enabled one. Out-of-range requests are
    /// ignored and return `false`.
    pub fn select_submodel(&mut self, submodel: usize) -> bool {
        if submodel >= self.submodels.len() {
            return false;
        }
        self.selected = submodel;
        true
    }

    /// Batches-per-submodel table for one frame
    pub fn submodel_table(&self, animation: usize, frame: usize) -> SubmodelTable {
        SubmodelTable::new(
            self.submodels
                .iter()
                .map(|s| s.frame_batches(animation, frame).len())
                .collect(),
        )
    }

    /// All submodels' batches for one frame, in table order
    pub fn frame_batches(
        &self,
        animation: usize,
        frame: usize,
    ) -> impl Iterator<Item = &BatchSegment> {
        self.submodels
            .iter()
            .flat_map(move |s| s.frame_batches(animation, frame))
    }

    /// Per-batch enabled flags for one frame, parallel to `frame_batches`
    pub fn enabled_mask(&self, animation: usize, frame: usize) -> Vec<bool> {
        self.submodel_table(animation, frame).enabled_mask(self.selected)
    }

    /// One flag per submodel, set only for the selected one. Holds even
    /// when the selected submodel has no batches.
    pub fn active_submodels(&self) -> Vec<bool> {
        (0..self.submodels.len()).map(|k| k == self.selected).collect()
    }
}

/// Finished animated model placed in the world
#[derive(Debug)]
pub struct AnimatedModel {
    pub id: EntityId,
    pub body_parts: Vec<BodyPart>,
    active_body_part: usize,
    /// Over every batch of every submodel, animation and frame
    pub bounds: Option<Aabb>,
    pub tint: RenderTint,
    pub texture_name: String,
    pub texture: TextureRef,
    pub skipped: Vec<SkippedMesh>,
}

impl AnimatedModel {
    pub fn active_body_part(&self) -> usize {
        self.active_body_part
    }

    /// Enable `body_part` and disable every other one. Out of range is ignored.
    pub fn select_body_part(&mut self, body_part: usize) -> bool {
        if body_part >= self.body_parts.len() {
            return false;
        }
        self.active_body_part = body_part;
        true
    }

    pub fn body_part_enabled(&self, body_part: usize) -> bool {
        body_part == self.active_body_part && body_part < self.body_parts.len()
    }

    /// Select a submodel of the active body part.
    pub fn select_submodel(&mut self, submodel: usize) -> bool {
        match self.body_parts.get_mut(self.active_body_part) {
            Some(part) => part.select_submodel(submodel),
            None => false,
        }
    }

    /// Per-submodel enabled flags of the active body part
    pub fn active_submodels(&self) -> Vec<bool> {
        self.body_parts
            .get(self.active_body_part)
            .map(BodyPart::active_submodels)
            .unwrap_or_default()
    }

    /// Number of animation clips (taken from the first submodel)
    pub fn animation_count(&self) -> usize {
        self.first_submodel().map_or(0, |s| s.animations.len())
    }

    pub fn frame_count(&self, animation: usize) -> usize {
        self.first_submodel()
            .and_then(|s| s.animations.get(animation))
            .map_or(0, |a| a.frames.len())
    }

    fn first_submodel(&self) -> Option<&Submodel> {
        self.body_parts.iter().flat_map(|p| p.submodels.first()).next()
    }

    /// Looping frame index for `time_seconds` of playback at `fps`.
    pub fn frame_at(&self, animation: usize, time_seconds: f32, fps: f32) -> usize {
        let frames = self.frame_count(animation);
        if frames == 0 || fps <= 0.0 || time_seconds <= 0.0 {
            return 0;
        }
        (time_seconds * fps) as usize % frames
    }

    /// Batches to draw for one frame: the selected submodel of the active
    /// body part.
    pub fn active_batches(
        &self,
        animation: usize,
        frame: usize,
    ) -> impl Iterator<Item = &BatchSegment> {
        self.body_parts
            .get(self.active_body_part)
            .into_iter()
            .flat_map(move |part| {
                let enabled = part.enabled_mask(animation, frame);
                part.frame_batches(animation, frame)
                    .zip(enabled)
                    .filter_map(|(batch, on)| on.then_some(batch))
            })
    }
}

/// Builds `AnimatedModel`s, batching every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelAssembler {
    batcher: GeometryBatcher,
}

impl ModelAssembler {
    pub fn new(batcher: GeometryBatcher) -> Self {
        Self { batcher }
    }

    /// Assemble a model placed by `keyvalues`, tinted by the light nearest
    /// its origin.
    pub fn assemble(
        &self,
        id: EntityId,
        source: ModelSource,
        keyvalues: &EntityKeyValues,
        lights: &[LightSource],
    ) -> AnimatedModel {
        let transform = keyvalues.transform();
        let mut bounds = BoundsAccumulator::new();
        let mut skipped = Vec::new();

        let body_parts: Vec<BodyPart> = source
            .body_parts
            .into_iter()
            .enumerate()
            .map(|(b, part)| BodyPart {
                name: part.name,
                submodels: part
                    .submodels
                    .into_iter()
                    .enumerate()
                    .map(|(s, sub)| Submodel {
                        name: sub.name,
                        animations: sub
                            .animations
                            .into_iter()
                            .enumerate()
                            .map(|(a, clip)| {
                                let location = |frame| MeshLocation::Frame {
                                    body_part: b,
                                    submodel: s,
                                    animation: a,
                                    frame,
                                };
                                self.batch_clip(
                                    clip,
                                    &transform,
                                    &mut bounds,
                                    &mut skipped,
                                    location,
                                )
                            })
                            .collect(),
                    })
                    .collect(),
                selected: 0,
            })
            .collect();

        let mut model = AnimatedModel {
            id,
            body_parts,
            active_body_part: 0,
            bounds: bounds.finish(),
            tint: RenderTint::resolve(keyvalues, closest_light(keyvalues.origin, lights)),
            texture_name: source.texture,
            texture: TextureRef::Placeholder,
            skipped,
        };

        if let Some(body) = keyvalues.body {
            if !model.select_body_part(body) {
                log::debug!("Model {:?}: body part {} out of range, using 0", id, body);
            }
        }
        if let Some(submodel) = keyvalues.submodel {
            if !model.select_submodel(submodel) {
                log::debug!("Model {:?}: submodel {} out of range, using 0", id, submodel);
            }
        }

        log::debug!(
            "Assembled model {:?}: {} body parts, {} frames skipped",
            id,
            model.body_parts.len(),
            model.skipped.len()
        );
        model
    }

    /// Batch every frame of a clip in parallel. Malformed frames become
    /// empty so frame indices stay aligned.
    fn batch_clip(
        &self,
        clip: Vec<FrameSource>,
        transform: &Transform,
        bounds: &mut BoundsAccumulator,
        skipped: &mut Vec<SkippedMesh>,
        location: impl Fn(usize) -> MeshLocation,
    ) -> Animation {
        let batcher = self.batcher;
        let results: Vec<_> = clip
            .into_par_iter()
            .map(|frame| {
                let mut acc = BoundsAccumulator::new();
                let batches =
                    batcher.batch_reversed(frame.positions, frame.uvs, transform, &mut acc);
                (batches, acc)
            })
            .collect();

        let frames = results
            .into_iter()
            .enumerate()
            .map(|(f, (batches, acc))| match batches {
                Ok(batches) => {
                    bounds.merge(&acc);
                    batches
                }
                Err(error) => {
                    skipped.push(SkippedMesh::new(location(f), error));
                    Vec::new()
                }
            })
            .collect();

        Animation { frames }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `tris` triangles laid along X starting at `x0`
    fn frame(x0: f32, tris: usize) -> FrameSource {
        let positions = (0..tris * 3)
            .map(|i| Vec3::new(x0 + i as f32, (i % 3) as f32, 0.0))
            .collect();
        FrameSource { positions, uvs: Vec::new() }
    }

    fn submodel(name: &str, frames: Vec<FrameSource>) -> SubmodelSource {
        SubmodelSource { name: name.into(), animations: vec![frames] }
    }

    /// Body part 0: heads (1, 2 and 1 triangles); body part 1: a single torso
    fn source() -> ModelSource {
        ModelSource {
            body_parts: vec![
                BodyPartSource {
                    name: "heads".into(),
                    submodels: vec![
                        submodel("a", vec![frame(0.0, 1), frame(1.0, 1)]),
                        submodel("b", vec![frame(10.0, 2), frame(11.0, 2)]),
                        submodel("c", vec![frame(-20.0, 1), frame(-19.0, 1)]),
                    ],
                },
                BodyPartSource {
                    name: "torso".into(),
                    submodels: vec![submodel("t", vec![frame(100.0, 1), frame(100.0, 1)])],
                },
            ],
            texture: "skin".into(),
        }
    }

    fn assembler() -> ModelAssembler {
        // one triangle per batch
        ModelAssembler::new(GeometryBatcher::new(3).unwrap())
    }

    fn default_model() -> AnimatedModel {
        assembler().assemble(EntityId(1), source(), &EntityKeyValues::default(), &[])
    }

    #[test]
    fn test_hierarchy_shape() {
        let model = default_model();
        assert_eq!(model.body_parts.len(), 2);
        assert_eq!(model.body_parts[0].submodels.len(), 3);
        assert_eq!(model.animation_count(), 1);
        assert_eq!(model.frame_count(0), 2);
        assert_eq!(model.body_parts[0].submodel_table(0, 0), SubmodelTable::new(vec![1, 2, 1]));
        assert!(model.skipped.is_empty());
    }

    #[test]
    fn test_default_selection() {
        let model = default_model();
        assert_eq!(model.active_body_part(), 0);
        assert!(model.body_part_enabled(0));
        assert!(!model.body_part_enabled(1));
        assert_eq!(model.active_submodels(), vec![true, false, false]);
        assert_eq!(model.tint, RenderTint::WHITE);
    }

    #[test]
    fn test_keyvalue_selection() {
        let kv = EntityKeyValues { body: Some(0), submodel: Some(1), ..Default::default() };
        let model = assembler().assemble(EntityId(1), source(), &kv, &[]);
        assert_eq!(model.active_submodels(), vec![false, true, false]);
        assert_eq!(model.active_batches(0, 0).count(), 2);

        let kv = EntityKeyValues { body: Some(1), ..Default::default() };
        let model = assembler().assemble(EntityId(1), source(), &kv, &[]);
        assert_eq!(model.active_body_part(), 1);

        let kv = EntityKeyValues { body: Some(9), submodel: Some(9), ..Default::default() };
        let model = assembler().assemble(EntityId(1), source(), &kv, &[]);
        assert_eq!(model.active_body_part(), 0);
        assert_eq!(model.active_submodels(), vec![true, false, false]);
    }

    #[test]
    fn test_submodel_selection_exclusive_and_idempotent() {
        let mut model = default_model();
        assert!(model.select_submodel(2));
        let once = model.body_parts[0].enabled_mask(0, 1);
        assert!(model.select_submodel(2));
        let twice = model.body_parts[0].enabled_mask(0, 1);
        assert_eq!(once, twice);
        assert_eq!(once, vec![false, false, false, true]);
        assert_eq!(model.active_submodels(), vec![false, false, true]);
        assert!(!model.select_submodel(3));
        assert_eq!(model.active_submodels(), vec![false, false, true]);
    }

    #[test]
    fn test_blank_submodel_still_reports_active() {
        let src = ModelSource {
            body_parts: vec![BodyPartSource {
                name: "weapons".into(),
                submodels: vec![
                    submodel("none", vec![FrameSource::default()]),
                    submodel("pistol", vec![frame(0.0, 1)]),
                ],
            }],
            texture: "skin".into(),
        };
        let mut model = assembler().assemble(EntityId(1), src, &EntityKeyValues::default(), &[]);
        assert_eq!(model.body_parts[0].submodel_table(0, 0), SubmodelTable::new(vec![0, 1]));
        assert_eq!(model.active_submodels(), vec![true, false]);
        assert_eq!(model.active_batches(0, 0).count(), 0);

        assert!(model.select_submodel(1));
        assert_eq!(model.active_submodels(), vec![false, true]);
        assert!(model.select_submodel(0));
        assert_eq!(model.active_submodels(), vec![true, false]);
    }

    #[test]
    fn test_active_batches_follow_selection() {
        let mut model = default_model();
        model.select_submodel(2);
        let batches: Vec<_> = model.active_batches(0, 0).collect();
        assert_eq!(batches.len(), 1);
        // submodel "c" lives at negative X
        assert!(batches[0].vertices.iter().all(|v| v.position().x < 0.0));
    }

    #[test]
    fn test_bounds_cover_every_submodel_and_frame() {
        let kv = EntityKeyValues { origin: Vec3::new(0.0, 0.0, 5.0), ..Default::default() };
        let model = assembler().assemble(EntityId(1), source(), &kv, &[]);
        let bounds = model.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::new(-20.0, 0.0, 5.0));
        assert_eq!(bounds.max, Vec3::new(102.0, 2.0, 5.0));

        let mut other = assembler().assemble(EntityId(2), source(), &kv, &[]);
        other.select_submodel(1);
        assert_eq!(other.bounds, model.bounds);
    }

    #[test]
    fn test_malformed_frame_is_skipped_but_aligned() {
        let mut src = source();
        src.body_parts[0].submodels[0].animations[0][0].positions.pop();
        let model = assembler().assemble(EntityId(1), src, &EntityKeyValues::default(), &[]);
        assert_eq!(model.skipped.len(), 1);
        assert_eq!(
            model.skipped[0].location,
            MeshLocation::Frame { body_part: 0, submodel: 0, animation: 0, frame: 0 }
        );
        assert_eq!(model.body_parts[0].submodels[0].animations[0].frames.len(), 2);
        assert!(model.body_parts[0].submodels[0].frame_batches(0, 0).is_empty());
        assert_eq!(model.body_parts[0].submodels[0].frame_batches(0, 1).len(), 1);
    }

    #[test]
    fn test_closest_light_tint() {
        let lights = [
            LightSource { position: Vec3::new(10.0, 0.0, 0.0), color: Vec3::new(1.0, 0.0, 0.0) },
            LightSource { position: Vec3::new(0.0, 3.0, 0.0), color: Vec3::new(0.0, 1.0, 0.0) },
            LightSource { position: Vec3::new(0.0, 0.0, -7.0), color: Vec3::new(0.0, 0.0, 1.0) },
        ];
        let kv = EntityKeyValues::default();
        let model = assembler().assemble(EntityId(1), source(), &kv, &lights);
        assert_eq!(model.tint.color, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_frame_at_loops() {
        let model = default_model();
        assert_eq!(model.frame_at(0, 0.0, 10.0), 0);
        assert_eq!(model.frame_at(0, 0.15, 10.0), 1);
        assert_eq!(model.frame_at(0, 0.25, 10.0), 0);
        assert_eq!(model.frame_at(3, 1.0, 10.0), 0);
    }
}
