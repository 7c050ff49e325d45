//! One loaded map: its geometry, entities and visibility state.

use std::sync::Arc;

use crate::core::Result;
use crate::entity::{EntityId, EntityIds, EntityKeyValues};
use crate::level::{
    LeafGraph, LevelGeometry, StaticAssembler, SurfaceMesh, TextureCache, TextureLoadResult,
    TextureLoader, TextureRef, TextureResolver,
};
use crate::math::{Aabb, Transform};
use crate::model::{AnimatedModel, LightSource, ModelAssembler, ModelSource, RenderTint};
use crate::render::{DrawBatch, DrawSource, FrameContext, RenderSettings, Renderer};
use crate::visibility::{
    BoundaryCrossing, EntityLeafIndex, Evaluation, InsideMapRegistry, VisibilityEvaluator,
};

use super::config::MapConfig;

/// Embedded brush model of the level, as parsed
#[derive(Clone, Debug, Default)]
pub struct MapModelSource {
    pub keyvalues: EntityKeyValues,
    pub surfaces: Vec<SurfaceMesh>,
}

/// Everything the parsers hand over for one map
#[derive(Clone, Debug, Default)]
pub struct MapAssets {
    pub leaves: LeafGraph,
    pub surfaces: Vec<SurfaceMesh>,
    pub map_models: Vec<MapModelSource>,
    pub models: Vec<(ModelSource, EntityKeyValues)>,
    pub lights: Vec<LightSource>,
}

/// Placed brush model
#[derive(Debug)]
pub struct MapModel {
    pub id: EntityId,
    pub geometry: LevelGeometry,
    pub tint: RenderTint,
}

/// Placed animated model and its playback state
#[derive(Debug)]
pub struct ModelInstance {
    pub model: AnimatedModel,
    pub animation: usize,
}

/// Outcome of one `render_frame`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    pub evaluation: Evaluation,
    pub crossing: Option<BoundaryCrossing>,
    pub batches_drawn: usize,
}

pub struct MapInstance {
    leaves: LeafGraph,
    world: LevelGeometry,
    map_models: Vec<MapModel>,
    models: Vec<ModelInstance>,
    entity_index: EntityLeafIndex,
    evaluator: VisibilityEvaluator,
    registry: InsideMapRegistry,
    textures: TextureCache,
    loader: TextureLoader,
    settings: RenderSettings,
}

impl MapInstance {
    /// Assemble all geometry, index entities against the leaves and start
    /// background loads for textures that are not yet available.
    ///
    /// Entity ids come from `ids`, which the host shares across maps.
    pub fn load(
        assets: MapAssets,
        config: &MapConfig,
        resolver: Arc<dyn TextureResolver>,
        ids: &mut EntityIds,
    ) -> Result<Self> {
        config.validate()?;
        let batcher = config.batcher()?;
        let static_assembler = StaticAssembler::new(batcher, config.sky_scale);
        let model_assembler = ModelAssembler::new(batcher);
        let mut textures = TextureCache::new();

        let world = static_assembler.assemble(
            assets.surfaces,
            &Transform::identity(),
            &mut textures,
            resolver.as_ref(),
        );

        let map_models: Vec<MapModel> = assets
            .map_models
            .into_iter()
            .map(|src| MapModel {
                id: ids.alloc(),
                geometry: static_assembler.assemble(
                    src.surfaces,
                    &src.keyvalues.transform(),
                    &mut textures,
                    resolver.as_ref(),
                ),
                tint: RenderTint::resolve(&src.keyvalues, None),
            })
            .collect();

        let mut pending_models = Vec::new();
        let models: Vec<ModelInstance> = assets
            .models
            .into_iter()
            .map(|(src, keyvalues)| {
                let mut model =
                    model_assembler.assemble(ids.alloc(), src, &keyvalues, &assets.lights);
                match textures.resolve(&model.texture_name, resolver.as_ref()) {
                    Some(handle) => model.texture = TextureRef::Resolved(handle),
                    None => pending_models.push(model.texture_name.clone()),
                }
                ModelInstance { model, animation: 0 }
            })
            .collect();

        let entity_index = EntityLeafIndex::build(
            &assets.leaves,
            map_models
                .iter()
                .map(|m| (m.id, m.geometry.bounds()))
                .chain(models.iter().map(|m| (m.model.id, m.model.bounds))),
        );

        let map_bounds = match (world.bounds(), assets.leaves.bounds()) {
            (Some(a), Some(b)) => Some(a.merged(&b)),
            (a, b) => a.or(b),
        };
        let evaluator = VisibilityEvaluator::new(
            &assets.leaves,
            world.face_count(),
            map_bounds,
            config.novis,
        );

        let mut loader = TextureLoader::new(resolver, config.texture_threads)?;
        let pending: Vec<String> = world
            .pending_texture_names()
            .chain(map_models.iter().flat_map(|m| m.geometry.pending_texture_names()))
            .map(str::to_owned)
            .chain(pending_models)
            .collect();
        loader.request(pending);

        log::info!(
            "Map loaded: {} leaves, {} world batches, {} map models, {} models, \
             {} textures loading",
            assets.leaves.len(),
            world.len(),
            map_models.len(),
            models.len(),
            loader.pending_count()
        );

        Ok(Self {
            leaves: assets.leaves,
            world,
            map_models,
            models,
            entity_index,
            evaluator,
            registry: InsideMapRegistry::new(),
            textures,
            loader,
            settings: config.render_settings(),
        })
    }

    pub fn world(&self) -> &LevelGeometry {
        &self.world
    }

    pub fn leaves(&self) -> &LeafGraph {
        &self.leaves
    }

    pub fn evaluator(&self) -> &VisibilityEvaluator {
        &self.evaluator
    }

    pub fn entity_index(&self) -> &EntityLeafIndex {
        &self.entity_index
    }

    pub fn map_models(&self) -> &[MapModel] {
        &self.map_models
    }

    pub fn models(&self) -> &[ModelInstance] {
        &self.models
    }

    /// Settings derived from the load config; hosts may copy and adjust them
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Sky sizing box
    pub fn sky_bounds(&self) -> Option<Aabb> {
        self.world.sky_bounds()
    }

    pub fn model(&self, id: EntityId) -> Option<&ModelInstance> {
        self.models.iter().find(|m| m.model.id == id)
    }

    pub fn model_mut(&mut self, id: EntityId) -> Option<&mut ModelInstance> {
        self.models.iter_mut().find(|m| m.model.id == id)
    }

    /// Register foreign content to hide while the viewer is inside this map
    pub fn register_foreign(&mut self, id: EntityId) {
        self.registry.register(id);
    }

    /// Run one frame: bounds check, state transition, conditional
    /// recompute, then submission of the visible set.
    ///
    /// `foreign` is called once per registered id on a boundary crossing
    /// with the id's new renderability.
    pub fn render_frame(
        &mut self,
        ctx: &FrameContext<'_>,
        renderer: &mut dyn Renderer,
        foreign: impl FnMut(EntityId, bool),
    ) -> FrameStats {
        let inside = self.evaluator.viewer_inside(&ctx.viewer);
        let crossing = self.registry.update(inside, foreign);
        let evaluation = self.evaluator.evaluate(&ctx.viewer, &self.leaves, &self.entity_index);
        let batches_drawn = self.submit(ctx, renderer);

        FrameStats { evaluation, crossing, batches_drawn }
    }

    fn submit(&self, ctx: &FrameContext<'_>, renderer: &mut dyn Renderer) -> usize {
        let mut drawn = 0;

        if ctx.settings.draw_world {
            for batch in self.world.batches() {
                if !self.evaluator.is_face_visible(batch.face) {
                    continue;
                }
                renderer.draw(&DrawBatch {
                    source: DrawSource::World { face: batch.face },
                    vertices: &batch.vertices,
                    indices: Some(batch.indices.as_slice()),
                    texture: batch.texture,
                    tint: RenderTint::WHITE,
                });
                drawn += 1;
            }
        }

        for map_model in &self.map_models {
            if !self.evaluator.is_entity_visible(map_model.id) {
                continue;
            }
            for batch in map_model.geometry.batches() {
                renderer.draw(&DrawBatch {
                    source: DrawSource::MapModel(map_model.id),
                    vertices: &batch.vertices,
                    indices: Some(batch.indices.as_slice()),
                    texture: batch.texture,
                    tint: map_model.tint,
                });
                drawn += 1;
            }
        }

        if ctx.settings.draw_models {
            for instance in &self.models {
                let model = &instance.model;
                if !self.evaluator.is_entity_visible(model.id) {
                    continue;
                }
                let fps = ctx.settings.animation_fps;
                let frame = model.frame_at(instance.animation, ctx.time, fps);
                for segment in model.active_batches(instance.animation, frame) {
                    renderer.draw(&DrawBatch {
                        source: DrawSource::Model(model.id),
                        vertices: &segment.vertices,
                        indices: None,
                        texture: model.texture,
                        tint: model.tint,
                    });
                    drawn += 1;
                }
            }
        }

        drawn
    }

    /// Apply finished background texture loads. Returns batches/models patched.
    pub fn poll_textures(&mut self) -> usize {
        let results = self.loader.poll_results();
        results.iter().map(|r| self.apply_texture(r)).sum()
    }

    /// Block until every queued texture load has reported, applying each.
    /// Intended for loading screens and tools, not the frame loop.
    pub fn finish_texture_loads(&mut self) -> usize {
        let mut patched = 0;
        while self.loader.pending_count() > 0 {
            match self.loader.recv_blocking() {
                Some(result) => patched += self.apply_texture(&result),
                None => break,
            }
        }
        patched
    }

    pub fn textures_pending(&self) -> usize {
        self.loader.pending_count()
    }

    fn apply_texture(&mut self, result: &TextureLoadResult) -> usize {
        let TextureLoadResult::Loaded { name, handle } = result else {
            return 0;
        };
        self.textures.insert(name.clone(), *handle);

        let mut patched = self.world.patch_texture(name, *handle);
        for map_model in &mut self.map_models {
            patched += map_model.geometry.patch_texture(name, *handle);
        }
        for instance in &mut self.models {
            let model = &mut instance.model;
            if model.texture_name == *name && !model.texture.is_resolved() {
                model.texture = TextureRef::Resolved(*handle);
                patched += 1;
            }
        }
        patched
    }
}
