use crate::camera::Camera;
use crate::error::RenderError;
use crate::host::{Param, ParamValue, ShaderHost, Technique, bind_camera, bind_fog};
use crate::mesh::{MeshStats, Patch, VertexFormat};
use crate::primitive::PatchBuffers;
use glam::Mat4;
use station_common::Transform;
use station_config::{FogSettings, ObjectConfig};
use std::rc::Rc;

/// One named mesh part of a loaded model.
#[derive(Debug)]
pub struct ModelPart<B> {
    pub name: String,
    pub buffers: PatchBuffers<B>,
}

/// An externally supplied model, uploaded once and shared between objects.
pub struct Model<H: ShaderHost> {
    name: String,
    parts: Vec<ModelPart<H::Buffer>>,
    stats: MeshStats,
}

impl<H: ShaderHost> std::fmt::Debug for Model<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl<H: ShaderHost> Model<H> {
    pub fn upload<'a>(
        host: &mut H,
        name: &str,
        parts: impl IntoIterator<Item = (&'a str, &'a Patch)>,
    ) -> Result<Self, RenderError> {
        let mut model = Self {
            name: name.to_string(),
            parts: Vec::new(),
            stats: MeshStats::default(),
        };
        for (part_name, patch) in parts {
            let label = format!("{name}/{part_name}");
            match PatchBuffers::upload(
                host,
                &label,
                VertexFormat::Textured,
                bytemuck::cast_slice(&patch.vertices),
                &patch.indices,
            ) {
                Ok(buffers) => {
                    model.stats.vertices += patch.vertices.len();
                    model.stats.indices += patch.indices.len();
                    model.stats.patches += 1;
                    model.parts.push(ModelPart {
                        name: part_name.to_string(),
                        buffers,
                    });
                }
                Err(err) => {
                    model.release(host);
                    return Err(err);
                }
            }
        }
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[ModelPart<H::Buffer>] {
        &self.parts
    }

    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    pub fn release(self, host: &mut H) {
        for part in self.parts {
            part.buffers.release(host);
        }
    }
}

/// A placed instance of a shared [`Model`] with an optional texture.
pub struct SceneObject<H: ShaderHost> {
    name: String,
    model: Rc<Model<H>>,
    transform: Transform,
    texture: Option<H::Texture>,
}

impl<H: ShaderHost> std::fmt::Debug for SceneObject<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneObject")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("textured", &self.texture.is_some())
            .finish()
    }
}

impl<H: ShaderHost> SceneObject<H> {
    pub fn new(model: Rc<Model<H>>, config: &ObjectConfig, texture: Option<H::Texture>) -> Self {
        Self {
            name: format!("{}{}", config.name, config.info),
            model,
            transform: config.transform,
            texture,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Rc<Model<H>> {
        &self.model
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Draws every model part, leaving the base technique current.
    pub fn draw(&self, host: &mut H, camera: &Camera, fog: &FogSettings) -> Result<(), RenderError> {
        let world = self.transform.world(camera.world());
        if self.texture.is_some() {
            host.set_technique(Technique::Textured)?;
        }
        let drawn = self.draw_parts(host, camera, world, fog);
        let restored = host.set_technique(Technique::BasicPhongLightning);
        drawn.and(restored)
    }

    fn draw_parts(
        &self,
        host: &mut H,
        camera: &Camera,
        world: Mat4,
        fog: &FogSettings,
    ) -> Result<(), RenderError> {
        for part in self.model.parts() {
            bind_camera(host, camera, world)?;
            if let Some(texture) = &self.texture {
                host.set_parameter(Param::Texture, ParamValue::Texture(texture.clone()))?;
                host.set_parameter(Param::TextureMatrix, ParamValue::Matrix(Mat4::IDENTITY))?;
            }
            bind_fog(host, fog)?;
            part.buffers.draw(host)?;
        }
        Ok(())
    }

    /// Gives back the model handle; the last owner releases it.
    pub fn into_model(self) -> Rc<Model<H>> {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::mesh::build_box;
    use crate::trace::{TraceHost, TraceTexture};
    use glam::Vec3;
    use station_config::{CameraSettings, ConfigStore};

    fn two_box_model(host: &mut TraceHost) -> Rc<Model<TraceHost>> {
        let hull = build_box(Vec3::ZERO, Vec3::new(20.0, 5.0, 10.0));
        let turret = build_box(Vec3::new(0.0, 8.0, 0.0), Vec3::splat(3.0));
        Rc::new(Model::upload(host, "Panther", [("hull", &hull), ("turret", &turret)]).unwrap())
    }

    #[test]
    fn textured_object_binds_texture_per_part() {
        let mut host = TraceHost::new();
        let model = two_box_model(&mut host);
        let config = ObjectConfig::resolve(&ConfigStore::station(), "Panther", "Model");
        let object = SceneObject::new(model, &config, Some(TraceTexture("matrix1".into())));
        let camera = Camera::new(CameraSettings::default(), Viewport::new(640, 480));

        object.draw(&mut host, &camera, &FogSettings::default()).unwrap();
        let draws = host.draws();
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|d| d.technique == Technique::Textured));
        assert!(draws.iter().all(|d| d.index_count == 36));
        assert_eq!(draws[0].world, config.transform.world(camera.world()));
        assert_eq!(host.technique(), Technique::BasicPhongLightning);
    }

    #[test]
    fn failed_object_draw_restores_base_technique() {
        let mut host = TraceHost::new().without_parameter(Param::TextureMatrix);
        let model = two_box_model(&mut host);
        let config = ObjectConfig::resolve(&ConfigStore::station(), "Panther", "Model");
        let object = SceneObject::new(model, &config, Some(TraceTexture("metal".into())));
        let camera = Camera::new(CameraSettings::default(), Viewport::new(640, 480));

        let err = object
            .draw(&mut host, &camera, &FogSettings::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::ParameterNotFound(Param::TextureMatrix)));
        assert_eq!(host.technique(), Technique::BasicPhongLightning);
    }

    #[test]
    fn untextured_object_stays_on_base_technique() {
        let mut host = TraceHost::new();
        let model = two_box_model(&mut host);
        let config = ObjectConfig::resolve(&ConfigStore::new(), "Crate", "Model");
        let object = SceneObject::new(model, &config, None);
        let camera = Camera::new(CameraSettings::default(), Viewport::new(640, 480));
        object.draw(&mut host, &camera, &FogSettings::default()).unwrap();
        assert!(
            host.draws()
                .iter()
                .all(|d| d.technique == Technique::BasicPhongLightning && d.texture.is_none())
        );
    }

    #[test]
    fn shared_model_is_released_by_last_owner() {
        let mut host = TraceHost::new();
        let model = two_box_model(&mut host);
        let config = ObjectConfig::resolve(&ConfigStore::new(), "Panther", "Model2");
        let first = SceneObject::new(Rc::clone(&model), &config, None);
        let second = SceneObject::new(model, &config, None);
        assert_eq!(host.live_buffers(), 4);

        assert!(Rc::try_unwrap(first.into_model()).is_err());
        let last = Rc::try_unwrap(second.into_model()).unwrap();
        last.release(&mut host);
        assert_eq!(host.live_buffers(), 0);
    }
}
