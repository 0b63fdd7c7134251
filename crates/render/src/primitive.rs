use crate::camera::Camera;
use crate::error::RenderError;
use crate::host::{Param, ParamValue, ShaderHost, Technique, bind_camera, bind_fog};
use crate::mesh::{MeshData, MeshStats, Shape, VertexFormat, build_flat, build_textured};
use glam::Mat4;
use station_common::Transform;
use station_config::{FogSettings, ObjectConfig};
use tracing::debug;

/// One uploaded vertex/index buffer pair.
#[derive(Debug)]
pub struct PatchBuffers<B> {
    pub vertices: B,
    pub indices: B,
    pub index_count: u32,
}

impl<B> PatchBuffers<B> {
    pub fn upload<H: ShaderHost<Buffer = B>>(
        host: &mut H,
        label: &str,
        format: VertexFormat,
        vertex_bytes: &[u8],
        indices: &[u16],
    ) -> Result<Self, RenderError> {
        let vertices = host.create_vertex_buffer(label, format, vertex_bytes)?;
        let indices_buffer = match host.create_index_buffer(label, indices) {
            Ok(buffer) => buffer,
            Err(err) => {
                host.release_buffer(vertices);
                return Err(err);
            }
        };
        Ok(Self {
            vertices,
            indices: indices_buffer,
            index_count: indices.len() as u32,
        })
    }

    pub fn release<H: ShaderHost<Buffer = B>>(self, host: &mut H) {
        host.release_buffer(self.vertices);
        host.release_buffer(self.indices);
    }

    pub fn draw<H: ShaderHost<Buffer = B>>(&self, host: &mut H) -> Result<(), RenderError> {
        host.draw_indexed(&self.vertices, &self.indices, self.index_count)
    }
}

#[derive(Debug)]
pub enum Geometry<B> {
    Flat(PatchBuffers<B>),
    Textured(Vec<PatchBuffers<B>>),
}

/// Base and detail texture slots of a textured primitive.
#[derive(Debug, Clone)]
pub struct TextureSet<T> {
    pub base: Option<T>,
    pub detail: Option<T>,
}

impl<T> Default for TextureSet<T> {
    fn default() -> Self {
        Self {
            base: None,
            detail: None,
        }
    }
}

impl<T> TextureSet<T> {
    pub fn base(texture: T) -> Self {
        Self {
            base: Some(texture),
            detail: None,
        }
    }

    pub fn with_detail(base: T, detail: T) -> Self {
        Self {
            base: Some(base),
            detail: Some(detail),
        }
    }

    /// MultiTextured when both slots are filled, Textured with only a base,
    /// the base technique when nothing is bound.
    pub fn technique(&self) -> Technique {
        match (&self.base, &self.detail) {
            (None, _) => Technique::BasicPhongLightning,
            (Some(_), Some(_)) => Technique::MultiTextured,
            (Some(_), None) => Technique::Textured,
        }
    }
}

/// A procedural cube or floor uploaded to the host.
pub struct Primitive<H: ShaderHost> {
    name: String,
    transform: Transform,
    geometry: Geometry<H::Buffer>,
    textures: TextureSet<H::Texture>,
    texture_matrix: Mat4,
    stats: MeshStats,
}

impl<H: ShaderHost> std::fmt::Debug for Primitive<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("name", &self.name)
            .field("format", &self.format())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<H: ShaderHost> Primitive<H> {
    /// Uniformly colored primitive. Keeps the configured scale in its world matrix.
    pub fn flat(host: &mut H, config: &ObjectConfig, shape: Shape) -> Result<Self, RenderError> {
        let mesh = build_flat(shape, config.size, config.color);
        Self::from_mesh(host, config, config.transform, mesh, TextureSet::default())
    }

    /// Grid-tessellated primitive. The configured scale is baked into the grid,
    /// so the world matrix drops it.
    pub fn textured(
        host: &mut H,
        config: &ObjectConfig,
        shape: Shape,
        textures: TextureSet<H::Texture>,
    ) -> Result<Self, RenderError> {
        let mesh = build_textured(
            shape,
            config.size,
            config.transform.scale_factors(),
            config.texture_resolution,
        )?;
        Self::from_mesh(host, config, config.transform.without_scale(), mesh, textures)
    }

    fn from_mesh(
        host: &mut H,
        config: &ObjectConfig,
        transform: Transform,
        mesh: MeshData,
        textures: TextureSet<H::Texture>,
    ) -> Result<Self, RenderError> {
        let label = format!("{}{}", config.name, config.info);
        let stats = mesh.stats();
        let geometry = match mesh {
            MeshData::Flat { vertices, indices } => Geometry::Flat(PatchBuffers::upload(
                host,
                &label,
                VertexFormat::Flat,
                bytemuck::cast_slice(&vertices),
                &indices,
            )?),
            MeshData::Textured { patches } => {
                let mut uploaded: Vec<PatchBuffers<H::Buffer>> = Vec::with_capacity(patches.len());
                for patch in &patches {
                    let result = PatchBuffers::upload(
                        host,
                        &label,
                        VertexFormat::Textured,
                        bytemuck::cast_slice(&patch.vertices),
                        &patch.indices,
                    );
                    match result {
                        Ok(buffers) => uploaded.push(buffers),
                        Err(err) => {
                            for buffers in uploaded {
                                buffers.release(host);
                            }
                            return Err(err);
                        }
                    }
                }
                Geometry::Textured(uploaded)
            }
        };
        debug!(
            name = %label,
            vertices = stats.vertices,
            indices = stats.indices,
            patches = stats.patches,
            "primitive uploaded"
        );
        Ok(Self {
            name: label,
            transform,
            geometry,
            textures,
            texture_matrix: Mat4::IDENTITY,
            stats,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn format(&self) -> VertexFormat {
        match self.geometry {
            Geometry::Flat(_) => VertexFormat::Flat,
            Geometry::Textured(_) => VertexFormat::Textured,
        }
    }

    pub fn textures(&self) -> &TextureSet<H::Texture> {
        &self.textures
    }

    pub fn set_base_texture(&mut self, texture: Option<H::Texture>) {
        self.textures.base = texture;
    }

    pub fn texture_matrix(&self) -> Mat4 {
        self.texture_matrix
    }

    pub fn set_texture_matrix(&mut self, matrix: Mat4) {
        self.texture_matrix = matrix;
    }

    pub fn world_matrix(&self, camera: &Camera) -> Mat4 {
        self.transform.world(camera.world())
    }

    /// Draws with `camera`, leaving the base technique current.
    pub fn draw(&self, host: &mut H, camera: &Camera, fog: &FogSettings) -> Result<(), RenderError> {
        let world = self.world_matrix(camera);
        match &self.geometry {
            Geometry::Flat(buffers) => {
                if host.technique() != Technique::BasicPhongLightning {
                    host.set_technique(Technique::BasicPhongLightning)?;
                }
                bind_camera(host, camera, world)?;
                bind_fog(host, fog)?;
                buffers.draw(host)
            }
            Geometry::Textured(patches) => {
                host.set_technique(self.textures.technique())?;
                let drawn = self.draw_patches(host, patches, camera, world, fog);
                let restored = host.set_technique(Technique::BasicPhongLightning);
                drawn.and(restored)
            }
        }
    }

    fn draw_patches(
        &self,
        host: &mut H,
        patches: &[PatchBuffers<H::Buffer>],
        camera: &Camera,
        world: Mat4,
        fog: &FogSettings,
    ) -> Result<(), RenderError> {
        for patch in patches {
            bind_camera(host, camera, world)?;
            if let Some(base) = &self.textures.base {
                host.set_parameter(Param::Texture, ParamValue::Texture(base.clone()))?;
                if let Some(detail) = &self.textures.detail {
                    host.set_parameter(Param::Texture1, ParamValue::Texture(detail.clone()))?;
                }
                host.set_parameter(Param::TextureMatrix, ParamValue::Matrix(self.texture_matrix))?;
            }
            bind_fog(host, fog)?;
            patch.draw(host)?;
        }
        Ok(())
    }

    /// Hands every buffer back to the host.
    pub fn release(self, host: &mut H) {
        match self.geometry {
            Geometry::Flat(buffers) => buffers.release(host),
            Geometry::Textured(patches) => {
                for buffers in patches {
                    buffers.release(host);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::trace::{TraceEvent, TraceHost, TraceTexture};
    use station_config::{CameraSettings, ConfigStore};

    fn camera() -> Camera {
        Camera::new(CameraSettings::default(), Viewport::new(800, 600))
    }

    fn tex(name: &str) -> TraceTexture {
        TraceTexture(name.to_string())
    }

    #[test]
    fn flat_station_cube_uploads_one_pair() {
        let mut host = TraceHost::new();
        let config = ObjectConfig::resolve(&ConfigStore::station(), "Station", "Cube");
        let cube = Primitive::flat(&mut host, &config, Shape::Cube).unwrap();
        assert_eq!(host.live_buffers(), 2);
        assert_eq!(cube.format(), VertexFormat::Flat);
        assert_eq!(cube.stats().indices, 36);

        cube.draw(&mut host, &camera(), &FogSettings::default()).unwrap();
        let draws = host.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].technique, Technique::BasicPhongLightning);
        assert_eq!(draws[0].index_count, 36);
        assert_eq!(
            draws[0].world,
            config.transform.world(camera().world())
        );

        cube.release(&mut host);
        assert_eq!(host.live_buffers(), 0);
    }

    #[test]
    fn textured_draw_selects_technique_and_restores_base() {
        let mut host = TraceHost::new();
        let mut config = ObjectConfig::resolve(&ConfigStore::new(), "Test", "Cube");
        config.size = 10.0;
        let cube = Primitive::textured(
            &mut host,
            &config,
            Shape::Cube,
            TextureSet::with_detail(tex("rock1"), tex("peron")),
        )
        .unwrap();
        assert_eq!(host.live_buffers(), 12);

        cube.draw(&mut host, &camera(), &FogSettings::default()).unwrap();
        let draws = host.draws();
        assert_eq!(draws.len(), 6);
        for draw in &draws {
            assert_eq!(draw.technique, Technique::MultiTextured);
            assert_eq!(draw.index_count, 486);
            assert_eq!(draw.texture, Some(tex("rock1")));
            assert_eq!(draw.texture1, Some(tex("peron")));
        }
        assert_eq!(host.technique(), Technique::BasicPhongLightning);
    }

    #[test]
    fn textured_world_drops_the_baked_scale() {
        let mut host = TraceHost::new();
        let config = ObjectConfig::resolve(&ConfigStore::station(), "Ground", "Floor");
        let floor = Primitive::textured(&mut host, &config, Shape::Floor, TextureSet::base(tex("ground1")))
            .unwrap();
        let world = floor.world_matrix(&camera());
        assert_eq!(world, config.transform.without_scale().world(camera().world()));
        assert_eq!(floor.textures().technique(), Technique::Textured);
    }

    #[test]
    fn fog_is_bound_on_every_patch() {
        let mut host = TraceHost::new();
        let mut config = ObjectConfig::resolve(&ConfigStore::new(), "Test", "Floor");
        config.size = 10.0;
        let floor = Primitive::textured(&mut host, &config, Shape::Floor, TextureSet::default()).unwrap();
        let fog = FogSettings {
            enabled: true,
            start: 5.0,
            end: 50.0,
        };
        floor.draw(&mut host, &camera(), &fog).unwrap();
        let fog_end_writes = host
            .events()
            .iter()
            .filter(|e| matches!(e, TraceEvent::SetParameter(Param::FogEnd, ParamValue::Float(v)) if *v == 50.0))
            .count();
        assert_eq!(fog_end_writes, 1);
        assert_eq!(host.draws()[0].texture, None);
        assert_eq!(host.draws()[0].technique, Technique::BasicPhongLightning);
    }

    #[test]
    fn textured_mesh_without_texture_uses_base_technique() {
        let mut host = TraceHost::new();
        let mut config = ObjectConfig::resolve(&ConfigStore::new(), "Test", "Floor");
        config.size = 10.0;
        let mut floor =
            Primitive::textured(&mut host, &config, Shape::Floor, TextureSet::base(tex("grass"))).unwrap();
        floor.set_base_texture(None);
        assert_eq!(floor.textures().technique(), Technique::BasicPhongLightning);

        floor.draw(&mut host, &camera(), &FogSettings::default()).unwrap();
        let draws = host.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].technique, Technique::BasicPhongLightning);
        assert_eq!(draws[0].texture, None);
    }

    #[test]
    fn failed_textured_draw_restores_base_technique() {
        let mut host = TraceHost::new().without_parameter(Param::TextureMatrix);
        let mut config = ObjectConfig::resolve(&ConfigStore::new(), "Test", "Floor");
        config.size = 10.0;
        let floor =
            Primitive::textured(&mut host, &config, Shape::Floor, TextureSet::base(tex("t"))).unwrap();
        let err = floor
            .draw(&mut host, &camera(), &FogSettings::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::ParameterNotFound(Param::TextureMatrix)));
        assert_eq!(host.technique(), Technique::BasicPhongLightning);
        assert!(host.draws().is_empty());
    }

    #[test]
    fn missing_technique_is_an_error() {
        let mut host = TraceHost::new().without_technique(Technique::Textured);
        let mut config = ObjectConfig::resolve(&ConfigStore::new(), "Test", "Floor");
        config.size = 10.0;
        let floor =
            Primitive::textured(&mut host, &config, Shape::Floor, TextureSet::base(tex("t"))).unwrap();
        let err = floor
            .draw(&mut host, &camera(), &FogSettings::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::TechniqueNotFound(Technique::Textured)));
    }
}
