use crate::camera::{Camera, Viewport};
use crate::error::RenderError;
use crate::host::ShaderHost;
use crate::lighting::LightRig;
use crate::mesh::{MeshStats, Shape};
use crate::model::{Model, SceneObject};
use crate::primitive::{Primitive, TextureSet};
use crate::state::SceneState;
use glam::{Mat4, Vec4};
use station_config::{ConfigStore, ObjectConfig};
use station_input::ActionFrame;
use std::rc::Rc;
use tracing::{info, warn};

/// Supplies textures and shared models by name.
pub trait AssetSource<H: ShaderHost> {
    fn texture(&mut self, host: &mut H, name: &str) -> Result<H::Texture, RenderError>;

    /// Repeated requests for one name return the same model.
    fn model(&mut self, host: &mut H, name: &str) -> Result<Rc<Model<H>>, RenderError>;
}

/// The station diorama: cameras, live state and every drawable.
pub struct StationScene<H: ShaderHost> {
    pub camera: Camera,
    /// Fixed view rendered into the off-screen target.
    pub screen_camera: Camera,
    pub state: SceneState,
    pub(crate) primitives: Vec<Primitive<H>>,
    pub(crate) textured: Vec<Primitive<H>>,
    pub(crate) objects: Vec<SceneObject<H>>,
    pub(crate) screen: Primitive<H>,
    platform: usize,
    platform_textures: [H::Texture; 2],
}

impl<H: ShaderHost> StationScene<H> {
    pub fn build(
        host: &mut H,
        assets: &mut impl AssetSource<H>,
        store: &ConfigStore,
        viewport: Viewport,
    ) -> Result<Self, RenderError> {
        let config = |name: &str, info: &str| ObjectConfig::resolve(store, name, info);

        let primitives = vec![Primitive::flat(host, &config("Station", "Cube"), Shape::Cube)?];

        let rock1 = assets.texture(host, "rock1")?;
        let rock2 = assets.texture(host, "rock2")?;
        let peron = assets.texture(host, "peron")?;
        let ground = assets.texture(host, "ground1")?;
        let textured = vec![
            Primitive::textured(
                host,
                &config("Platform", "Cube"),
                Shape::Cube,
                TextureSet::with_detail(rock1.clone(), peron),
            )?,
            Primitive::textured(host, &config("Ground", "Floor"), Shape::Floor, TextureSet::base(ground))?,
        ];

        let screen_config = config("Screen", "Floor");
        let mut screen = Primitive::textured(host, &screen_config, Shape::Floor, TextureSet::default())?;
        screen.set_texture_matrix(screen_texture_matrix(&screen_config));

        let panther = assets.model(host, "Panther")?;
        let locomotive = assets.model(host, "Locomotive")?;
        let placements = [
            ("Panther", "Model", &panther, "matrix1"),
            ("Panther", "Model2", &panther, "daradevil"),
            ("Locomotive", "Model", &locomotive, "metal"),
        ];
        let mut objects = Vec::with_capacity(placements.len());
        for (name, info, model, texture) in placements {
            let texture = assets.texture(host, texture)?;
            objects.push(SceneObject::new(Rc::clone(model), &config(name, info), Some(texture)));
        }

        let camera = Camera::new(*store.camera(), viewport);
        let screen_camera = Camera::new(*store.camera(), viewport);
        let state = SceneState::new(*store.fog(), LightRig::station());

        info!(
            primitives = primitives.len(),
            textured = textured.len(),
            objects = objects.len(),
            "station scene built"
        );
        Ok(Self {
            camera,
            screen_camera,
            state,
            primitives,
            textured,
            objects,
            screen,
            platform: 0,
            platform_textures: [rock1, rock2],
        })
    }

    /// Applies one frame of input to the camera and the live state.
    pub fn update(&mut self, frame: &ActionFrame) {
        self.camera.update(&frame.camera_actions());
        if self.state.apply(frame) {
            let texture = self.platform_textures[usize::from(self.state.platform_alternate)].clone();
            if let Some(platform) = self.textured.get_mut(self.platform) {
                platform.set_base_texture(Some(texture));
            }
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.resize(viewport);
        self.screen_camera.resize(viewport);
    }

    pub fn primitives(&self) -> &[Primitive<H>] {
        &self.primitives
    }

    pub fn textured_primitives(&self) -> &[Primitive<H>] {
        &self.textured
    }

    pub fn objects(&self) -> &[SceneObject<H>] {
        &self.objects
    }

    pub fn screen(&self) -> &Primitive<H> {
        &self.screen
    }

    /// Geometry counts per drawable, models listed once.
    pub fn stats(&self) -> Vec<(String, MeshStats)> {
        let mut stats: Vec<(String, MeshStats)> = self
            .primitives
            .iter()
            .chain(&self.textured)
            .chain(std::iter::once(&self.screen))
            .map(|p| (p.name().to_string(), p.stats()))
            .collect();
        for object in &self.objects {
            let name = object.model().name();
            if !stats.iter().any(|(n, _)| n == name) {
                stats.push((name.to_string(), object.model().stats()));
            }
        }
        stats
    }

    /// Releases every buffer. Models still shared elsewhere are left to their
    /// remaining owners.
    pub fn release(self, host: &mut H) {
        for primitive in self.primitives.into_iter().chain(self.textured) {
            primitive.release(host);
        }
        self.screen.release(host);

        let mut models: Vec<Rc<Model<H>>> =
            self.objects.into_iter().map(SceneObject::into_model).collect();
        while let Some(model) = models.pop() {
            let remaining = models.iter().filter(|m| Rc::ptr_eq(m, &model)).count();
            match Rc::try_unwrap(model) {
                Ok(model) => model.release(host),
                Err(model) if remaining == 0 => {
                    warn!(model = model.name(), "model still shared at release");
                }
                Err(_) => {}
            }
        }
    }
}

/// Maps the screen grid's texture coordinates onto `0..1`, `v` pointing down.
fn screen_texture_matrix(config: &ObjectConfig) -> Mat4 {
    let scale = config.transform.scale_factors();
    let width = (config.size * scale.x).max(1.0);
    let depth = (config.size * scale.z).max(1.0);
    let resolution = config.texture_resolution;
    Mat4::from_cols(
        Vec4::new(resolution / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -resolution / depth, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(0.5, 0.5, 0.0, 1.0),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mesh::{Patch, build_box};
    use crate::trace::{TraceHost, TraceTexture};
    use glam::{Vec2, Vec3};
    use station_input::{Action, ActionSet};
    use std::collections::HashMap;

    /// Solid-named textures and one-box models.
    #[derive(Default)]
    pub(crate) struct FakeAssets {
        models: HashMap<String, Rc<Model<TraceHost>>>,
    }

    impl AssetSource<TraceHost> for FakeAssets {
        fn texture(&mut self, _host: &mut TraceHost, name: &str) -> Result<TraceTexture, RenderError> {
            Ok(TraceTexture(name.to_string()))
        }

        fn model(
            &mut self,
            host: &mut TraceHost,
            name: &str,
        ) -> Result<Rc<Model<TraceHost>>, RenderError> {
            if let Some(model) = self.models.get(name) {
                return Ok(Rc::clone(model));
            }
            let body: Patch = build_box(Vec3::ZERO, Vec3::splat(5.0));
            let model = Rc::new(Model::upload(host, name, [("body", &body)])?);
            self.models.insert(name.to_string(), Rc::clone(&model));
            Ok(model)
        }
    }

    pub(crate) fn station(host: &mut TraceHost) -> StationScene<TraceHost> {
        let mut assets = FakeAssets::default();
        StationScene::build(host, &mut assets, &ConfigStore::station(), Viewport::new(800, 600))
            .unwrap()
    }

    #[test]
    fn station_has_every_drawable() {
        let mut host = TraceHost::new();
        let scene = station(&mut host);
        assert_eq!(scene.primitives().len(), 1);
        assert_eq!(scene.textured_primitives().len(), 2);
        assert_eq!(scene.objects().len(), 3);
        assert!(Rc::ptr_eq(scene.objects()[0].model(), scene.objects()[1].model()));
        assert!(scene.screen().textures().base.is_none());
        let names: Vec<String> = scene.stats().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            ["StationCube", "PlatformCube", "GroundFloor", "ScreenFloor", "Panther", "Locomotive"]
        );
    }

    #[test]
    fn screen_matrix_maps_grid_to_unit_square() {
        let config = ObjectConfig::resolve(&ConfigStore::station(), "Screen", "Floor");
        let m = screen_texture_matrix(&config);
        let map = |uv: Vec2| {
            let v = m * glam::Vec4::new(uv.x, uv.y, 0.0, 1.0);
            Vec2::new(v.x, v.y)
        };
        assert!((map(Vec2::new(-80.0, -45.0)) - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!((map(Vec2::new(80.0, 45.0)) - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert!((map(Vec2::ZERO) - Vec2::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn swap_action_changes_platform_texture() {
        let mut host = TraceHost::new();
        let mut scene = station(&mut host);
        let press: ActionSet = [Action::SwapPlatformTexture].into_iter().collect();
        scene.update(&ActionFrame::new(press.clone(), ActionSet::new()));
        assert_eq!(
            scene.textured_primitives()[0].textures().base,
            Some(TraceTexture("rock2".into()))
        );
        scene.update(&ActionFrame::new(press, ActionSet::new()));
        assert_eq!(
            scene.textured_primitives()[0].textures().base,
            Some(TraceTexture("rock1".into()))
        );
    }

    #[test]
    fn release_frees_every_buffer() {
        let mut host = TraceHost::new();
        let scene = station(&mut host);
        assert!(host.live_buffers() > 0);
        scene.release(&mut host);
        assert_eq!(host.live_buffers(), 0);
    }

    #[test]
    fn update_moves_only_the_main_camera() {
        let mut host = TraceHost::new();
        let mut scene = station(&mut host);
        let before = scene.screen_camera.position;
        let press: ActionSet = [Action::MoveForward].into_iter().collect();
        scene.update(&ActionFrame::new(press, ActionSet::new()));
        assert_ne!(scene.camera.position, before);
        assert_eq!(scene.screen_camera.position, before);
    }
}
