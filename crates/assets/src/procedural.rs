use crate::AssetError;
use crate::catalog::AssetCatalog;
use station_render::{AssetSource, Model, RenderError, ShaderHost};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Generates catalog assets on first request and caches them per name.
///
/// The model cache keeps one reference to every model it handed out; drop the
/// source once the scene is built so the scene owns its models alone.
pub struct ProceduralAssets<H: ShaderHost> {
    catalog: AssetCatalog,
    textures: HashMap<String, H::Texture>,
    models: HashMap<String, Rc<Model<H>>>,
}

impl<H: ShaderHost> ProceduralAssets<H> {
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            textures: HashMap::new(),
            models: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn cached_models(&self) -> usize {
        self.models.len()
    }
}

impl<H: ShaderHost> AssetSource<H> for ProceduralAssets<H> {
    fn texture(&mut self, host: &mut H, name: &str) -> Result<H::Texture, RenderError> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(texture.clone());
        }
        let recipe = self
            .catalog
            .texture(name)
            .ok_or_else(|| AssetError::UnknownTexture(name.to_string()))?;
        let image = recipe.render();
        debug!(name, width = image.width, height = image.height, "texture generated");
        let texture = host.create_texture(name, &image)?;
        self.textures.insert(name.to_string(), texture.clone());
        Ok(texture)
    }

    fn model(&mut self, host: &mut H, name: &str) -> Result<Rc<Model<H>>, RenderError> {
        if let Some(model) = self.models.get(name) {
            return Ok(Rc::clone(model));
        }
        let recipe = self
            .catalog
            .model(name)
            .ok_or_else(|| AssetError::UnknownModel(name.to_string()))?;
        let parts = recipe.build();
        let model = Rc::new(Model::upload(
            host,
            name,
            parts.iter().map(|(part, patch)| (part.as_str(), patch)),
        )?);
        debug!(name, parts = parts.len(), "model generated");
        self.models.insert(name.to_string(), Rc::clone(&model));
        Ok(model)
    }
}
