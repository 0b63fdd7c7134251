//! Procedural assets for the station scene.
//!
//! Textures and models are described by serializable recipes in an
//! [`AssetCatalog`] and generated on first request. The renderer asks for them
//! by name through [`station_render::AssetSource`]; it never sees a file path.
//!
//! # Layout
//! A catalog can be saved to and loaded from JSON. Its fingerprint identifies
//! the exact recipe set.

mod catalog;
mod procedural;

pub use catalog::{AssetCatalog, BoxPart, ModelRecipe, TextureRecipe};
pub use procedural::ProceduralAssets;

use station_render::RenderError;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("texture not in catalog: {0}")]
    UnknownTexture(String),
    #[error("model not in catalog: {0}")]
    UnknownModel(String),
}

impl From<AssetError> for RenderError {
    fn from(err: AssetError) -> Self {
        RenderError::Asset(err.to_string())
    }
}

pub fn crate_info() -> &'static str {
    "station-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn asset_errors_become_render_errors() {
        let err: RenderError = AssetError::UnknownModel("Tiger".into()).into();
        assert!(err.to_string().contains("Tiger"));
    }
}
