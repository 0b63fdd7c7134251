use crate::AssetError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use station_common::Color;
use station_render::{Patch, TextureImage, build_box};
use std::collections::BTreeMap;
use std::path::Path;

/// How to paint a square texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureRecipe {
    Solid {
        color: Color,
    },
    Checker {
        size: u32,
        cells: u32,
        a: Color,
        b: Color,
    },
    /// Per-pixel brightness jitter around `base`.
    Noise {
        size: u32,
        base: Color,
        variation: u8,
        seed: u64,
    },
    /// Horizontal bands, `a` first.
    Stripes {
        size: u32,
        stripes: u32,
        a: Color,
        b: Color,
    },
}

impl TextureRecipe {
    pub fn kind(&self) -> &'static str {
        match self {
            TextureRecipe::Solid { .. } => "solid",
            TextureRecipe::Checker { .. } => "checker",
            TextureRecipe::Noise { .. } => "noise",
            TextureRecipe::Stripes { .. } => "stripes",
        }
    }

    pub fn render(&self) -> TextureImage {
        match *self {
            TextureRecipe::Solid { color } => TextureImage::solid(1, 1, color),
            TextureRecipe::Checker { size, cells, a, b } => {
                let cell = (size / cells.max(1)).max(1);
                paint(size, |x, y| if (x / cell + y / cell) % 2 == 0 { a } else { b })
            }
            TextureRecipe::Noise {
                size,
                base,
                variation,
                seed,
            } => paint(size, |x, y| {
                let h = splitmix(seed ^ ((u64::from(y) << 32) | u64::from(x)));
                let offset = (h % (u64::from(variation) * 2 + 1)) as i16 - i16::from(variation);
                let shift = |c: u8| (i16::from(c) + offset).clamp(0, 255) as u8;
                Color::rgba(shift(base.r), shift(base.g), shift(base.b), base.a)
            }),
            TextureRecipe::Stripes { size, stripes, a, b } => {
                let band = (size / stripes.max(1)).max(1);
                paint(size, |_, y| if (y / band) % 2 == 0 { a } else { b })
            }
        }
    }
}

fn paint(size: u32, pixel: impl Fn(u32, u32) -> Color) -> TextureImage {
    let size = size.max(1);
    let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            rgba.extend_from_slice(&pixel(x, y).to_array());
        }
    }
    TextureImage {
        width: size,
        height: size,
        rgba,
    }
}

fn splitmix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPart {
    pub name: String,
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoxPart {
    pub fn new(name: &str, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            name: name.to_string(),
            center,
            half_extents,
        }
    }
}

/// A model assembled from textured boxes, one mesh part per box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRecipe {
    pub parts: Vec<BoxPart>,
}

impl ModelRecipe {
    pub fn build(&self) -> Vec<(String, Patch)> {
        self.parts
            .iter()
            .map(|part| (part.name.clone(), build_box(part.center, part.half_extents)))
            .collect()
    }
}

/// Named texture and model recipes. Persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    pub textures: BTreeMap<String, TextureRecipe>,
    pub models: BTreeMap<String, ModelRecipe>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every texture and model the station scene asks for.
    pub fn station() -> Self {
        let mut catalog = Self::new();
        let noise = |base: Color, variation: u8, seed: u64| TextureRecipe::Noise {
            size: 128,
            base,
            variation,
            seed,
        };
        let checker = |cells: u32, a: Color, b: Color| TextureRecipe::Checker {
            size: 128,
            cells,
            a,
            b,
        };
        let stripes = |stripes: u32, a: Color, b: Color| TextureRecipe::Stripes {
            size: 128,
            stripes,
            a,
            b,
        };

        for (name, recipe) in [
            ("matrix1", stripes(16, Color::rgb(0, 40, 0), Color::rgb(0, 200, 70))),
            ("daradevil", checker(4, Color::DARK_RED, Color::rgb(60, 0, 0))),
            ("metal", noise(Color::rgb(150, 150, 160), 20, 7)),
            ("rock1", noise(Color::rgb(120, 110, 100), 40, 1)),
            ("rock2", noise(Color::rgb(90, 95, 110), 40, 2)),
            ("peron", stripes(8, Color::YELLOW, Color::rgba(0, 0, 0, 0))),
            ("ground1", noise(Color::rgb(95, 80, 60), 30, 3)),
            ("grass", noise(Color::rgb(70, 120, 50), 25, 4)),
        ] {
            catalog.textures.insert(name.to_string(), recipe);
        }

        catalog.models.insert(
            "Panther".to_string(),
            ModelRecipe {
                parts: vec![
                    BoxPart::new("hull", Vec3::new(0.0, 4.0, 0.0), Vec3::new(16.0, 4.0, 8.0)),
                    BoxPart::new("turret", Vec3::new(2.0, 10.5, 0.0), Vec3::new(6.0, 2.5, 5.0)),
                    BoxPart::new("gun", Vec3::new(-12.0, 10.5, 0.0), Vec3::new(9.0, 0.6, 0.6)),
                ],
            },
        );
        catalog.models.insert(
            "Locomotive".to_string(),
            ModelRecipe {
                parts: vec![
                    BoxPart::new("boiler", Vec3::ZERO, Vec3::new(12.0, 12.0, 40.0)),
                    BoxPart::new("cab", Vec3::new(0.0, 4.0, 48.0), Vec3::new(14.0, 16.0, 8.0)),
                    BoxPart::new("chimney", Vec3::new(-16.0, 0.0, -30.0), Vec3::new(4.0, 3.0, 3.0)),
                ],
            },
        );
        catalog
    }

    pub fn texture(&self, name: &str) -> Option<&TextureRecipe> {
        self.textures.get(name)
    }

    pub fn model(&self, name: &str) -> Option<&ModelRecipe> {
        self.models.get(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len() + self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.models.is_empty()
    }

    /// SHA-256 of the catalog's JSON form, hex encoded.
    pub fn fingerprint(&self) -> Result<String, AssetError> {
        let json = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&json);
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let catalog: Self = serde_json::from_reader(file)?;
        tracing::info!(
            textures = catalog.textures.len(),
            models = catalog.models.len(),
            "asset catalog loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates_cells() {
        let image = TextureRecipe::Checker {
            size: 4,
            cells: 2,
            a: Color::WHITE,
            b: Color::BLACK,
        }
        .render();
        assert_eq!(image.width, 4);
        assert_eq!(&image.rgba[0..4], &[255, 255, 255, 255]);
        // Pixel (2, 0) lies in the second cell.
        assert_eq!(&image.rgba[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        let recipe = TextureRecipe::Noise {
            size: 16,
            base: Color::rgb(100, 100, 100),
            variation: 10,
            seed: 9,
        };
        let image = recipe.render();
        assert_eq!(image, recipe.render());
        assert!(
            image
                .rgba
                .chunks(4)
                .all(|px| (90..=110).contains(&px[0]) && px[3] == 255)
        );
    }

    #[test]
    fn station_catalog_covers_the_scene() {
        let catalog = AssetCatalog::station();
        for name in ["matrix1", "daradevil", "metal", "rock1", "rock2", "peron", "ground1"] {
            assert!(catalog.texture(name).is_some(), "{name}");
        }
        let panther = catalog.model("Panther").unwrap().build();
        assert_eq!(panther.len(), 3);
        assert_eq!(panther[0].1.indices.len(), 36);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let catalog = AssetCatalog::station();
        catalog.save(tmp.path()).unwrap();

        let loaded = AssetCatalog::load(tmp.path()).unwrap();
        assert_eq!(loaded, catalog);
        assert_eq!(loaded.fingerprint().unwrap(), catalog.fingerprint().unwrap());
    }

    #[test]
    fn fingerprint_tracks_changes() {
        let mut catalog = AssetCatalog::station();
        let before = catalog.fingerprint().unwrap();
        assert_eq!(before.len(), 64);
        catalog.textures.remove("grass");
        assert_ne!(catalog.fingerprint().unwrap(), before);
    }

    #[test]
    fn recipes_are_tagged_in_json() {
        let json = serde_json::to_string(&TextureRecipe::Solid {
            color: Color::RED,
        })
        .unwrap();
        assert!(json.contains(r#""kind":"solid""#));
        let stripes = TextureRecipe::Stripes {
            size: 4,
            stripes: 2,
            a: Color::RED,
            b: Color::BLACK,
        };
        let json = serde_json::to_string(&stripes).unwrap();
        assert!(json.contains(&format!(r#""kind":"{}""#, stripes.kind())));
    }
}
