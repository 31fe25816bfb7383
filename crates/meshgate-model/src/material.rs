//! Materials, textures, images and samplers.

use serde::Deserialize;

use crate::field::Field;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    pub pbr_metallic_roughness: Field<PbrMetallicRoughness>,
    pub normal_texture: Field<TextureInfo>,
    pub occlusion_texture: Field<TextureInfo>,
    pub emissive_texture: Field<TextureInfo>,
    pub name: Field<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_texture: Field<TextureInfo>,
    pub metallic_roughness_texture: Field<TextureInfo>,
}

/// Reference from a material slot to a texture.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: Field<i64>,
    pub tex_coord: Field<i64>,
}

/// A material texture slot with the field name used in messages.
#[derive(Debug, Clone, Copy)]
pub struct TextureSlot<'a> {
    /// Field name (e.g. `baseColorTexture`).
    pub name: &'static str,
    /// JSON path relative to the material object.
    pub path: &'static str,
    pub info: &'a Field<TextureInfo>,
}

impl Material {
    /// All texture slots in a fixed order: base color, metallic-roughness,
    /// normal, occlusion, emissive.
    ///
    /// Slots nested under a malformed `pbrMetallicRoughness` are skipped.
    pub fn texture_slots(&self) -> Vec<TextureSlot<'_>> {
        let mut slots = Vec::with_capacity(5);
        if let Some(pbr) = self.pbr_metallic_roughness.present() {
            slots.push(TextureSlot {
                name: "baseColorTexture",
                path: "pbrMetallicRoughness.baseColorTexture",
                info: &pbr.base_color_texture,
            });
            slots.push(TextureSlot {
                name: "metallicRoughnessTexture",
                path: "pbrMetallicRoughness.metallicRoughnessTexture",
                info: &pbr.metallic_roughness_texture,
            });
        }
        slots.push(TextureSlot {
            name: "normalTexture",
            path: "normalTexture",
            info: &self.normal_texture,
        });
        slots.push(TextureSlot {
            name: "occlusionTexture",
            path: "occlusionTexture",
            info: &self.occlusion_texture,
        });
        slots.push(TextureSlot {
            name: "emissiveTexture",
            path: "emissiveTexture",
            info: &self.emissive_texture,
        });
        slots
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Texture {
    /// Image index (required).
    pub source: Field<i64>,
    pub sampler: Field<i64>,
    pub name: Field<String>,
}

/// Image backed by a URI, a buffer view, or both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    pub uri: Field<String>,
    pub buffer_view: Field<i64>,
    pub mime_type: Field<String>,
    pub name: Field<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sampler {
    pub mag_filter: Field<i64>,
    pub min_filter: Field<i64>,
    pub wrap_s: Field<i64>,
    pub wrap_t: Field<i64>,
}
