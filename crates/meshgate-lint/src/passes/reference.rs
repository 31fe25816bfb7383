//! Referential integrity: every cross-index must name an existing entry.

use meshgate_model::{Collection, Document, Field};
use tracing::trace;

use super::{index_range, PassContext, PassOutput, ValidationPass};
use crate::report::{Finding, FindingKind};

/// Checks that every index reference is defined and in bounds.
///
/// Each bad index yields exactly one finding: `reference/out-of-range`,
/// `reference/missing` for required references, or `reference/malformed`
/// when the value is not an integer.
pub struct ReferencePass;

impl ValidationPass for ReferencePass {
    fn id(&self) -> &'static str {
        "reference"
    }

    fn description(&self) -> &'static str {
        "Cross-collection indices are present and within bounds"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::Structural
    }

    fn run(&self, document: &Document, _ctx: &PassContext<'_>) -> PassOutput {
        let mut out = PassOutput::default();
        check_accessors(document, &mut out);
        check_buffer_views(document, &mut out);
        check_buffers(document, &mut out);
        check_meshes(document, &mut out);
        check_materials(document, &mut out);
        check_textures(document, &mut out);
        check_images(document, &mut out);
        out
    }
}

/// One reference site: who holds it, what it is called, where it lives.
struct Site<'a> {
    owner: &'a str,
    field: &'a str,
    location: String,
}

impl Site<'_> {
    fn check<T>(&self, value: &Field<i64>, target: &Collection<T>, required: bool, out: &mut PassOutput) {
        match value {
            Field::Present(index) if target.contains_index(*index) => {
                trace!(owner = self.owner, field = self.field, index, "reference ok");
            }
            Field::Present(index) => out.push(
                Finding::error(
                    "reference/out-of-range",
                    FindingKind::Structural,
                    format!("{}: Invalid {} reference {}", self.owner, self.field, index),
                )
                .at(self.location.clone())
                .with_actual_value(index.to_string())
                .with_expected_range(index_range(target)),
            ),
            Field::Absent | Field::Null if required => out.push(
                Finding::error(
                    "reference/missing",
                    FindingKind::Structural,
                    format!("{}: Missing {} reference", self.owner, self.field),
                )
                .at(self.location.clone()),
            ),
            Field::Absent | Field::Null => {}
            Field::Invalid(raw) => out.push(
                Finding::error(
                    "reference/malformed",
                    FindingKind::Structural,
                    format!(
                        "{}: Malformed {} reference {} (expected an integer index)",
                        self.owner, self.field, raw
                    ),
                )
                .at(self.location.clone())
                .with_actual_value(raw.to_string()),
            ),
        }
    }
}

fn check_accessors(document: &Document, out: &mut PassOutput) {
    for (i, accessor) in document.accessors.entries() {
        let owner = format!("Accessor {}", i);
        Site {
            owner: &owner,
            field: "bufferView",
            location: format!("accessors[{}].bufferView", i),
        }
        .check(&accessor.buffer_view, &document.buffer_views, true, out);
    }
}

fn check_buffer_views(document: &Document, out: &mut PassOutput) {
    for (i, view) in document.buffer_views.entries() {
        let owner = format!("BufferView {}", i);
        Site {
            owner: &owner,
            field: "buffer",
            location: format!("bufferViews[{}].buffer", i),
        }
        .check(&view.buffer, &document.buffers, true, out);
    }
}

fn check_buffers(document: &Document, out: &mut PassOutput) {
    for (i, buffer) in document.buffers.entries() {
        if buffer.uri.is_missing() && buffer.byte_length.is_missing() {
            out.push(
                Finding::error(
                    "reference/missing",
                    FindingKind::Structural,
                    format!("Buffer {}: Missing uri or byteLength", i),
                )
                .at(format!("buffers[{}]", i))
                .with_suggestion("Declare a uri for external data or a byteLength for embedded data"),
            );
        }
    }
}

fn check_meshes(document: &Document, out: &mut PassOutput) {
    for (m, mesh) in document.meshes.entries() {
        let Some(primitives) = mesh.primitives.present() else {
            continue;
        };
        for (p, primitive) in primitives.iter().enumerate() {
            let Some(primitive) = primitive.present() else {
                continue;
            };
            let owner = format!("Mesh {} Primitive {}", m, p);
            let base = format!("meshes[{}].primitives[{}]", m, p);

            if let Some(attributes) = primitive.attributes.present() {
                for (semantic, value) in attributes {
                    Site {
                        owner: &owner,
                        field: semantic,
                        location: format!("{}.attributes.{}", base, semantic),
                    }
                    .check(value, &document.accessors, true, out);
                }
            }

            Site {
                owner: &owner,
                field: "indices",
                location: format!("{}.indices", base),
            }
            .check(&primitive.indices, &document.accessors, false, out);

            Site {
                owner: &owner,
                field: "material",
                location: format!("{}.material", base),
            }
            .check(&primitive.material, &document.materials, false, out);
        }
    }
}

fn check_materials(document: &Document, out: &mut PassOutput) {
    for (i, material) in document.materials.entries() {
        let owner = format!("Material {}", i);
        if let Field::Invalid(raw) = &material.pbr_metallic_roughness {
            out.push(
                Finding::error(
                    "reference/malformed",
                    FindingKind::Structural,
                    format!("{}: Malformed pbrMetallicRoughness (expected an object)", owner),
                )
                .at(format!("materials[{}].pbrMetallicRoughness", i))
                .with_actual_value(raw.to_string()),
            );
        }
        for slot in material.texture_slots() {
            let location = format!("materials[{}].{}", i, slot.path);
            match slot.info {
                Field::Present(info) => Site {
                    owner: &owner,
                    field: slot.name,
                    location: format!("{}.index", location),
                }
                .check(&info.index, &document.textures, true, out),
                Field::Invalid(raw) => out.push(
                    Finding::error(
                        "reference/malformed",
                        FindingKind::Structural,
                        format!("{}: Malformed {} (expected an object)", owner, slot.name),
                    )
                    .at(location)
                    .with_actual_value(raw.to_string()),
                ),
                Field::Absent | Field::Null => {}
            }
        }
    }
}

fn check_textures(document: &Document, out: &mut PassOutput) {
    for (i, texture) in document.textures.entries() {
        let owner = format!("Texture {}", i);
        Site {
            owner: &owner,
            field: "source",
            location: format!("textures[{}].source", i),
        }
        .check(&texture.source, &document.images, true, out);
        Site {
            owner: &owner,
            field: "sampler",
            location: format!("textures[{}].sampler", i),
        }
        .check(&texture.sampler, &document.samplers, false, out);
    }
}

fn check_images(document: &Document, out: &mut PassOutput) {
    for (i, image) in document.images.entries() {
        if image.uri.is_missing() && image.buffer_view.is_missing() {
            out.push(
                Finding::error(
                    "reference/missing",
                    FindingKind::Structural,
                    format!("Image {}: Missing uri or bufferView", i),
                )
                .at(format!("images[{}]", i)),
            );
            continue;
        }
        let owner = format!("Image {}", i);
        Site {
            owner: &owner,
            field: "bufferView",
            location: format!("images[{}].bufferView", i),
        }
        .check(&image.buffer_view, &document.buffer_views, false, out);
    }
}
