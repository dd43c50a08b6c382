//! Resolving catalog entries against a scene.

use spriterig_spec::CharacterEntry;
use tracing::warn;

use crate::error::{Resource, RigError, RigResult};
use crate::scene::{NodeId, Scene, Visibility};

/// Looks up a character's armature.
///
/// A missing armature is fatal for that character's whole render pass.
pub fn resolve_armature<S: Scene + ?Sized>(
    scene: &S,
    character: &CharacterEntry,
) -> RigResult<NodeId> {
    let name = character.armature_name();
    scene
        .find_node(&name)
        .ok_or_else(|| RigError::not_found(Resource::Armature, name))
}

/// Hides every top-level collection, then shows only the character's.
///
/// Returns true if a collection matched the character id.
pub fn activate_character_visibility<S: Scene + ?Sized>(
    scene: &mut S,
    character_id: &str,
) -> RigResult<bool> {
    let collections = scene.collections();
    for name in &collections {
        scene.set_collection_visibility(name, Visibility::HIDDEN)?;
    }

    if collections.iter().any(|name| name == character_id) {
        scene.set_collection_visibility(character_id, Visibility::VISIBLE)?;
        Ok(true)
    } else {
        warn!(character = character_id, "No collection named after character; all collections hidden");
        Ok(false)
    }
}
