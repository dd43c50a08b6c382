//! Render catalog types: characters and their exported animations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Prefix of the armature object name derived from a character id.
pub const ARMATURE_PREFIX: &str = "armature_";

/// One exported animation of a character.
///
/// Several export names may point at the same source action with different
/// frame windows (e.g. a `dead` export holding the last frames of `death`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationSpec {
    /// Name used in output paths.
    pub export_name: String,

    /// Name of the source action bound to the armature.
    pub action: String,

    /// First frame to render (1-based, inclusive).
    #[serde(default = "default_start_frame")]
    pub start_frame: u32,

    /// Number of frames to render.
    pub frame_count: u32,
}

fn default_start_frame() -> u32 {
    1
}

impl AnimationSpec {
    /// Creates an animation whose export name equals the action name.
    pub fn new(action: impl Into<String>, start_frame: u32, frame_count: u32) -> Self {
        let action = action.into();
        Self {
            export_name: action.clone(),
            action,
            start_frame,
            frame_count,
        }
    }

    /// Sets a different export name.
    pub fn exported_as(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = export_name.into();
        self
    }

    /// Last frame rendered (inclusive), or `None` for an empty or overflowing window.
    pub fn end_frame(&self) -> Option<u32> {
        if self.frame_count == 0 {
            None
        } else {
            self.start_frame.checked_add(self.frame_count - 1)
        }
    }

    /// Iterates the target frames in render order.
    ///
    /// Stops at `u32::MAX`; [`Catalog::check`] rejects such windows up front.
    pub fn frames(&self) -> impl Iterator<Item = u32> {
        let start = self.start_frame;
        (0..self.frame_count).map_while(move |offset| start.checked_add(offset))
    }
}

/// A character and the animations to render for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterEntry {
    /// Character id; also the name of the character's collection.
    pub id: String,

    /// Armature object name; defaults to `armature_{id}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armature: Option<String>,

    /// Animations in render order.
    #[serde(default)]
    pub animations: Vec<AnimationSpec>,
}

impl CharacterEntry {
    /// Creates a character with no animations.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            armature: None,
            animations: Vec::new(),
        }
    }

    /// Overrides the armature object name.
    pub fn armature(mut self, name: impl Into<String>) -> Self {
        self.armature = Some(name.into());
        self
    }

    /// Appends an animation.
    pub fn animation(mut self, animation: AnimationSpec) -> Self {
        self.animations.push(animation);
        self
    }

    /// Returns the armature object name to look up in the scene.
    pub fn armature_name(&self) -> String {
        match &self.armature {
            Some(name) => name.clone(),
            None => format!("{}{}", ARMATURE_PREFIX, self.id),
        }
    }

    /// Total frames across all animations (per direction).
    pub fn frame_total(&self) -> u64 {
        self.animations.iter().map(|a| a.frame_count as u64).sum()
    }
}

/// Ordered list of characters to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub characters: Vec<CharacterEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character.
    pub fn character(mut self, entry: CharacterEntry) -> Self {
        self.characters.push(entry);
        self
    }

    /// Iterates characters in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, CharacterEntry> {
        self.characters.iter()
    }

    /// Looks up a character by id.
    pub fn get(&self, id: &str) -> Option<&CharacterEntry> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Returns the number of characters.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Returns true if the catalog has no characters.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Checks that every job has a distinct output path and a valid frame.
    ///
    /// # Errors
    /// Returns [`SpecError::InvalidArgument`] for a duplicate character id, a
    /// duplicate export name within a character, or a frame window starting
    /// at 0 or running past `u32::MAX`.
    pub fn check(&self) -> Result<(), SpecError> {
        let mut ids = HashSet::new();
        for character in &self.characters {
            if !ids.insert(character.id.as_str()) {
                return Err(SpecError::invalid_argument(format!(
                    "duplicate character id '{}'",
                    character.id
                )));
            }
            let mut exports = HashSet::new();
            for animation in &character.animations {
                if !exports.insert(animation.export_name.as_str()) {
                    return Err(SpecError::invalid_argument(format!(
                        "{}: duplicate export name '{}'",
                        character.id, animation.export_name
                    )));
                }
                if animation.frame_count > 0
                    && (animation.start_frame == 0 || animation.end_frame().is_none())
                {
                    return Err(SpecError::invalid_argument(format!(
                        "{}/{}: frame window {}+{} is out of range",
                        character.id,
                        animation.export_name,
                        animation.start_frame,
                        animation.frame_count
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<CharacterEntry>> for Catalog {
    fn from(characters: Vec<CharacterEntry>) -> Self {
        Self { characters }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CharacterEntry;
    type IntoIter = std::slice::Iter<'a, CharacterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.characters.iter()
    }
}
