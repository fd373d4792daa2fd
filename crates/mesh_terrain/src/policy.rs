//! When to generate a terrain automatically.
//!
//! A procedural-terrain profile requires a terrain in the scene. If none
//! exists, validation reports an error whose resolution is an
//! [`AutoGenerationPlan`]: orchestration code draws the terrain preview
//! (instantiating it first if needed), samples it into a terrain, and removes
//! the preview again if it was only created for this purpose.

use glam::Vec3;

use crate::asset::DEFAULT_TERRAIN_NAME;
use crate::types::{GenerationParameters, OrientationMode, DEFAULT_RESOLUTION};

/// Title shared by the pass and error outcomes.
pub const TERRAIN_REQUIRED: &str = "Terrain is required.";
const TERRAIN_PRESENT_MESSAGE: &str = "There is a terrain in the scene.";
const TERRAIN_MISSING_MESSAGE: &str = "There is no terrain in the scene.";

/// Scene facts the policy depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneState {
  /// A terrain is active in the scene.
  pub has_active_terrain: bool,
  /// A terrain generator preview object already exists.
  pub has_terrain_preview: bool,
}

/// True when the scene has no terrain and one should be generated.
pub fn needs_generation(scene: &SceneState) -> bool {
  !scene.has_active_terrain
}

/// Steps to generate a terrain when validation fails.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoGenerationPlan {
  /// Instantiate the terrain generator prefab before drawing the preview.
  pub instantiate_preview: bool,
  /// Destroy the preview after the terrain is created.
  pub destroy_preview_after: bool,
  pub terrain_name: String,
  pub parameters: GenerationParameters,
}

impl AutoGenerationPlan {
  /// Plan for the given scene. The preview is only torn down if the plan
  /// creates it.
  pub fn for_scene(scene: &SceneState) -> Self {
    let instantiate_preview = !scene.has_terrain_preview;
    Self {
      instantiate_preview,
      destroy_preview_after: instantiate_preview,
      terrain_name: DEFAULT_TERRAIN_NAME.to_string(),
      parameters: GenerationParameters {
        resolution: DEFAULT_RESOLUTION,
        padding: Vec3::ZERO,
        vertical_shift: 0.0,
        orientation: OrientationMode::BottomUp,
      },
    }
  }
}

/// Outcome of the "terrain is required" validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationOutcome {
  Pass {
    title: &'static str,
    message: &'static str,
  },
  Error {
    title: &'static str,
    message: &'static str,
    resolution: AutoGenerationPlan,
  },
}

impl ValidationOutcome {
  pub fn is_pass(&self) -> bool {
    matches!(self, ValidationOutcome::Pass { .. })
  }

  /// Resolution to offer the user, if validation failed.
  pub fn resolution(&self) -> Option<&AutoGenerationPlan> {
    match self {
      ValidationOutcome::Pass { .. } => None,
      ValidationOutcome::Error { resolution, .. } => Some(resolution),
    }
  }
}

/// Check that the scene has a terrain.
pub fn validate_terrain(scene: &SceneState) -> ValidationOutcome {
  if needs_generation(scene) {
    ValidationOutcome::Error {
      title: TERRAIN_REQUIRED,
      message: TERRAIN_MISSING_MESSAGE,
      resolution: AutoGenerationPlan::for_scene(scene),
    }
  } else {
    ValidationOutcome::Pass {
      title: TERRAIN_REQUIRED,
      message: TERRAIN_PRESENT_MESSAGE,
    }
  }
}
