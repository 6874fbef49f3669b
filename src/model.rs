//! Model name resolution and validation.

/// Default model for outfit idea generation (structured text output).
pub const DEFAULT_IDEAS_MODEL: &str = "gemini-2.5-pro";

/// Default model for flat-lay synthesis and edits (image output).
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Short name aliases for popular models.
const ALIASES: &[(&str, &str)] = &[
    ("nano-banana", "gemini-2.5-flash-image"),
    ("nano-banana-pro", "gemini-3-pro-image-preview"),
    ("gemini-pro", "gemini-2.5-pro"),
    ("gemini-flash", "gemini-2.5-flash"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Check that a resolved model name targets the Gemini API.
///
/// # Errors
///
/// Returns an error if the model name doesn't start with `gemini`.
pub fn validate_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") {
        Ok(())
    } else {
        Err(format!("Unknown model '{model}'. Expected a 'gemini-*' model or a known alias."))
    }
}
