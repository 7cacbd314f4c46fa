use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, InputCoords};

/// Name of the external tool as it appears in generated command lines.
pub const TOOL_NAME: &str = "AimsApplyTransform";

/// Build the argument list of an `AimsApplyTransform` invocation for meshes or images.
///
/// Nothing is executed or validated here; chains are passed through in order.
pub fn build_command(
    input_coords: Option<InputCoords>,
    direct_chain: Option<&[String]>,
    inverse_chain: Option<&[String]>,
    reference: Option<&str>,
) -> Vec<String> {
    let mut command = vec![TOOL_NAME.to_string()];
    for transform in direct_chain.unwrap_or_default() {
        command.push("--direct-transform".to_string());
        command.push(transform.clone());
    }
    for transform in inverse_chain.unwrap_or_default() {
        command.push("--inverse-transform".to_string());
        command.push(transform.clone());
    }
    if let Some(reference) = reference {
        command.push("--reference".to_string());
        command.push(reference.to_string());
    }
    if let Some(input_coords) = input_coords {
        command.push("--input-coords".to_string());
        command.push(input_coords.to_string());
    }
    command
}

/// Split an inverse chain (target to source) for image resampling.
///
/// The leading edge maps the target image into its template coordinates and is
/// dropped; the next transform file provides the reference geometry. Returns
/// `(inverse transforms, reference)`.
pub fn image_command_parts(inverse_chain: &[String]) -> Result<(&[String], &str), AppError> {
    match inverse_chain {
        [_, rest @ ..] if !rest.is_empty() => Ok((rest, rest[0].as_str())),
        _ => Err(AppError::new(
            ErrorCategory::ValidationError,
            format!(
                "an image transform needs at least two transforms between image spaces, found {}",
                inverse_chain.len()
            ),
        )
        .with_code("SB-IMAGE-CHAIN")),
    }
}

/// Full image command for an inverse chain going from target to source.
pub fn build_image_command(
    input_coords: Option<InputCoords>,
    inverse_chain: &[String],
) -> Result<Vec<String>, AppError> {
    let (inverse, reference) = image_command_parts(inverse_chain)?;
    Ok(build_command(input_coords, None, Some(inverse), Some(reference)))
}
