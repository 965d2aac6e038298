use crate::utils::error::{CompileError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CompileError::Config {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CompileError::Config {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CompileError::Config {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}

/// The product id becomes part of the artifact file name, so it must not
/// be able to leave the output directory.
pub fn validate_file_name_component(field_name: &str, value: &str) -> Result<()> {
    let reason = if value.trim().is_empty() {
        Some("Value cannot be empty or whitespace-only")
    } else if value.contains(['/', '\\', '\0']) {
        Some("Value cannot contain path separators")
    } else if value == "." || value == ".." {
        Some("Value cannot be '.' or '..'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CompileError::InvalidRequest {
            field: field_name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
