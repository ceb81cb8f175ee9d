//! Local validation of the patient identity form.
//!
//! Runs before any network call; a non-empty error list blocks submission.

pub const MIN_NAME_CHARS: usize = 6;
pub const DNI_DIGITS: usize = 8;
pub const MAX_AGE: i32 = 120;

pub const ERR_NAME: &str = "Ingresa nombre completo (mínimo 6 caracteres)";
pub const ERR_DNI: &str = "DNI debe tener 8 dígitos";
pub const ERR_AGE: &str = "Edad inválida";

/// Validate name, DNI and optional age. Returns itemized messages.
pub fn validate_identity(nombre: &str, dni: &str, edad: Option<i32>) -> Vec<String> {
    let mut errors = Vec::new();

    if nombre.trim().chars().count() < MIN_NAME_CHARS {
        errors.push(ERR_NAME.to_string());
    }

    if !is_valid_dni(dni.trim()) {
        errors.push(ERR_DNI.to_string());
    }

    if let Some(age) = edad {
        if !(0..=MAX_AGE).contains(&age) {
            errors.push(ERR_AGE.to_string());
        }
    }

    errors
}

pub fn is_valid_dni(dni: &str) -> bool {
    dni.len() == DNI_DIGITS && dni.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the free-text age field. Blank means "not given".
pub fn parse_age(input: &str) -> Result<Option<i32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| ERR_AGE.to_string())
}
