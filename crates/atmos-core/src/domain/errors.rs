use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AtmosResult<T> = Result<T, AtmosError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtmosErrorCategory {
    Success,
    InputValidationError,
    LookupError,
    ComputationError,
    InternalError,
}

impl AtmosErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::LookupError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::LookupError => "LookupError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmosError {
    category: AtmosErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl AtmosError {
    pub fn new(
        category: AtmosErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmosErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn lookup(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmosErrorCategory::LookupError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmosErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmosErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> AtmosErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for AtmosError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for AtmosError {}

#[cfg(test)]
mod tests {
    use super::{AtmosError, AtmosErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (AtmosErrorCategory::Success, 0, "Success"),
            (
                AtmosErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (AtmosErrorCategory::LookupError, 3, "LookupError"),
            (AtmosErrorCategory::ComputationError, 4, "ComputationError"),
            (AtmosErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = AtmosError::lookup("LOOKUP.SPECIES", "species 'Xx II' is not registered");

        assert_eq!(error.exit_code(), 3);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [LOOKUP.SPECIES] species 'Xx II' is not registered"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 3")
        );
        assert_eq!(
            error.to_string(),
            "LookupError [LOOKUP.SPECIES] species 'Xx II' is not registered"
        );
    }
}
