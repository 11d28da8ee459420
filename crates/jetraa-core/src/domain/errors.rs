pub type RaaResult<T> = Result<T, RaaError>;
pub type IngestResult<T> = RaaResult<T>;
pub type EmitResult<T> = RaaResult<T>;

/// Exit status used for every recognized fatal error.
pub const FATAL_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaaErrorCategory {
    Configuration,
    Cardinality,
    Classification,
    Structural,
    IoSystem,
    Internal,
}

impl RaaErrorCategory {
    pub const fn rust_category(self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::Cardinality => "CardinalityError",
            Self::Classification => "ClassificationError",
            Self::Structural => "StructuralError",
            Self::IoSystem => "IoSystemError",
            Self::Internal => "InternalError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} [{}] {}", .category.rust_category(), .placeholder, .message)]
pub struct RaaError {
    category: RaaErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl RaaError {
    pub fn new(
        category: RaaErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::Configuration, placeholder, message)
    }

    pub fn cardinality(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::Cardinality, placeholder, message)
    }

    pub fn classification(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::Classification, placeholder, message)
    }

    pub fn structural(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::Structural, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::IoSystem, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RaaErrorCategory::Internal, placeholder, message)
    }

    pub const fn category(&self) -> RaaErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
