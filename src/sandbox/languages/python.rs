//! Python language profile

use super::{Language, LanguageProfile};

/// Interpreted, single step
pub fn profile(image: &str) -> LanguageProfile {
    LanguageProfile {
        language: Language::Python,
        image: image.to_string(),
        compile_command: None,
        run_command: "python /sandbox/code.py".to_string(),
        source_file: "code.py".to_string(),
    }
}
