//! C++ language profile

use super::{Language, LanguageProfile};

pub fn profile(image: &str) -> LanguageProfile {
    LanguageProfile {
        language: Language::Cpp,
        image: image.to_string(),
        compile_command: Some("g++ -O2 -o /sandbox/code /sandbox/code.cpp".to_string()),
        run_command: "/sandbox/code".to_string(),
        source_file: "code.cpp".to_string(),
    }
}
