//! C language profile

use super::{Language, LanguageProfile};

pub fn profile(image: &str) -> LanguageProfile {
    LanguageProfile {
        language: Language::C,
        image: image.to_string(),
        compile_command: Some("gcc -O2 -o /sandbox/code /sandbox/code.c -lm".to_string()),
        run_command: "/sandbox/code".to_string(),
        source_file: "code.c".to_string(),
    }
}
