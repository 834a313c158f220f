//! JavaScript (Node.js) language profile

use super::{Language, LanguageProfile};

pub fn profile(image: &str) -> LanguageProfile {
    LanguageProfile {
        language: Language::JavaScript,
        image: image.to_string(),
        compile_command: None,
        run_command: "node /sandbox/code.js".to_string(),
        source_file: "code.js".to_string(),
    }
}
