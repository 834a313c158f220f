//! Java language profile

use super::{Language, LanguageProfile};

/// The public class must be named `Main`
pub fn profile(image: &str) -> LanguageProfile {
    LanguageProfile {
        language: Language::Java,
        image: image.to_string(),
        compile_command: Some("javac /sandbox/Main.java".to_string()),
        run_command: "java -cp /sandbox Main".to_string(),
        source_file: "Main.java".to_string(),
    }
}
