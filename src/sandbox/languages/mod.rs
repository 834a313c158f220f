//! Language profiles for compilation and execution
//!
//! The set of supported languages is closed: every identifier either maps
//! onto a [`Language`] variant or falls back to the default profile.

pub mod c;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

use std::fmt;

use serde::Serialize;

use crate::{config::ContainerImages, constants::languages};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
}

impl Language {
    /// Fallback for identifiers that match no variant
    pub const DEFAULT: Language = Language::Python;

    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::C,
    ];

    /// Match an identifier case-insensitively, accepting common aliases
    pub fn parse(identifier: &str) -> Option<Self> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            languages::PYTHON | "py" | "python3" => Some(Self::Python),
            languages::JAVASCRIPT | "js" | "node" | "nodejs" => Some(Self::JavaScript),
            languages::JAVA => Some(Self::Java),
            languages::CPP | "c++" | "cxx" => Some(Self::Cpp),
            languages::C => Some(Self::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => languages::PYTHON,
            Self::JavaScript => languages::JAVASCRIPT,
            Self::Java => languages::JAVA,
            Self::Cpp => languages::CPP,
            Self::C => languages::C,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to compile (optionally) and run code in one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub language: Language,
    pub image: String,
    pub compile_command: Option<String>,
    pub run_command: String,
    /// File name the source is written to inside the workspace
    pub source_file: String,
}

impl LanguageProfile {
    pub fn is_compiled(&self) -> bool {
        self.compile_command.is_some()
    }
}

/// Resolves language identifiers to profiles
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    images: ContainerImages,
}

impl LanguageRegistry {
    pub fn new(images: ContainerImages) -> Self {
        Self { images }
    }

    /// Total lookup: unknown identifiers resolve to the default profile
    pub fn resolve(&self, identifier: &str) -> LanguageProfile {
        let language = match Language::parse(identifier) {
            Some(language) => language,
            None => {
                tracing::debug!(
                    language = %identifier,
                    fallback = %Language::DEFAULT,
                    "Unrecognized language, using default profile"
                );
                Language::DEFAULT
            }
        };

        self.profile(language)
    }

    pub fn profile(&self, language: Language) -> LanguageProfile {
        match language {
            Language::Python => python::profile(&self.images.python),
            Language::JavaScript => javascript::profile(&self.images.javascript),
            Language::Java => java::profile(&self.images.java),
            Language::Cpp => cpp::profile(&self.images.cpp),
            Language::C => c::profile(&self.images.c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_a_run_command() {
        let registry = LanguageRegistry::default();
        for language in Language::ALL {
            let profile = registry.resolve(language.as_str());
            assert_eq!(profile.language, language);
            assert!(!profile.run_command.is_empty());
            assert!(!profile.source_file.is_empty());
            assert!(!profile.image.is_empty());
        }
    }

    #[test]
    fn test_compiled_languages_have_compile_commands() {
        let registry = LanguageRegistry::default();
        for language in [Language::Java, Language::Cpp, Language::C] {
            let compile = registry.profile(language).compile_command;
            assert!(compile.is_some_and(|cmd| !cmd.is_empty()), "{language}");
        }
        for language in [Language::Python, Language::JavaScript] {
            assert!(!registry.profile(language).is_compiled(), "{language}");
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(Language::parse("PYTHON"), Some(Language::Python));
        assert_eq!(Language::parse(" Java "), Some(Language::Java));
        assert_eq!(Language::parse("C++"), Some(Language::Cpp));
        assert_eq!(Language::parse("JavaScript"), Some(Language::JavaScript));
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let registry = LanguageRegistry::default();
        let profile = registry.resolve("brainfuck");
        assert_eq!(profile, registry.profile(Language::DEFAULT));
        assert_eq!(registry.resolve(""), registry.profile(Language::Python));
    }

    #[test]
    fn test_image_overrides_are_applied() {
        let registry = LanguageRegistry::new(ContainerImages {
            cpp: "registry.local/gcc:14".to_string(),
            ..ContainerImages::default()
        });
        assert_eq!(registry.resolve("cpp").image, "registry.local/gcc:14");
        assert_eq!(registry.resolve("python").image, "python:3.11-slim");
    }
}
