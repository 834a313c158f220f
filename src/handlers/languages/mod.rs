//! Supported language listing

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    sandbox::{Language, LanguageProfile},
    state::AppState,
};

/// One supported language
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    pub id: Language,
    pub image: String,
    pub compiled: bool,
    pub source_file: String,
}

impl From<LanguageProfile> for LanguageResponse {
    fn from(profile: LanguageProfile) -> Self {
        Self {
            id: profile.language,
            compiled: profile.is_compiled(),
            image: profile.image,
            source_file: profile.source_file,
        }
    }
}

/// Languages response
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub default: Language,
    pub languages: Vec<LanguageResponse>,
}

async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let registry = state.sandbox().registry();

    Json(LanguagesResponse {
        default: Language::DEFAULT,
        languages: Language::ALL
            .into_iter()
            .map(|language| registry.profile(language).into())
            .collect(),
    })
}

/// Language routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/languages", get(list_languages))
}
