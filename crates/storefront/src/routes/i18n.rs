//! Translation routes.

use axum::{Json, extract::Path};
use lemanshop_core::Language;

use crate::i18n::{self, EmailTranslations};

/// Email translation constants. Unknown languages get French.
pub async fn email_translations(Path(lang): Path<String>) -> Json<&'static EmailTranslations> {
    Json(i18n::email_translations(Language::from_tag_or_default(Some(&lang))))
}
