use askama::Template;
use axum::response::Html;

use crate::content::{self, Guide};

#[derive(Template)]
#[template(path = "guide.html")]
pub struct GuideTemplate {
  pub guides: &'static [Guide],
}

/// CSF and PRE writing guides
pub async fn guide() -> Html<String> {
  super::render(&GuideTemplate {
    guides: content::guides(),
  })
}
