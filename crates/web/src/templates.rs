//! Page rendering.

use std::sync::Arc;

use axum::response::Html;
use marquee_common::AppResult;
use tera::{Context, Tera};

use crate::flash::FlashMessage;

/// Templates compiled into the binary, by name.
const PAGES: [(&str, &str); 7] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("show.html", include_str!("../templates/show.html")),
    ("edit_review.html", include_str!("../templates/edit_review.html")),
    ("hidden_list.html", include_str!("../templates/hidden_list.html")),
    ("petitions_list.html", include_str!("../templates/petitions_list.html")),
    ("edit_petition.html", include_str!("../templates/edit_petition.html")),
];

/// Shared template registry.
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    /// Parse every page template.
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(PAGES)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render a page.
    ///
    /// Every page gets `title`, `viewer` (username or none) and the pending
    /// flash `messages` in addition to its own context.
    pub fn render(
        &self,
        name: &str,
        title: &str,
        viewer: Option<&str>,
        messages: &[FlashMessage],
        mut context: Context,
    ) -> AppResult<Html<String>> {
        context.insert("title", title);
        context.insert("viewer", &viewer);
        context.insert("messages", messages);

        let html = self.tera.render(name, &context)?;
        Ok(Html(html))
    }
}
