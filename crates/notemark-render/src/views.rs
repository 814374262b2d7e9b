use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::info;

use notemark_core::models::Note;

use crate::error::{RenderError, describe};

pub const PAGE_TEMPLATE: &str = "base.html";
pub const NOTE_LIST_TEMPLATE: &str = "_notelist.html";
pub const NOTE_DETAIL_TEMPLATE: &str = "_note_detail.html";

const REQUIRED_TEMPLATES: [&str; 3] = [PAGE_TEMPLATE, NOTE_LIST_TEMPLATE, NOTE_DETAIL_TEMPLATE];

/// Suggestions shown per issue in the detail view. Stored notes keep all of them.
pub const MAX_DISPLAYED_SUGGESTIONS: usize = 3;

/// The parsed template set. Parsed once at startup and shared read-only.
pub struct Views {
    tera: Tera,
}

#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    notes: &'a [Note],
}

impl Views {
    /// Templates compiled into the binary.
    pub fn builtin() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (PAGE_TEMPLATE, include_str!("../templates/base.html")),
            (NOTE_LIST_TEMPLATE, include_str!("../templates/_notelist.html")),
            (NOTE_DETAIL_TEMPLATE, include_str!("../templates/_note_detail.html")),
        ])
        .map_err(|e| RenderError::TemplateParse(describe(&e)))?;
        Self::checked(tera)
    }

    /// Every `*.html` file in `dir`. All three view templates must be present.
    pub fn from_dir(dir: &Path) -> Result<Self, RenderError> {
        let glob = dir.join("*.html");
        let tera = Tera::new(&glob.to_string_lossy())
            .map_err(|e| RenderError::TemplateParse(describe(&e)))?;
        let views = Self::checked(tera)?;
        info!(dir = %dir.display(), "templates loaded");
        Ok(views)
    }

    /// `dir` when given, otherwise the built-in set.
    pub fn load(dir: Option<&Path>) -> Result<Self, RenderError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    fn checked(tera: Tera) -> Result<Self, RenderError> {
        let names: Vec<&str> = tera.get_template_names().collect();
        for required in REQUIRED_TEMPLATES {
            if !names.contains(&required) {
                return Err(RenderError::TemplateNotFound(required.to_string()));
            }
        }
        Ok(Self { tera })
    }

    /// The full page: upload form plus the note list.
    pub fn page(&self, title: &str, notes: &[Note]) -> Result<String, RenderError> {
        let context = Context::from_serialize(PageData { title, notes })?;
        Ok(self.tera.render(PAGE_TEMPLATE, &context)?)
    }

    /// The list fragment swapped in after an upload or delete.
    pub fn note_list(&self, notes: &[Note]) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("notes", notes);
        Ok(self.tera.render(NOTE_LIST_TEMPLATE, &context)?)
    }

    pub fn note_detail(&self, note: &Note) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("note", note);
        context.insert("max_suggestions", &MAX_DISPLAYED_SUGGESTIONS);
        Ok(self.tera.render(NOTE_DETAIL_TEMPLATE, &context)?)
    }
}
