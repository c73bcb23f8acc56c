//! HTML report rendering from the bundled report template.
//!
//! The template is looked up through the on-disk data root (`reports/` plus an
//! ordinary path join), the same way downstream consumers reach it.

use std::fs;

use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;

use crate::data;
use crate::error::AppError;

/// A named block of report content.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub name: String,
    pub body: String,
}

impl Section {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self { name: name.into(), body: body.into() }
    }
}

/// Render the bundled report template with the given title and sections.
pub fn render(title: &str, sections: &[Section]) -> Result<String, AppError> {
    let template_path = data::load("reports")?.join("report.tpl");
    let template_src = fs::read_to_string(&template_path)?;

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("report.tpl", &template_src)?;

    let rendered = env.get_template("report.tpl")?.render(context! { title, sections })?;
    Ok(rendered)
}
