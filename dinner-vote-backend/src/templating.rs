use handlebars::{handlebars_helper, Handlebars};

use crate::error::AppError;

pub const INDEX: &str = "index";

// width of a result bar, in percent of the leading option
handlebars_helper!(percent: |count: u64, max: u64| if max == 0 { 0 } else { count * 100 / max });

/// Compiles every page once, at startup.
pub fn registry() -> Result<Handlebars<'static>, AppError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_helper("percent", Box::new(percent));
    handlebars.register_template_string(INDEX, include_str!("../templates/index.hbs"))?;
    Ok(handlebars)
}
