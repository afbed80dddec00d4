//! HTML pages rendered with minijinja from templates embedded in the binary.

use minijinja::{context, Environment};

use crate::schemas::ConversionResult;

const INDEX_TEMPLATE: &str = "index.html";
const RESULT_TEMPLATE: &str = "result.html";

#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        env.add_template(RESULT_TEMPLATE, include_str!("../templates/result.html"))?;
        Ok(Self { env })
    }

    /// Landing page with the upload and URL forms.
    pub fn render_index(&self, extensions: &[String]) -> Result<String, minijinja::Error> {
        self.env
            .get_template(INDEX_TEMPLATE)?
            .render(context! { extensions => extensions })
    }

    /// Result page; `file` is only set for successful conversions.
    pub fn render_result(&self, result: &ConversionResult) -> Result<String, minijinja::Error> {
        self.env.get_template(RESULT_TEMPLATE)?.render(context! {
            success => result.success,
            message => &result.message,
            file => result.output_file_name(),
        })
    }
}
