//! Template engine for backend query expressions
//!
//! Templates are compiled once at provider construction; a parse failure
//! aborts start. Rendering is pure: the same variable bag always yields the
//! same query string.

use chrono::Utc;
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::PlaneError;
use crate::models::{Query, TemplateVars};

/// Render context a template sees. `averaging` implements the selection
/// policy: windows above 120 seconds prefer the averaging form.
#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    avg_seconds: i32,
    metric_name: &'a str,
    stat_name: &'a str,
    averaging: bool,
}

/// Averaging windows at or below this many seconds use the instantaneous
/// template form.
const AVERAGING_THRESHOLD_SECONDS: i32 = 120;

impl<'a> TemplateContext<'a> {
    fn new(vars: &'a TemplateVars) -> Self {
        TemplateContext {
            avg_seconds: vars.avg_seconds,
            metric_name: &vars.metric_name,
            stat_name: &vars.stat_name,
            averaging: vars.avg_seconds > AVERAGING_THRESHOLD_SECONDS,
        }
    }
}

/// A compiled, named map of query templates.
#[derive(Debug)]
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    /// Compile the given (name, template) pairs. Any parse failure is
    /// surfaced as Internal and must abort provider construction.
    pub fn new(templates: &[(&str, &str)]) -> Result<Self, PlaneError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        for (name, template) in templates {
            registry
                .register_template_string(name, template)
                .map_err(|e| {
                    PlaneError::internal(format!("cannot compile template {}: {}", name, e))
                })?;
        }
        Ok(TemplateEngine { registry })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render the named template to an instant query evaluated now.
    pub fn get_template_query(
        &self,
        name: &str,
        vars: &TemplateVars,
    ) -> Result<Query, PlaneError> {
        if !self.registry.has_template(name) {
            return Err(PlaneError::not_found(format!("template {}", name)));
        }
        let rendered = self
            .registry
            .render(name, &TemplateContext::new(vars))
            .map_err(|e| {
                PlaneError::internal(format!("cannot render template {}: {}", name, e))
            })?;
        Ok(Query::instant(rendered, Utc::now()))
    }
}
