//! Handlebars-backed renderer.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::discovery::Endpoint;
use crate::render::{ConfigDocument, ConfigRenderer, RenderError};

const TEMPLATE_NAME: &str = "proxy-config";

/// Renders a template compiled once from disk.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

#[derive(Serialize)]
struct RenderContext<'a> {
    endpoints: Vec<EndpointContext<'a>>,
}

#[derive(Serialize)]
struct EndpointContext<'a> {
    #[serde(flatten)]
    endpoint: &'a Endpoint,
    host_port: String,
}

impl TemplateRenderer {
    /// Read and compile the template at `path`.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let renderer = Self::from_source(&source).map_err(|e| match e {
            RenderError::Parse { source, .. } => RenderError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(path = %path.display(), "Template loaded");
        Ok(renderer)
    }

    /// Compile a template from an in-memory string.
    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| RenderError::Parse {
                path: "<inline>".into(),
                source: Box::new(e),
            })?;
        Ok(Self { hbs })
    }
}

impl ConfigRenderer for TemplateRenderer {
    fn render(&self, endpoints: &[Endpoint]) -> Result<ConfigDocument, RenderError> {
        let context = RenderContext {
            endpoints: endpoints
                .iter()
                .map(|endpoint| EndpointContext {
                    endpoint,
                    host_port: endpoint.to_string(),
                })
                .collect(),
        };
        let text = self.hbs.render(TEMPLATE_NAME, &context)?;
        Ok(ConfigDocument::from(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::canonicalize;
    use std::net::SocketAddr;

    const TWEMPROXY: &str = "pool:\n  servers:\n{{#each endpoints}}    - {{host_port}}:1\n{{/each}}";

    fn ep(s: &str) -> Endpoint {
        s.parse::<SocketAddr>().unwrap().into()
    }

    #[test]
    fn test_renders_each_endpoint() {
        let renderer = TemplateRenderer::from_source(TWEMPROXY).unwrap();
        let doc = renderer.render(&[ep("10.0.0.5:11211")]).unwrap();
        assert_eq!(doc.as_str(), "pool:\n  servers:\n    - 10.0.0.5:11211:1\n");
    }

    #[test]
    fn test_fields_are_exposed() {
        let renderer =
            TemplateRenderer::from_source("{{#each endpoints}}{{address}} {{port}};{{/each}}").unwrap();
        let doc = renderer.render(&[ep("10.0.0.1:1"), ep("10.0.0.2:2")]).unwrap();
        assert_eq!(doc.as_str(), "10.0.0.1 1;10.0.0.2 2;");
    }

    #[test]
    fn test_order_insensitive_after_canonicalize() {
        let renderer = TemplateRenderer::from_source(TWEMPROXY).unwrap();
        let a = renderer
            .render(&canonicalize(vec![ep("10.0.0.1:11211"), ep("10.0.0.2:11211")]))
            .unwrap();
        let b = renderer
            .render(&canonicalize(vec![ep("10.0.0.2:11211"), ep("10.0.0.1:11211")]))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = TemplateRenderer::from_source("{{#each endpoints}}<{{host_port}}>{{/each}}").unwrap();
        let doc = renderer.render(&[ep("[fd00::1]:80")]).unwrap();
        assert_eq!(doc.as_str(), "<[fd00::1]:80>");
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        assert!(matches!(
            TemplateRenderer::from_source("{{#each endpoints}}"),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_unknown_field_fails_in_strict_mode() {
        let renderer = TemplateRenderer::from_source("{{#each endpoints}}{{weight}}{{/each}}").unwrap();
        assert!(matches!(renderer.render(&[ep("10.0.0.1:1")]), Err(RenderError::Render(_))));
    }

    #[test]
    fn test_missing_template_file() {
        let err = TemplateRenderer::from_file(Path::new("/nonexistent/template.yaml"));
        assert!(matches!(err, Err(RenderError::Read { .. })));
    }
}
