//! Demo configuration endpoints.
//!
//! `GET /config` reads three dynamic properties; `POST /config` writes new
//! values back to the source entity. Written values become visible to reads
//! after the next successful poll.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::registry::{ConfigRegistry, DynamicBooleanProperty, DynamicLongProperty, DynamicProperty, TypedValue};

/// The demo's accessor handles, created once at startup.
#[derive(Clone)]
pub struct DemoProperties {
    pub foo: DynamicProperty<Option<String>>,
    pub bar: DynamicLongProperty,
    pub baz: DynamicBooleanProperty,
}

impl DemoProperties {
    pub fn new(registry: &Arc<ConfigRegistry>) -> Self {
        Self {
            foo: registry.property("foo", None),
            bar: registry.long_property("foo.bar", 0),
            baz: registry.boolean_property("baz", false),
        }
    }

    /// Plain-text rendering served by `GET /config`.
    pub fn render(&self) -> String {
        format!(
            "foo = {}\nfoo.bar = {}\nbaz = {}\n",
            self.foo.get().as_deref().unwrap_or("null"),
            self.bar.get(),
            self.baz.get()
        )
    }
}

pub async fn get_config(State(state): State<AppState>) -> String {
    metrics::record_request("get_config", 200);
    state.properties.render()
}

pub async fn post_config(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let values = match parse_form(&params) {
        Ok(values) => values,
        Err(message) => {
            metrics::record_request("post_config", 400);
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    };

    match state.source.write_back(&values).await {
        Ok(identity) => {
            metrics::record_request("post_config", 200);
            (StatusCode::OK, format!("updated {}\n", identity)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to write configuration entity");
            metrics::record_request("post_config", 500);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn parse_form(params: &HashMap<String, String>) -> Result<Vec<(&'static str, TypedValue)>, String> {
    let foo = params
        .get("foo")
        .ok_or_else(|| "missing parameter 'foo'".to_string())?;
    let bar = params
        .get("foo.bar")
        .ok_or_else(|| "missing parameter 'foo.bar'".to_string())?
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid 'foo.bar': {}", e))?;
    let baz = params
        .get("baz")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(vec![
        ("foo", TypedValue::String(foo.clone())),
        ("foo.bar", TypedValue::Integer(bar)),
        ("baz", TypedValue::Boolean(baz)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_form() {
        let values = parse_form(&params(&[("foo", "bar"), ("foo.bar", " 7 "), ("baz", "TRUE")])).unwrap();
        assert_eq!(
            values,
            vec![
                ("foo", TypedValue::from("bar")),
                ("foo.bar", TypedValue::Integer(7)),
                ("baz", TypedValue::Boolean(true)),
            ]
        );
    }

    #[test]
    fn test_parse_form_rejects_bad_integer() {
        let err = parse_form(&params(&[("foo", "bar"), ("foo.bar", "seven")])).unwrap_err();
        assert!(err.contains("foo.bar"));
    }

    #[test]
    fn test_baz_defaults_false() {
        let values = parse_form(&params(&[("foo", "bar"), ("foo.bar", "1"), ("baz", "yes")])).unwrap();
        assert_eq!(values[2], ("baz", TypedValue::Boolean(false)));
    }

    #[test]
    fn test_render_defaults() {
        let registry = Arc::new(ConfigRegistry::new());
        let props = DemoProperties::new(&registry);
        assert_eq!(props.render(), "foo = null\nfoo.bar = 0\nbaz = false\n");
    }
}
