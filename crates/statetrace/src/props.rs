use std::fmt;

use facet::Facet;

const UNRENDERABLE: &str = "<unrenderable props>";

/// Caller-supplied diagnostic data attached to an active state.
///
/// The registry never inspects it; it only ends up in rendered snapshots.
#[derive(Clone, Default)]
pub enum Props {
    /// No properties were given.
    #[default]
    None,
    /// Pre-formatted text, rendered verbatim.
    Text(String),
    /// Structured record, rendered as pretty JSON.
    Value(facet_value::Value),
}

impl Props {
    /// Converts any facet-reflectable value into structured props.
    ///
    /// Never fails: a value that cannot be converted degrades to a text marker.
    pub fn from_facet<M>(meta: &M) -> Self
    where
        M: for<'facet> Facet<'facet>,
    {
        match facet_value::to_value(meta) {
            Ok(value) => Props::Value(value),
            Err(err) => {
                tracing::warn!(error = %err, "props conversion failed");
                Props::Text(format!("<props conversion failed: {err}>"))
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Props::None)
    }

    /// Human-readable form of the props.
    pub fn render(&self) -> String {
        match self {
            Props::None => "<none>".to_string(),
            Props::Text(text) => text.clone(),
            Props::Value(value) => render_value(value),
        }
    }
}

fn render_value(value: &facet_value::Value) -> String {
    // Bare strings print without JSON quoting.
    if let Ok(compact) = facet_json::to_string(value)
        && compact.starts_with('"')
        && let Ok(text) = facet_json::from_str::<String>(&compact)
    {
        return text;
    }

    facet_json::to_string_pretty(value).unwrap_or_else(|_| UNRENDERABLE.to_string())
}

impl fmt::Display for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Props::None => f.write_str("None"),
            Props::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Props::Value(_) => f.debug_tuple("Value").field(&self.render()).finish(),
        }
    }
}

impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::None
    }
}

impl From<&str> for Props {
    fn from(text: &str) -> Self {
        Props::Text(text.to_string())
    }
}

impl From<String> for Props {
    fn from(text: String) -> Self {
        Props::Text(text)
    }
}

impl From<facet_value::Value> for Props {
    fn from(value: facet_value::Value) -> Self {
        Props::Value(value)
    }
}

impl<T: Into<Props>> From<Option<T>> for Props {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
