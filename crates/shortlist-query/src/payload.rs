use serde::Deserialize;
use serde_json::Value;

use shortlist_core::error::{Error, Result};
use shortlist_core::types::RawExtraction;

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    skills: Option<OneOrMany>,
    #[serde(default, alias = "required_categories", alias = "categories")]
    required_test_types: Option<OneOrMany>,
}

/// Models sometimes answer `"K"` where `["K"]` was asked for.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<Value>),
}

impl OneOrMany {
    fn into_strings(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        }
    }
}

/// Parse the service's text answer into a [`RawExtraction`].
///
/// Markdown fences and prose around the JSON object are ignored: the
/// outermost `{...}` span is what gets parsed.
pub fn parse_extraction(text: &str) -> Result<RawExtraction> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(Error::Extraction("no JSON object in response".to_string())),
    };
    let payload: Payload =
        serde_json::from_str(json).map_err(|e| Error::Extraction(format!("malformed extraction payload: {e}")))?;
    Ok(RawExtraction {
        skills: payload.skills.map(OneOrMany::into_strings),
        categories: payload.required_test_types.map(OneOrMany::into_strings),
    })
}
