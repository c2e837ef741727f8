use shortlist_core::category::CategorySet;

/// Extraction prompt listing the configured categories.
pub fn build_prompt(query: &str, categories: &CategorySet) -> String {
    let mut types = String::new();
    for c in categories.iter() {
        types.push_str(&format!("   - '{}' for {}", c.code, c.label));
        if !c.hint.is_empty() {
            types.push_str(&format!(" ({})", c.hint));
        }
        types.push_str(".\n");
    }
    let codes: Vec<String> = categories.iter().map(|c| format!("\"{}\"", c.code)).collect();
    let quoted = serde_json::to_string(query).unwrap_or_else(|_| format!("\"{query}\""));

    format!(
        "You are a data extraction assistant for an assessment catalogue.\n\
         Analyze the following user query to determine:\n\
         1. Key skills or topics mentioned (e.g. \"Java\", \"Sales\", \"Communication\").\n\
         2. The type of tests required based on the intent:\n\
         {types}   - If unsure or several are implied, include all that apply.\n\n\
         Query: {quoted}\n\n\
         Return ONLY a valid JSON object with the following schema:\n\
         {{\"skills\": [\"string\"], \"required_test_types\": [{}]}}\n\
         Do not wrap the JSON in markdown.\n",
        codes.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_every_category_and_quotes_the_query() {
        let prompt = build_prompt("Java dev \"senior\"", &CategorySet::default());
        assert!(prompt.contains("'K' for Knowledge & Skills"));
        assert!(prompt.contains("'P' for Personality & Behavior"));
        assert!(prompt.contains(r#"Query: "Java dev \"senior\"""#));
        assert!(prompt.contains(r#""required_test_types": ["K", "P"]"#));
    }
}
