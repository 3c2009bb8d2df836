/*!
 * Prompt construction and response decoding for translation calls.
 *
 * Single-item calls send the source text as the user message and expect the
 * bare translation back. Batch calls send a JSON array of `{key, text}`
 * objects and expect the same shape back, optionally wrapped in a markdown
 * code fence.
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;
use crate::providers::{BatchItem, TranslationResult};

/// Parameter placeholders that must survive translation verbatim:
/// `{{name}}`, `{name}`, `:name`, `%s`, `%d`, `%1$s`
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*\w+\s*\}\}|\{\w+\}|:[A-Za-z_]\w*|%(?:\d+\$)?[sd]")
        .expect("placeholder regex is valid")
});

/// Placeholders found in a text, in order of first appearance
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Placeholders present in `source` but absent from `translated`
pub fn missing_placeholders(source: &str, translated: &str) -> Vec<String> {
    extract_placeholders(source)
        .into_iter()
        .filter(|p| !translated.contains(p.as_str()))
        .collect()
}

/// System message for a single-item translation
pub fn single_system_prompt(target_language: &str, source_text: &str) -> String {
    let mut prompt = format!(
        "You are a professional software localization translator. \
         Translate the user's message into {}. \
         Keep every parameter placeholder exactly as written and do not translate it. \
         Preserve punctuation, capitalization style and surrounding whitespace. \
         Reply with the translated text only, without quotes, notes or explanations.",
        target_language
    );

    let placeholders = extract_placeholders(source_text);
    if !placeholders.is_empty() {
        prompt.push_str(&format!(
            " The text contains these placeholders, which must appear unchanged in your reply: {}.",
            placeholders.join(", ")
        ));
    }

    prompt
}

/// System message for a batch translation
pub fn batch_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional software localization translator. \
         The user sends a JSON array of objects with \"key\" and \"text\" fields. \
         Translate every \"text\" value into {}. \
         Never change the \"key\" values. \
         Keep every parameter placeholder such as {{name}}, {{{{name}}}}, :name or %s exactly as written. \
         Reply with a JSON array of objects with the same \"key\" and the translated \"text\", \
         and nothing else.",
        target_language
    )
}

/// Encode batch items as the user message payload
pub fn encode_batch_payload(items: &[BatchItem]) -> Result<String, ProviderError> {
    serde_json::to_string(items)
        .map_err(|e| ProviderError::ResponseMalformed(format!("failed to encode batch payload: {}", e)))
}

/// Remove one surrounding markdown code fence, with or without a language tag
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the info string (e.g. `json`) up to the first newline, or up to
    // the payload itself on a one-line reply
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Decode a batch response into a result restricted to the requested keys
///
/// The content must be a JSON array of objects with string `key` and `text`
/// fields. Any other shape is `ResponseMalformed`. The first occurrence of a
/// duplicated key wins.
pub fn decode_batch_response(
    content: &str,
    requested: &[BatchItem],
) -> Result<TranslationResult, ProviderError> {
    let json = strip_code_fence(content);

    let items: Vec<BatchItem> = serde_json::from_str(json).map_err(|e| {
        ProviderError::ResponseMalformed(format!("batch response is not a list of {{key, text}} objects: {}", e))
    })?;

    let requested_keys: HashSet<&str> = requested.iter().map(|i| i.key.as_str()).collect();
    let mut result = TranslationResult::new();

    for item in items {
        if !requested_keys.contains(item.key.as_str()) {
            log::debug!("Dropping unrequested key '{}' from batch response", item.key);
            continue;
        }
        result.entry(item.key).or_insert(item.text);
    }

    Ok(result)
}
