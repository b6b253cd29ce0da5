//! # Extraction Prompt
//!
//! The fixed instruction sent with every image. The prompt spells out the
//! poem/non-poem decision rule and the exact JSON shape for each branch
//! because free-text instructions without a schema produce inconsistent key
//! names and nesting from the model. The canonical schema is defined by the
//! types in `crate::types`; this text only steers the model towards it, and
//! the reply is never trusted without a full normalization pass.

/// The instruction sent alongside the image on every extraction request.
pub const EXTRACTION_PROMPT: &str = r#"Analyze the text in this image. Perform the following steps:

1. Extract all text from the image exactly as it appears (OCR).
2. Identify the language of the text.
3. Decide whether the text is a poem: does it exhibit verse structure, such as stanzas, deliberate line breaks, or meter?

If the text IS a poem, respond with a JSON object in exactly this shape:
{
  "language": "<detected language>",
  "isPoem": true,
  "content": [
    {
      "original": "<stanza text, preserving line breaks>",
      "transliteration": "<romanized form; include only for non-Latin scripts>",
      "translation": "<English translation of the stanza>"
    }
  ]
}
Split the poem into stanzas in reading order, one object per stanza.

If the text is NOT a poem, respond with a JSON object in exactly this shape:
{
  "language": "<detected language>",
  "isPoem": false,
  "content": "<the extracted text>",
  "translation": "<English translation>"
}
If the text is already in English, omit the "translation" field.

Respond with the raw JSON object only. Do not wrap it in markdown code fences and do not add any commentary before or after it."#;
