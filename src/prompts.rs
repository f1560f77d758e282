pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that translates English to Turkish.";

const DESCRIPTION_SLOT: &str = "{description}";

const PROMPT_TEMPLATE: &str = r#"Translate the following English product description to Turkish. Format the translation in HTML as follows:

<div>
  <h3><b>Ürün Açıklaması:</b></h3>
  <p>[Translated general description here. Provide a natural and easy-to-read translation.]</p>
</div>

<div>
  <h3><b>Ürün Özellikleri:</b></h3>
  <ul>
    <li>[Feature 1]</li>
    <li>[Feature 2]</li>
    <!-- Add more bullet points as needed -->
  </ul>
</div>

<div>
  <h3><b>Kompozisyon:</b></h3>
  <p>[Translated composition here. Keep to composition clean and concise.]</p>
</div>

Only include a section if the corresponding information exists in the input. Ensure the translation is contextually accurate and easy to understand.
Only include the content inside HTML tags. Do not add any additional tags like "```html" at the beginning or "```" at the end.

Input:
{description}

Output:
"#;

/// Inserts the raw description into the template. Nothing is escaped.
pub fn build_prompt(description: &str) -> String {
    PROMPT_TEMPLATE.replacen(DESCRIPTION_SLOT, description, 1)
}
