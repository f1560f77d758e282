pub const API_KEY_PREFIX: &str = "sk-proj-";
pub const API_KEY_MAX_LEN: usize = 300;

/// Shape check only; the key is never sent anywhere to confirm it works.
pub fn is_valid_api_key(api_key: &str) -> bool {
    let api_key = api_key.trim();
    api_key.starts_with(API_KEY_PREFIX) && api_key.len() <= API_KEY_MAX_LEN
}
