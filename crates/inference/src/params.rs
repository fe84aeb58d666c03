//! Default generation parameters and per-field overrides

use crate::types::Parameters;
use serde_json::json;

/// Defaults applied to every text generation call
pub fn text_generation_defaults() -> Parameters {
    let mut params = Parameters::new();
    params.insert("max_new_tokens".into(), json!(512));
    params.insert("temperature".into(), json!(0.7));
    params.insert("top_p".into(), json!(0.95));
    params.insert("return_full_text".into(), json!(false));
    params
}

/// Defaults applied to every image generation call
pub fn text_to_image_defaults() -> Parameters {
    let mut params = Parameters::new();
    params.insert(
        "negative_prompt".into(),
        json!("blurry, bad quality, distorted"),
    );
    params.insert("num_inference_steps".into(), json!(50));
    params.insert("guidance_scale".into(), json!(7.5));
    params
}

/// Overlay `overrides` onto `defaults` key by key.
///
/// Keys present in `overrides` replace the default value; every other
/// default is kept.
pub fn merge_parameters(defaults: Parameters, overrides: Option<&Parameters>) -> Parameters {
    let mut merged = defaults;
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
