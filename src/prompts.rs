use crate::{Error, Result};

pub const INPAINTING: &str = include_str!("../data/prompts/inpainting.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Wrap a user description in the inpainting instructions.
///
/// The rendered prompt ends exactly at the description.
pub fn inpainting(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::InvalidRequest(
            "Inpainting description must not be empty".to_string(),
        ));
    }
    Ok(render(INPAINTING.trim_end(), &[("prompt", description)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_inpainting_template_has_placeholder() {
        assert!(INPAINTING.contains("{{prompt}}"));
    }

    #[test]
    fn test_inpainting_wraps_description() {
        let prompt = inpainting("  replace the sky with fireworks ").unwrap();
        assert!(prompt.starts_with("[Instruction]"));
        assert!(prompt.contains("mask image"));
        assert!(prompt.ends_with("[User Description]\nreplace the sky with fireworks"));
        assert!(!prompt.contains("{{prompt}}"));
    }

    #[test]
    fn test_inpainting_rejects_blank_description() {
        assert!(matches!(inpainting(""), Err(Error::InvalidRequest(_))));
        assert!(matches!(inpainting(" \n\t "), Err(Error::InvalidRequest(_))));
    }
}
