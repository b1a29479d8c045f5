use crate::config::NamingConfig;
use crate::structure::Layer;

/// Name used when sanitizing leaves nothing.
pub const FALLBACK_TYPE_NAME: &str = "Layer type";

const INVALID_CHARS: &[char] = &[
    ':', ';', '{', '}', '[', ']', '|', '\\', '/', '<', '>', '?', '*', '"',
];

fn is_invalid(c: char) -> bool {
    c.is_control() || INVALID_CHARS.contains(&c)
}

/// Replaces characters that are illegal in a type name and trims the result.
#[must_use]
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if is_invalid(c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_owned()
}

fn truncate_chars(value: &str, max_len: usize) -> &str {
    match value.char_indices().nth(max_len) {
        Some((byte, _)) => &value[..byte],
        None => value,
    }
}

/// Produces a legal type name of at most `max_len` characters.
///
/// Illegal characters become `_`, whitespace runs collapse to a single
/// space, and an empty result falls back to [`FALLBACK_TYPE_NAME`].
#[must_use]
pub fn make_valid_type_name(raw: &str, max_len: usize) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if is_invalid(c) { '_' } else { c })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated = truncate_chars(&collapsed, max_len).trim_end();
    if truncated.is_empty() {
        truncate_chars(FALLBACK_TYPE_NAME, max_len).to_owned()
    } else {
        truncated.to_owned()
    }
}

/// Key under which type names are compared.
#[must_use]
pub fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builds the deterministic name of the single-layer type for layer `index`.
///
/// Components: base type name (cut to `max_base_len`), ordinal label,
/// function, material, and the width in display units, joined by `" - "`.
#[must_use]
pub fn layer_type_name(
    base_name: &str,
    layer: &Layer,
    index: usize,
    material_name: Option<&str>,
    naming: &NamingConfig,
) -> String {
    let material = material_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&naming.no_material_label);
    let width = format!(
        "{:.*}{}",
        naming.display_precision,
        layer.width * naming.display_scale,
        naming.display_suffix
    );
    let base = sanitize_component(base_name);
    let components = [
        truncate_chars(&base, naming.max_base_len).trim_end().to_owned(),
        format!("{} {}", naming.layer_label, index + 1),
        sanitize_component(layer.function.display_name()),
        sanitize_component(material),
        width,
    ];
    let raw = components
        .iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" - ");
    make_valid_type_name(&raw, naming.max_name_len)
}

/// Name tried on duplication attempt `attempt` (1-based).
///
/// The first attempt uses `base` as is; later ones append ` (n)` while
/// staying within `max_len` characters.
#[must_use]
pub fn candidate_name(base: &str, attempt: usize, max_len: usize) -> String {
    if attempt <= 1 {
        return make_valid_type_name(base, max_len);
    }
    let suffix = format!(" ({attempt})");
    let room = max_len.saturating_sub(suffix.chars().count()).max(1);
    let trimmed = truncate_chars(base, room).trim_end();
    let stem = if trimmed.is_empty() {
        truncate_chars(base, room)
    } else {
        trimmed
    };
    make_valid_type_name(&format!("{stem}{suffix}"), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::LayerFunction;

    #[test]
    fn sanitizes_illegal_characters() {
        assert_eq!(sanitize_component(" Brick: 2/3 "), "Brick_ 2_3");
        assert_eq!(make_valid_type_name("a  b <c>", 60), "a b _c_");
        assert_eq!(make_valid_type_name("a\tb\n", 60), "a_b_");
    }

    #[test]
    fn empty_names_fall_back() {
        assert_eq!(make_valid_type_name("   ", 60), FALLBACK_TYPE_NAME);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let name = make_valid_type_name("Стена наружная", 5);
        assert_eq!(name, "Стена");
    }

    #[test]
    fn builds_layer_name() {
        let naming = NamingConfig::default();
        let layer = Layer::new(0.5, LayerFunction::Structure, None);
        let name = layer_type_name("Ext Wall", &layer, 2, Some("Concrete"), &naming);
        assert_eq!(name, "Ext Wall - Layer 3 - Structure - Concrete - 152mm");
    }

    #[test]
    fn long_base_names_are_cut() {
        let naming = NamingConfig {
            max_base_len: 4,
            ..NamingConfig::default()
        };
        let layer = Layer::new(0.5, LayerFunction::Structure, None);
        let name = layer_type_name("Exterior Wall", &layer, 0, Some("Brick"), &naming);
        assert_eq!(name, "Exte - Layer 1 - Structure - Brick - 152mm");
    }

    #[test]
    fn missing_material_uses_label() {
        let naming = NamingConfig::default();
        let layer = Layer::new(0.05, LayerFunction::Finish1, None);
        let name = layer_type_name("W", &layer, 0, None, &naming);
        assert_eq!(name, "W - Layer 1 - Finish 1 - No material - 15mm");
    }

    #[test]
    fn candidate_names_carry_suffix_within_limit() {
        assert_eq!(candidate_name("Wall", 1, 200), "Wall");
        assert_eq!(candidate_name("Wall", 3, 200), "Wall (3)");
        let long = "x".repeat(30);
        let name = candidate_name(&long, 12, 20);
        assert_eq!(name.chars().count(), 20);
        assert!(name.ends_with(" (12)"));
    }
}
