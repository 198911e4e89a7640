use meshview_common::ShaderVariant;

/// The single user-tunable float forwarded to the active fragment shader.
///
/// Any value is accepted, including `NaN`; the shader decides what it means.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParameter {
    variant: ShaderVariant,
    value: f32,
    label: String,
}

impl EffectParameter {
    pub fn new(variant: ShaderVariant, initial: f32) -> Self {
        let mut effect = Self {
            variant,
            value: initial,
            label: String::new(),
        };
        effect.set(initial);
        effect
    }

    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.label = format!("{}: {:.2}", self.variant.effect().caption, value);
    }

    /// Parse raw slider/text input. Empty input means `0.0`. Anything that
    /// is not a decimal number becomes `NaN` and is still stored; that
    /// includes spelled-out `inf` and `nan`, which `f32` parsing would
    /// otherwise accept. Exactly `Infinity`, optionally signed, is kept as an
    /// infinity; the label then renders it as `inf`.
    pub fn set_from_input(&mut self, raw: &str) {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            0.0
        } else {
            parse_number(trimmed).unwrap_or_else(|| {
                tracing::warn!(input = raw, "effect value is not a number, forwarding NaN");
                f32::NAN
            })
        };
        self.set(value);
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Caption plus value, e.g. `Tile Size: 0.50`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn caption(&self) -> &'static str {
        self.variant.effect().caption
    }

    pub fn variant(&self) -> ShaderVariant {
        self.variant
    }
}

fn parse_number(text: &str) -> Option<f32> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return text.parse().ok();
    }
    if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        text.parse().ok()
    } else {
        None
    }
}
