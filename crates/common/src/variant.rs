use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fragment-stage visual effect. Each variant exposes one tunable float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShaderVariant {
    GreenShift,
    Wavy,
    Cross,
    #[default]
    Noisy,
}

/// Everything that differs between shader variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    /// File name of the fragment shader when loading from a shader directory.
    pub fragment_file: &'static str,
    /// Name of the effect field in the fragment shader's uniform block.
    pub uniform_name: &'static str,
    /// UI caption for the slider.
    pub caption: &'static str,
}

const EFFECTS: [(ShaderVariant, EffectSpec); 4] = [
    (
        ShaderVariant::GreenShift,
        EffectSpec {
            fragment_file: "greenshift.wgsl",
            uniform_name: "green_shift",
            caption: "Green Shift",
        },
    ),
    (
        ShaderVariant::Wavy,
        EffectSpec {
            fragment_file: "wavy.wgsl",
            uniform_name: "wave_size",
            caption: "Wave Size",
        },
    ),
    (
        ShaderVariant::Cross,
        EffectSpec {
            fragment_file: "cross.wgsl",
            uniform_name: "cross_intensity",
            caption: "Cross Intensity",
        },
    ),
    (
        ShaderVariant::Noisy,
        EffectSpec {
            fragment_file: "noisy.wgsl",
            uniform_name: "tile_size",
            caption: "Tile Size",
        },
    ),
];

impl ShaderVariant {
    pub const ALL: [ShaderVariant; 4] = [
        ShaderVariant::GreenShift,
        ShaderVariant::Wavy,
        ShaderVariant::Cross,
        ShaderVariant::Noisy,
    ];

    /// Look up the fragment file, uniform name and caption for this variant.
    pub fn effect(self) -> EffectSpec {
        EFFECTS[self as usize].1
    }

    /// Stable kebab-case name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ShaderVariant::GreenShift => "green-shift",
            ShaderVariant::Wavy => "wavy",
            ShaderVariant::Cross => "cross",
            ShaderVariant::Noisy => "noisy",
        }
    }
}

impl fmt::Display for ShaderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown shader variant `{0}` (expected green-shift, wavy, cross or noisy)")]
pub struct UnknownVariant(pub String);

impl FromStr for ShaderVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ShaderVariant::ALL
            .into_iter()
            .find(|v| v.name() == normalized || v.name().replace('-', "") == normalized)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (i, (variant, _)) in EFFECTS.iter().enumerate() {
            assert_eq!(*variant as usize, i);
        }
    }

    #[test]
    fn each_variant_has_distinct_uniform_and_caption() {
        let specs: Vec<EffectSpec> = ShaderVariant::ALL.iter().map(|v| v.effect()).collect();
        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                assert_ne!(a.uniform_name, b.uniform_name);
                assert_ne!(a.caption, b.caption);
                assert_ne!(a.fragment_file, b.fragment_file);
            }
        }
    }

    #[test]
    fn noisy_is_default() {
        assert_eq!(ShaderVariant::default(), ShaderVariant::Noisy);
        assert_eq!(ShaderVariant::Noisy.effect().caption, "Tile Size");
        assert_eq!(ShaderVariant::GreenShift.effect().uniform_name, "green_shift");
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("green-shift".parse::<ShaderVariant>().unwrap(), ShaderVariant::GreenShift);
        assert_eq!("GREEN_SHIFT".parse::<ShaderVariant>().unwrap(), ShaderVariant::GreenShift);
        assert_eq!("greenshift".parse::<ShaderVariant>().unwrap(), ShaderVariant::GreenShift);
        assert_eq!(" Wavy ".parse::<ShaderVariant>().unwrap(), ShaderVariant::Wavy);
        assert!("plasma".parse::<ShaderVariant>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for v in ShaderVariant::ALL {
            assert_eq!(v.to_string().parse::<ShaderVariant>().unwrap(), v);
        }
    }
}
