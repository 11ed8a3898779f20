/// A named, fixed set of transform parameters selected by the caller.
///
/// `Original` is a pass-through: the result is a byte-for-byte copy of the
/// input and no external call is made. The remaining presets carry the
/// external-model parameters for one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Original,
    Monet,
    VanGogh,
    Ukiyoe,
    Cezanne,
}

/// External-model input parameters for a stylization preset.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetParams {
    pub style_weights: &'static str,
    pub scale: f32,
    pub prompt: &'static str,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Original,
        Preset::Monet,
        Preset::VanGogh,
        Preset::Ukiyoe,
        Preset::Cezanne,
    ];

    /// Resolves a user-supplied name, case-insensitively. Single-letter
    /// codes are accepted as shorthand.
    pub fn resolve(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "original" | "o" => Some(Preset::Original),
            "monet" | "m" => Some(Preset::Monet),
            "vangogh" | "van gogh" | "v" => Some(Preset::VanGogh),
            "ukiyoe" | "ukiyo-e" | "u" => Some(Preset::Ukiyoe),
            "cezanne" | "c" => Some(Preset::Cezanne),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Original => "Original",
            Preset::Monet => "Monet",
            Preset::VanGogh => "VanGogh",
            Preset::Ukiyoe => "Ukiyoe",
            Preset::Cezanne => "Cezanne",
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Preset::Original)
    }

    /// `None` for pass-through presets.
    pub fn params(&self) -> Option<PresetParams> {
        match self {
            Preset::Original => None,
            Preset::Monet => Some(PresetParams {
                style_weights: "style_monet",
                scale: 1.0,
                prompt: "impressionist oil painting in the style of Claude Monet, soft light, visible brushstrokes",
            }),
            Preset::VanGogh => Some(PresetParams {
                style_weights: "style_vangogh",
                scale: 1.0,
                prompt: "post-impressionist painting in the style of Vincent van Gogh, swirling brushwork, bold color",
            }),
            Preset::Ukiyoe => Some(PresetParams {
                style_weights: "style_ukiyoe",
                scale: 0.8,
                prompt: "japanese ukiyo-e woodblock print, flat color planes, strong outlines",
            }),
            Preset::Cezanne => Some(PresetParams {
                style_weights: "style_cezanne",
                scale: 1.0,
                prompt: "painting in the style of Paul Cezanne, constructive brushstrokes, muted palette",
            }),
        }
    }

    pub fn allowed_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.name()).collect()
    }
}
