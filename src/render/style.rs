use serde::{Deserialize, Serialize};

/// Caller-selected visual state of an audio strip.
///
/// Each style has its own palette and bitmap cache; derived spectrum data is shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioRenderingStyle {
    /// Regular audio outside any line.
    #[default]
    Normal,
    /// Audio belonging to lines other than the active one.
    Inactive,
    /// Audio of the active line.
    Active,
    /// Audio inside the current selection.
    Selected,
}

impl AudioRenderingStyle {
    /// Every style, in cache order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Inactive, Self::Active, Self::Selected];

    /// Number of styles.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this style in per-style tables.
    pub fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Inactive => 1,
            Self::Active => 2,
            Self::Selected => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (position, style) in AudioRenderingStyle::ALL.iter().enumerate() {
            assert_eq!(style.index(), position);
        }
    }
}
