use serde::{Deserialize, Serialize};

/// Semantic group of a renovation measure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
pub enum MeasureGroup {
    /// Top floor slab or roof
    #[display("Oberste Decke")]
    #[serde(rename = "Oberste Decke")]
    ObersteDecke,
    /// Basement ceiling or ground slab
    #[display("Unterste Decke")]
    #[serde(rename = "Unterste Decke")]
    UntersteDecke,
    #[display("Fenster")]
    Fenster,
    /// Exterior wall
    #[display("AW")]
    #[serde(rename = "AW")]
    Aw,
    #[display("Sonstige")]
    Sonstige,
}

/// Classification rules in priority order.
///
/// A measure belongs to the group of the first rule with any needle contained
/// in its description. Matching is case-sensitive.
pub const CLASSIFICATION_RULES: &[(&[&str], MeasureGroup)] = &[
    (&["oberste Decke", "Dachaufbau"], MeasureGroup::ObersteDecke),
    (&["unterste Decke"], MeasureGroup::UntersteDecke),
    (&["Fenstertausch"], MeasureGroup::Fenster),
    (&["AW Sanierung", "Fassade"], MeasureGroup::Aw),
];

impl MeasureGroup {
    pub const ALL: [Self; 5] = [
        Self::ObersteDecke,
        Self::UntersteDecke,
        Self::Fenster,
        Self::Aw,
        Self::Sonstige,
    ];

    /// Classifies a measure description, falling back to [`MeasureGroup::Sonstige`].
    ///
    /// # Examples
    ///
    /// ```
    /// use retrofit_core::MeasureGroup;
    ///
    /// assert_eq!(MeasureGroup::classify("AW Sanierung Vollwärmeschutz"), MeasureGroup::Aw);
    /// assert_eq!(MeasureGroup::classify("Heizungstausch"), MeasureGroup::Sonstige);
    /// ```
    #[must_use]
    pub fn classify(description: &str) -> Self {
        CLASSIFICATION_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| description.contains(n)))
            .map_or(Self::Sonstige, |&(_, group)| group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(MeasureGroup::classify("Fenstertausch 3-fach"), MeasureGroup::Fenster);
        assert_eq!(
            MeasureGroup::classify("AW Sanierung Vollwärmeschutz"),
            MeasureGroup::Aw
        );
        assert_eq!(MeasureGroup::classify("Neue Heizung"), MeasureGroup::Sonstige);
        assert_eq!(MeasureGroup::classify(""), MeasureGroup::Sonstige);
    }

    #[test]
    fn test_classify_all_needles() {
        assert_eq!(
            MeasureGroup::classify("Dämmung oberste Decke 20cm"),
            MeasureGroup::ObersteDecke
        );
        assert_eq!(
            MeasureGroup::classify("neuer Dachaufbau"),
            MeasureGroup::ObersteDecke
        );
        assert_eq!(
            MeasureGroup::classify("Dämmung unterste Decke"),
            MeasureGroup::UntersteDecke
        );
        assert_eq!(MeasureGroup::classify("Fassade hinterlüftet"), MeasureGroup::Aw);
    }

    #[test]
    fn test_priority_order() {
        // first matching rule wins
        assert_eq!(
            MeasureGroup::classify("Fenstertausch + oberste Decke"),
            MeasureGroup::ObersteDecke
        );
        assert_eq!(
            MeasureGroup::classify("AW Sanierung + Fenstertausch"),
            MeasureGroup::Fenster
        );
        assert_eq!(
            MeasureGroup::classify("unterste Decke und Fassade"),
            MeasureGroup::UntersteDecke
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(MeasureGroup::classify("Oberste Decke"), MeasureGroup::Sonstige);
        assert_eq!(MeasureGroup::classify("fenstertausch"), MeasureGroup::Sonstige);
    }

    #[test]
    fn test_display_names() {
        let names = MeasureGroup::ALL.map(|g| g.to_string());
        assert_eq!(
            names,
            ["Oberste Decke", "Unterste Decke", "Fenster", "AW", "Sonstige"]
        );
    }
}
