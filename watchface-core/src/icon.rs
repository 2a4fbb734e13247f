use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, ops::RangeInclusive};

/// Symbolic bucket used to pick a glyph for a weather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Storm,
    LightRain,
    HeavyRain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Cloudy,
    Unknown,
}

impl IconCategory {
    /// Name of the glyph asset for this category. `Unknown` has none.
    pub fn asset_name(&self) -> Option<&'static str> {
        match self {
            IconCategory::Storm => Some("storm"),
            IconCategory::LightRain => Some("light_rain"),
            IconCategory::HeavyRain => Some("heavy_rain"),
            IconCategory::Snow => Some("snow"),
            IconCategory::Fog => Some("fog"),
            IconCategory::Clear => Some("clear"),
            IconCategory::LightClouds => Some("light_clouds"),
            IconCategory::Cloudy => Some("cloudy"),
            IconCategory::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.asset_name().unwrap_or("unknown")
    }

    pub const fn all() -> &'static [IconCategory] {
        &[
            IconCategory::Storm,
            IconCategory::LightRain,
            IconCategory::HeavyRain,
            IconCategory::Snow,
            IconCategory::Fog,
            IconCategory::Clear,
            IconCategory::LightClouds,
            IconCategory::Cloudy,
            IconCategory::Unknown,
        ]
    }
}

impl std::fmt::Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IconCategory {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        IconCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unknown icon category '{value}'."))
    }
}

/// One row of the classification table: a category and the inclusive code
/// ranges that select it. Singleton codes are one-element ranges.
#[derive(Debug)]
pub struct Rule {
    pub category: IconCategory,
    pub ranges: &'static [RangeInclusive<i32>],
}

impl Rule {
    pub fn matches(&self, code: i32) -> bool {
        self.ranges.iter().any(|r| r.contains(&code))
    }
}

/// Ordered rule table, first match wins.
///
/// 761 and 781 sit inside the fog band numerically but are claimed by the
/// storm row, which comes first. 511 is claimed by snow even though it lies
/// between the two heavy-rain bands.
pub static RULES: &[Rule] = &[
    Rule { category: IconCategory::Storm, ranges: &[200..=232, 761..=761, 781..=781] },
    Rule { category: IconCategory::LightRain, ranges: &[300..=321] },
    Rule { category: IconCategory::HeavyRain, ranges: &[500..=504, 520..=531] },
    Rule { category: IconCategory::Snow, ranges: &[511..=511, 600..=622] },
    Rule { category: IconCategory::Fog, ranges: &[701..=761] },
    Rule { category: IconCategory::Clear, ranges: &[800..=800] },
    Rule { category: IconCategory::LightClouds, ranges: &[801..=801] },
    Rule { category: IconCategory::Cloudy, ranges: &[802..=804] },
];

/// Map a weather condition code to its icon category. Total over `i32`.
pub fn classify(code: i32) -> IconCategory {
    RULES
        .iter()
        .find(|rule| rule.matches(code))
        .map(|rule| rule.category)
        .unwrap_or(IconCategory::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all(codes: impl IntoIterator<Item = i32>, expected: IconCategory) {
        for code in codes {
            assert_eq!(classify(code), expected, "code {code}");
        }
    }

    #[test]
    fn thunderstorm_band_and_singletons_are_storm() {
        assert_all(200..=232, IconCategory::Storm);
        assert_eq!(classify(761), IconCategory::Storm);
        assert_eq!(classify(781), IconCategory::Storm);
    }

    #[test]
    fn drizzle_band_is_light_rain() {
        assert_all(300..=321, IconCategory::LightRain);
    }

    #[test]
    fn rain_bands_are_heavy_rain() {
        assert_all(500..=504, IconCategory::HeavyRain);
        assert_all(520..=531, IconCategory::HeavyRain);
    }

    #[test]
    fn freezing_rain_and_snow_band_are_snow() {
        assert_eq!(classify(511), IconCategory::Snow);
        assert_all(600..=622, IconCategory::Snow);
    }

    #[test]
    fn atmosphere_band_is_fog_except_761() {
        assert_all(701..=760, IconCategory::Fog);
        assert_eq!(classify(761), IconCategory::Storm);
    }

    #[test]
    fn clear_and_clouds() {
        assert_eq!(classify(800), IconCategory::Clear);
        assert_eq!(classify(801), IconCategory::LightClouds);
        assert_all(802..=804, IconCategory::Cloudy);
    }

    #[test]
    fn gaps_and_out_of_range_are_unknown() {
        assert_all(
            [
                -1, 0, 199, 233, 299, 322, 499, 505, 510, 512, 519, 532, 599, 623, 700, 762, 780,
                782, 799, 805, 999,
            ],
            IconCategory::Unknown,
        );
        assert_eq!(classify(i32::MIN), IconCategory::Unknown);
        assert_eq!(classify(i32::MAX), IconCategory::Unknown);
    }

    #[test]
    fn classify_is_deterministic() {
        for code in 150..=850 {
            assert_eq!(classify(code), classify(code));
        }
    }

    #[test]
    fn only_unknown_has_no_asset() {
        for category in IconCategory::all() {
            assert_eq!(category.asset_name().is_none(), *category == IconCategory::Unknown);
        }
    }

    #[test]
    fn category_parses_from_its_name() {
        for category in IconCategory::all() {
            let parsed = IconCategory::try_from(category.as_str()).expect("name should parse");
            assert_eq!(*category, parsed);
        }

        let err = IconCategory::try_from("hail").unwrap_err();
        assert!(err.to_string().contains("Unknown icon category"));
    }

    #[test]
    fn category_serializes_as_snake_case() {
        let json = serde_json::to_string(&IconCategory::LightClouds).unwrap();
        assert_eq!(json, "\"light_clouds\"");
    }
}
