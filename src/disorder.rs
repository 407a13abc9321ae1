//! Disorder classification
//!
//! Free-text diagnosis fields are normalized into a closed set of categories
//! that select the rule variants used by the recommendation engine. Matching
//! is an ordered substring search over the upper-cased full name and short
//! code; the first matching pattern wins, so broader terms must come after
//! the narrower ones they would otherwise shadow (BIPOLAR before DEPRESSIVE).

use serde::{Deserialize, Serialize};

/// Closed set of disorder categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisorderCategory {
    Bipolar,
    Mdd,
    Ptsd,
    Anxiety,
    Panic,
    Ocd,
    Schizophrenia,
    Bpd,
    Substance,
    SocialAnxiety,
    Adhd,
    EatingDisorder,
    Other,
}

struct Pattern {
    category: DisorderCategory,
    full_name: &'static [&'static str],
    code: &'static [&'static str],
}

const PATTERNS: &[Pattern] = &[
    Pattern {
        category: DisorderCategory::Bipolar,
        full_name: &["BIPOLAR"],
        code: &[],
    },
    Pattern {
        category: DisorderCategory::Mdd,
        full_name: &["DEPRESSIVE"],
        code: &["MDD"],
    },
    Pattern {
        category: DisorderCategory::Ptsd,
        full_name: &["PTSD", "POST-TRAUMATIC", "POSTTRAUMATIC"],
        code: &["PTSD"],
    },
    Pattern {
        category: DisorderCategory::Anxiety,
        full_name: &["ANXIETY"],
        code: &["GAD"],
    },
    Pattern {
        category: DisorderCategory::Panic,
        full_name: &["PANIC"],
        code: &[],
    },
    Pattern {
        category: DisorderCategory::Ocd,
        full_name: &["OBSESSIVE"],
        code: &["OCD"],
    },
    Pattern {
        category: DisorderCategory::Schizophrenia,
        full_name: &["SCHIZOPHRENIA"],
        code: &[],
    },
    Pattern {
        category: DisorderCategory::Bpd,
        full_name: &["BORDERLINE"],
        code: &["BPD"],
    },
    Pattern {
        category: DisorderCategory::Substance,
        full_name: &["SUBSTANCE", "ALCOHOL"],
        code: &[],
    },
    // Shadowed by ANXIETY for full names; kept so the category set stays closed
    Pattern {
        category: DisorderCategory::SocialAnxiety,
        full_name: &["SOCIAL ANXIETY"],
        code: &[],
    },
    Pattern {
        category: DisorderCategory::Adhd,
        full_name: &["ADHD", "ATTENTION-DEFICIT"],
        code: &["ADHD"],
    },
    Pattern {
        category: DisorderCategory::EatingDisorder,
        full_name: &["ANOREXIA", "EATING"],
        code: &[],
    },
];

impl DisorderCategory {
    /// Classify a patient's diagnosis from its short code and full name
    pub fn classify(code: &str, full_name: &str) -> Self {
        let code = code.to_uppercase();
        let full_name = full_name.to_uppercase();

        PATTERNS
            .iter()
            .find(|p| {
                p.full_name.iter().any(|needle| full_name.contains(needle))
                    || p.code.iter().any(|needle| code.contains(needle))
            })
            .map(|p| p.category)
            .unwrap_or(DisorderCategory::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisorderCategory::Bipolar => "BIPOLAR",
            DisorderCategory::Mdd => "MDD",
            DisorderCategory::Ptsd => "PTSD",
            DisorderCategory::Anxiety => "ANXIETY",
            DisorderCategory::Panic => "PANIC",
            DisorderCategory::Ocd => "OCD",
            DisorderCategory::Schizophrenia => "SCHIZOPHRENIA",
            DisorderCategory::Bpd => "BPD",
            DisorderCategory::Substance => "SUBSTANCE",
            DisorderCategory::SocialAnxiety => "SOCIAL_ANXIETY",
            DisorderCategory::Adhd => "ADHD",
            DisorderCategory::EatingDisorder => "EATING_DISORDER",
            DisorderCategory::Other => "OTHER",
        }
    }

    /// Anxiety and panic share sleep, HRV and disorder-specific rules
    pub fn is_anxiety_spectrum(&self) -> bool {
        matches!(self, DisorderCategory::Anxiety | DisorderCategory::Panic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_full_name() {
        let cases = [
            ("BD", "Bipolar I Disorder", DisorderCategory::Bipolar),
            ("", "Major Depressive Disorder", DisorderCategory::Mdd),
            ("", "Panic Disorder", DisorderCategory::Panic),
            ("", "Obsessive-Compulsive Disorder", DisorderCategory::Ocd),
            ("SCZ", "Schizophrenia", DisorderCategory::Schizophrenia),
            ("", "Borderline Personality Disorder", DisorderCategory::Bpd),
            ("", "Alcohol Use Disorder", DisorderCategory::Substance),
            ("", "Anorexia Nervosa", DisorderCategory::EatingDisorder),
            ("", "Attention-Deficit/Hyperactivity Disorder", DisorderCategory::Adhd),
        ];
        for (code, full, expected) in cases {
            assert_eq!(DisorderCategory::classify(code, full), expected, "{full}");
        }
    }

    #[test]
    fn test_classify_by_code() {
        assert_eq!(DisorderCategory::classify("MDD", "Depression"), DisorderCategory::Mdd);
        assert_eq!(DisorderCategory::classify("GAD", "Worry"), DisorderCategory::Anxiety);
        assert_eq!(DisorderCategory::classify("OCD", ""), DisorderCategory::Ocd);
        assert_eq!(DisorderCategory::classify("BPD", ""), DisorderCategory::Bpd);
    }

    #[test]
    fn test_short_code_only() {
        assert_eq!(DisorderCategory::classify("PTSD", ""), DisorderCategory::Ptsd);
        assert_eq!(DisorderCategory::classify("ptsd", "Unspecified"), DisorderCategory::Ptsd);
        assert_eq!(DisorderCategory::classify("ADHD", ""), DisorderCategory::Adhd);
        assert_eq!(DisorderCategory::classify("BD", ""), DisorderCategory::Other);
    }

    #[test]
    fn test_ptsd_full_name() {
        assert_eq!(
            DisorderCategory::classify("PTSD", "Post-Traumatic Stress Disorder"),
            DisorderCategory::Ptsd
        );
        assert_eq!(
            DisorderCategory::classify("", "Posttraumatic stress disorder"),
            DisorderCategory::Ptsd
        );
    }

    #[test]
    fn test_bipolar_wins_over_depressive() {
        assert_eq!(
            DisorderCategory::classify("MDD", "Bipolar II Disorder, current episode depressive"),
            DisorderCategory::Bipolar
        );
    }

    #[test]
    fn test_social_anxiety_routes_to_anxiety() {
        assert_eq!(
            DisorderCategory::classify("SAD", "Social Anxiety Disorder"),
            DisorderCategory::Anxiety
        );
    }

    #[test]
    fn test_case_insensitive_and_fallback() {
        assert_eq!(
            DisorderCategory::classify("", "generalized anxiety disorder"),
            DisorderCategory::Anxiety
        );
        assert_eq!(DisorderCategory::classify("", "Insomnia"), DisorderCategory::Other);
        assert_eq!(DisorderCategory::classify("", ""), DisorderCategory::Other);
    }

    #[test]
    fn test_serializes_as_upper_snake() {
        let json = serde_json::to_string(&DisorderCategory::EatingDisorder).unwrap();
        assert_eq!(json, "\"EATING_DISORDER\"");
        assert_eq!(DisorderCategory::SocialAnxiety.as_str(), "SOCIAL_ANXIETY");
    }
}
