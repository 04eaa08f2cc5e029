use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

///
/// ACMG tier of a variant. `Unparseable` marks classification strings that
/// did not follow the expected grammar.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AcmgCategory {
    Pathogenic,
    LikelyPathogenic,
    UncertainSignificance,
    LikelyBenign,
    Benign,
    Unparseable,
}

impl AcmgCategory {
    pub const ALL: [AcmgCategory; 6] = [
        AcmgCategory::Pathogenic,
        AcmgCategory::LikelyPathogenic,
        AcmgCategory::UncertainSignificance,
        AcmgCategory::LikelyBenign,
        AcmgCategory::Benign,
        AcmgCategory::Unparseable,
    ];

    ///
    /// Severity rank, 0 being the most severe.
    ///
    pub fn severity(&self) -> u8 {
        match self {
            AcmgCategory::Pathogenic => 0,
            AcmgCategory::LikelyPathogenic => 1,
            AcmgCategory::UncertainSignificance => 2,
            AcmgCategory::LikelyBenign => 3,
            AcmgCategory::Benign => 4,
            AcmgCategory::Unparseable => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcmgCategory::Pathogenic => "Pathogenic",
            AcmgCategory::LikelyPathogenic => "Likely Pathogenic",
            AcmgCategory::UncertainSignificance => "Uncertain Significance",
            AcmgCategory::LikelyBenign => "Likely Benign",
            AcmgCategory::Benign => "Benign",
            AcmgCategory::Unparseable => "UNPARSEABLE",
        }
    }

    ///
    /// Match a tier label case-insensitively (`Likely pathogenic`,
    /// `UNCERTAIN SIGNIFICANCE`, ...). Returns `None` for anything else.
    ///
    pub fn from_label(label: &str) -> Option<Self> {
        AcmgCategory::ALL[..5]
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl FromStr for AcmgCategory {
    type Err = std::convert::Infallible;

    /// Read a `category` column value; anything unknown sorts as unparseable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AcmgCategory::from_label(s).unwrap_or(AcmgCategory::Unparseable))
    }
}

impl Display for AcmgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

///
/// One `RULE=value` pair of a classification string.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEvidence {
    pub rule: String,
    pub value: String,
}

impl RuleEvidence {
    pub fn new(rule: &str, value: &str) -> Self {
        RuleEvidence {
            rule: rule.to_string(),
            value: value.to_string(),
        }
    }

    /// A rule counts as met when its value is a positive integer.
    pub fn is_active(&self) -> bool {
        self.value.parse::<u32>().map(|v| v > 0).unwrap_or(false)
    }
}

impl Display for RuleEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.rule, self.value)
    }
}

///
/// The two classification string layouts that are understood.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grammar {
    /// `<category>: <rule>=<value> <rule>=<value> ...`
    Declared,
    /// `InterVar: <category> PVS1=v PS=[v, ...] PM=[...] PP=[...] BA1=v BS=[...] BP=[...]`
    InterVar,
    /// `InterVar: <category> <rule>=<value> <rule>=<value> ...`
    Tagged,
}

/// Bracketed InterVar rule families and their sizes, in output order.
const INTERVAR_FAMILIES: [(&str, usize); 5] = [("PS", 5), ("PM", 7), ("PP", 6), ("BS", 5), ("BP", 8)];

static INTERVAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^InterVar: (.+?) PVS1=(\S+) PS=\[([^\]]*)\] PM=\[([^\]]*)\] PP=\[([^\]]*)\] BA1=(\S+) BS=\[([^\]]*)\] BP=\[([^\]]*)\]$",
    )
    .expect("static regex")
});

static TAGGED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^InterVar: (.+?) ([A-Za-z0-9]+=\S+(?: [A-Za-z0-9]+=\S+)*)$")
        .expect("static regex")
});

static DECLARED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z ]*?): ([A-Za-z0-9]+=\S+(?: [A-Za-z0-9]+=\S+)*)$")
        .expect("static regex")
});

///
/// A decomposed classification string: its tier, the tier label as spelled
/// in the source, and the ordered rule evidence.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationField {
    pub category: AcmgCategory,
    pub label: String,
    pub evidence: Vec<RuleEvidence>,
    pub grammar: Grammar,
}

impl ClassificationField {
    ///
    /// Parse a classification string.
    ///
    /// Surrounding whitespace is ignored. Past that, only strings that
    /// render back to themselves byte for byte are accepted, so
    /// decomposition never loses information. Returns `None` for anything
    /// else.
    ///
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        let parsed = Self::parse_intervar(text)
            .or_else(|| Self::parse_pairs(text, &TAGGED_RE, Grammar::Tagged))
            .or_else(|| Self::parse_pairs(text, &DECLARED_RE, Grammar::Declared))?;
        if parsed.render() == text {
            Some(parsed)
        } else {
            None
        }
    }

    fn parse_pairs(text: &str, re: &Regex, grammar: Grammar) -> Option<Self> {
        let caps = re.captures(text)?;
        let label = caps.get(1)?.as_str();
        let category = AcmgCategory::from_label(label)?;

        let evidence = caps
            .get(2)?
            .as_str()
            .split(' ')
            .map(|token| {
                token
                    .split_once('=')
                    .map(|(rule, value)| RuleEvidence::new(rule, value))
            })
            .collect::<Option<Vec<_>>>()?;

        Some(ClassificationField {
            category,
            label: label.to_string(),
            evidence,
            grammar,
        })
    }

    fn parse_intervar(text: &str) -> Option<Self> {
        let caps = INTERVAR_RE.captures(text)?;
        let label = caps.get(1)?.as_str();
        let category = AcmgCategory::from_label(label)?;

        let mut evidence = vec![RuleEvidence::new("PVS1", caps.get(2)?.as_str())];
        // capture groups 3..=5 hold PS/PM/PP, group 6 BA1, groups 7..=8 BS/BP
        let groups = [3, 4, 5, 7, 8];
        for ((family, size), group) in INTERVAR_FAMILIES.iter().zip(groups) {
            if *family == "BS" {
                evidence.push(RuleEvidence::new("BA1", caps.get(6)?.as_str()));
            }
            let values: Vec<&str> = caps.get(group)?.as_str().split(", ").collect();
            if values.len() != *size {
                return None;
            }
            for (i, value) in values.iter().enumerate() {
                evidence.push(RuleEvidence::new(&format!("{}{}", family, i + 1), value));
            }
        }

        Some(ClassificationField {
            category,
            label: label.to_string(),
            evidence,
            grammar: Grammar::InterVar,
        })
    }

    fn family_values(&self, family: &str) -> String {
        self.evidence
            .iter()
            .filter(|e| {
                e.rule
                    .strip_prefix(family)
                    .is_some_and(|n| n.bytes().all(|b| b.is_ascii_digit()))
            })
            .map(|e| e.value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn value_of(&self, rule: &str) -> &str {
        self.evidence
            .iter()
            .find(|e| e.rule == rule)
            .map(|e| e.value.as_str())
            .unwrap_or("")
    }

    fn pairs(&self) -> String {
        self.evidence
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    ///
    /// Re-join the category and the evidence in the source grammar.
    /// Surrounding whitespace of the source is not reproduced.
    ///
    pub fn render(&self) -> String {
        match self.grammar {
            Grammar::Declared => format!("{}: {}", self.label, self.pairs()),
            Grammar::Tagged => format!("InterVar: {} {}", self.label, self.pairs()),
            Grammar::InterVar => format!(
                "InterVar: {} PVS1={} PS=[{}] PM=[{}] PP=[{}] BA1={} BS=[{}] BP=[{}]",
                self.label,
                self.value_of("PVS1"),
                self.family_values("PS"),
                self.family_values("PM"),
                self.family_values("PP"),
                self.value_of("BA1"),
                self.family_values("BS"),
                self.family_values("BP"),
            ),
        }
    }

    ///
    /// Value of the `rule_evidence` column: `RULE=value` pairs joined by `, `.
    ///
    pub fn evidence_column(&self) -> String {
        self.evidence
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn active_rules(&self) -> impl Iterator<Item = &RuleEvidence> {
        self.evidence.iter().filter(|e| e.is_active())
    }
}

///
/// Split a raw classification string into the `category` and `rule_evidence`
/// column values. Strings that do not parse keep their raw text as evidence.
///
pub fn decompose(raw: &str) -> (AcmgCategory, String) {
    match ClassificationField::parse(raw) {
        Some(field) => (field.category, field.evidence_column()),
        None => (AcmgCategory::Unparseable, raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const INTERVAR: &str = "InterVar: Uncertain significance PVS1=0 PS=[0, 0, 0, 0, 0] PM=[0, 1, 0, 0, 0, 0, 0] PP=[0, 0, 1, 0, 0, 0] BA1=0 BS=[0, 0, 0, 0, 0] BP=[0, 0, 0, 0, 0, 0, 0, 0]";

    #[rstest]
    fn test_declared_form() {
        let field = ClassificationField::parse("Pathogenic: PS1=1 PM2=1").unwrap();
        assert_eq!(field.category, AcmgCategory::Pathogenic);
        assert_eq!(
            field.evidence,
            vec![RuleEvidence::new("PS1", "1"), RuleEvidence::new("PM2", "1")]
        );
        assert_eq!(field.evidence_column(), "PS1=1, PM2=1");
    }

    #[rstest]
    fn test_intervar_form() {
        let field = ClassificationField::parse(INTERVAR).unwrap();
        assert_eq!(field.category, AcmgCategory::UncertainSignificance);
        assert_eq!(field.label, "Uncertain significance");
        assert_eq!(field.evidence.len(), 1 + 5 + 7 + 6 + 1 + 5 + 8);
        let active: Vec<&str> = field.active_rules().map(|e| e.rule.as_str()).collect();
        assert_eq!(active, vec!["PM2", "PP3"]);
        assert_eq!(field.evidence[13].rule, "PP1");
        assert_eq!(field.evidence[19].rule, "BA1");
    }

    #[rstest]
    #[case("Pathogenic: PS1=1 PM2=1")]
    #[case("Likely pathogenic: PVS1=1 PM2=1")]
    #[case("LIKELY BENIGN: BP4=1")]
    #[case("Benign: BA1=1 BS1=0")]
    #[case("InterVar: Likely benign BP4=1 BP7=0")]
    #[case(INTERVAR)]
    fn test_round_trip(#[case] raw: &str) {
        let field = ClassificationField::parse(raw).unwrap();
        assert_eq!(field.render(), raw);
    }

    #[rstest]
    #[case("InterVar: Likely pathogenic PVS1=1 PM2=1 ", AcmgCategory::LikelyPathogenic, "PVS1=1, PM2=1")]
    #[case("  Pathogenic: PS1=1 PM2=1", AcmgCategory::Pathogenic, "PS1=1, PM2=1")]
    #[case("\tBenign: BA1=1\n", AcmgCategory::Benign, "BA1=1")]
    fn test_surrounding_whitespace_is_ignored(
        #[case] raw: &str,
        #[case] expected: AcmgCategory,
        #[case] evidence: &str,
    ) {
        let field = ClassificationField::parse(raw).unwrap();
        assert_eq!(field.render(), raw.trim());
        assert_eq!(decompose(raw), (expected, evidence.to_string()));
    }

    #[rstest]
    fn test_intervar_with_surrounding_whitespace() {
        let padded = format!(" {} ", INTERVAR);
        let field = ClassificationField::parse(&padded).unwrap();
        assert_eq!(field.grammar, Grammar::InterVar);
        assert_eq!(field.category, AcmgCategory::UncertainSignificance);
    }

    #[rstest]
    fn test_tagged_form() {
        let field = ClassificationField::parse("InterVar: Benign BA1=1 BP4=1").unwrap();
        assert_eq!(field.grammar, Grammar::Tagged);
        assert_eq!(field.label, "Benign");
        assert_eq!(field.evidence_column(), "BA1=1, BP4=1");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("InterVar: Pathogenic")]
    #[case("InterVar: Very bad PS1=1")]
    #[case("Pathogenic")]
    #[case("Pathogenic:")]
    #[case("Pathogenic: ")]
    #[case("Pathogenic:  PS1=1")]
    #[case("Pathogenic: PS1=1  PM2=1")]
    #[case("Pathogenic: PS1")]
    #[case("Very bad: PS1=1")]
    #[case("InterVar: Benign PVS1=0 PS=[0, 0] PM=[0, 0, 0, 0, 0, 0, 0] PP=[0, 0, 0, 0, 0, 0] BA1=1 BS=[0, 0, 0, 0, 0] BP=[0, 0, 0, 0, 0, 0, 0, 0]")]
    #[case("InterVar: Benign PVS1=0 PS=[0,0,0,0,0] PM=[0, 0, 0, 0, 0, 0, 0] PP=[0, 0, 0, 0, 0, 0] BA1=1 BS=[0, 0, 0, 0, 0] BP=[0, 0, 0, 0, 0, 0, 0, 0]")]
    fn test_unparseable(#[case] raw: &str) {
        assert!(ClassificationField::parse(raw).is_none());
        let (category, evidence) = decompose(raw);
        assert_eq!(category, AcmgCategory::Unparseable);
        assert_eq!(evidence, raw);
    }

    #[rstest]
    #[case("Pathogenic", AcmgCategory::Pathogenic)]
    #[case("Likely Pathogenic", AcmgCategory::LikelyPathogenic)]
    #[case("uncertain significance", AcmgCategory::UncertainSignificance)]
    #[case("UNPARSEABLE", AcmgCategory::Unparseable)]
    #[case("", AcmgCategory::Unparseable)]
    fn test_category_from_column(#[case] value: &str, #[case] expected: AcmgCategory) {
        assert_eq!(value.parse::<AcmgCategory>().unwrap(), expected);
    }

    #[rstest]
    fn test_severity_order() {
        let severities: Vec<u8> = AcmgCategory::ALL.iter().map(|c| c.severity()).collect();
        assert_eq!(severities, vec![0, 1, 2, 3, 4, 5]);
    }
}
