//! TB diagnostic result interpretation.
//!
//! Result text is free-form and its phrasing depends on the test: GeneXpert
//! reports "MTB detected", chest X-rays "suggestive", smear and LAM tests
//! "pos"/"neg". Each rule pairs a test type with the vocabulary for "a result
//! was returned" and for "the result is positive", plus exclusions for text
//! that names a different test (an AFB row reading "TB positive").

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::Criterion;

pub const TEST_TYPE: &str = "TB Diagnostic Test Type";
pub const RESULT: &str = "TB Diagnostic Result";

static POS_NEG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)pos|neg|\+|-|_|\+ve|-ve|nag|p0s|nrg|pso|ng|ned").expect("Invalid pos/neg regex")
});

static XRAY_POS_NEG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)not sugestive|suggestive|mbt detectected|mt detected|mt not detected|mtb n0t detected|dectected|mtb not detectd|not detected|detected|dtected|detectted|detectd|dedected|detect|mtbd|deteted|-mtb",
    )
    .expect("Invalid x-ray regex")
});

static MTB_POS_NEG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)mbt detectected|mt detected|mt not detected|mtb n0t detected|dectected|mtb not detectd|not detected|detected|dtected|detectted|detectd|dedected|detect|mtbd|deteted|mtb trace|-mtb|error|incomplete|invalid",
    )
    .expect("Invalid MTB regex")
});

static POSITIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pos|\+|\+ve|p0s|pso").expect("Invalid positive regex"));

static XRAY_POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:suggestive|x-ray suggestive|mtb detected|mbt detectected|mt detected|detected|mtbdetect|mtb detectected|mtb detectted|detectted|mtb detectd|detectd|mtb dectected|dectected|mtb dedected|dedected|mtb dtected|dtected|mtd detected|mtbd|mtb trace|detect|ptb detect|ptb suspect|deteted|\+mtb)",
    )
    .expect("Invalid x-ray positive regex")
});

static MTB_POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:mtb detected|mbt detectected|mt detected|detected|mtbdetect|mtb detectected|mtb detectted|detectted|mtb detectd|detectd|mtb dectected|dectected|mtb dedected|dedected|mtb trace|mtb dtected|dtected|mtd detected|mtbd|detect|ptb detect|ptb suspect|deteted|\+mtb)",
    )
    .expect("Invalid MTB positive regex")
});

static TB_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tb\s+(?:positive|negative|pos|neg|ned)").expect("Invalid TB exclusion regex")
});

static AFB_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)afb\s+(?:positive|negative|pos|neg|ned)").expect("Invalid AFB exclusion regex")
});

static TB_NAMED_POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tb\s+(?:positive|pos|p0s)").expect("Invalid TB positive exclusion regex")
});

static AFB_NAMED_POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)afb\s+(?:positive|pos|p0s)").expect("Invalid AFB positive exclusion regex")
});

/// Diagnostic test family used for indicator breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabFamily {
    Xpert,
    TrueNat,
    Lam,
    Xray,
    Afb,
    Clinical,
}

impl LabFamily {
    pub const ALL: [LabFamily; 6] = [
        LabFamily::Xpert,
        LabFamily::TrueNat,
        LabFamily::Lam,
        LabFamily::Xray,
        LabFamily::Afb,
        LabFamily::Clinical,
    ];

    /// Suffix used in indicator names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Xpert => "Xpert",
            Self::TrueNat => "TrueNAT",
            Self::Lam => "LAM",
            Self::Xray => "Xray",
            Self::Afb => "AFB",
            Self::Clinical => "Clinical",
        }
    }
}

/// Which vocabulary a criterion applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabOutcome {
    /// Any interpretable result came back.
    Returned,
    Positive,
}

struct Vocabulary {
    matches: &'static LazyLock<Regex>,
    excludes: &'static [&'static LazyLock<Regex>],
}

impl Vocabulary {
    fn accepts(&self, result: &str) -> bool {
        self.matches.is_match(result) && !self.excludes.iter().any(|re| re.is_match(result))
    }
}

struct LabRule {
    family: LabFamily,
    /// Case-sensitive substrings of the test type column.
    test_types: &'static [&'static str],
    returned: Vocabulary,
    positive: Vocabulary,
}

static RULES: [LabRule; 7] = [
    LabRule {
        family: LabFamily::Xpert,
        test_types: &["Gene Xpert"],
        returned: Vocabulary { matches: &MTB_POS_NEG, excludes: &[] },
        positive: Vocabulary { matches: &MTB_POSITIVE, excludes: &[] },
    },
    LabRule {
        family: LabFamily::TrueNat,
        test_types: &["TrueNAT"],
        returned: Vocabulary { matches: &MTB_POS_NEG, excludes: &[] },
        positive: Vocabulary { matches: &MTB_POSITIVE, excludes: &[] },
    },
    LabRule {
        family: LabFamily::Xray,
        test_types: &["Chest X-ray"],
        returned: Vocabulary { matches: &XRAY_POS_NEG, excludes: &[] },
        positive: Vocabulary { matches: &XRAY_POSITIVE, excludes: &[] },
    },
    LabRule {
        family: LabFamily::Lam,
        test_types: &["TB-LAM"],
        returned: Vocabulary { matches: &POS_NEG, excludes: &[&AFB_NAMED] },
        positive: Vocabulary { matches: &POSITIVE, excludes: &[&AFB_NAMED_POSITIVE] },
    },
    LabRule {
        family: LabFamily::Lam,
        test_types: &["LF-LAM", "TB LAMP"],
        returned: Vocabulary { matches: &POS_NEG, excludes: &[&TB_NAMED, &AFB_NAMED] },
        positive: Vocabulary {
            matches: &POSITIVE,
            excludes: &[&TB_NAMED_POSITIVE, &AFB_NAMED_POSITIVE],
        },
    },
    LabRule {
        family: LabFamily::Afb,
        test_types: &["AFB Smear Microscopy"],
        returned: Vocabulary { matches: &POS_NEG, excludes: &[&TB_NAMED] },
        positive: Vocabulary { matches: &POSITIVE, excludes: &[&TB_NAMED_POSITIVE] },
    },
    LabRule {
        family: LabFamily::Clinical,
        test_types: &["Clinical evaluation only"],
        returned: Vocabulary { matches: &POS_NEG, excludes: &[&TB_NAMED, &AFB_NAMED] },
        positive: Vocabulary {
            matches: &POSITIVE,
            excludes: &[&TB_NAMED_POSITIVE, &AFB_NAMED_POSITIVE],
        },
    },
];

/// True when some rule (restricted to `family` when given) recognises the
/// test type and accepts the result under `outcome`.
pub fn interpret(test_type: &str, result: &str, family: Option<LabFamily>, outcome: LabOutcome) -> bool {
    RULES
        .iter()
        .filter(|rule| family.is_none_or(|f| f == rule.family))
        .filter(|rule| rule.test_types.iter().any(|t| test_type.contains(t)))
        .any(|rule| match outcome {
            LabOutcome::Returned => rule.returned.accepts(result),
            LabOutcome::Positive => rule.positive.accepts(result),
        })
}

/// Criterion over the test type and result columns.
pub fn lab_result(family: Option<LabFamily>, outcome: LabOutcome) -> Criterion {
    Criterion::new(&[TEST_TYPE, RESULT], move |row, _| {
        let Some(test_type) = row.text(TEST_TYPE) else {
            return false;
        };
        let result = row.text(RESULT).unwrap_or_default();
        interpret(test_type, result, family, outcome)
    })
}
