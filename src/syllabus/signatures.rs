// File: ./src/syllabus/signatures.rs
//! Known syllabus signatures and the assessments each one is expected to list.
//!
//! Every entry was written by reading one specific course outline. The
//! matcher only confirms entries: an item is emitted when one of its evidence
//! patterns occurs in the text, and silently omitted otherwise. When an item
//! allows it, the date printed next to the evidence overrides the table date.
//!
//! Bump [`SIGNATURE_TABLE_VERSION`] whenever an entry changes.
use crate::extract::patterns::MONTHS;
use crate::extract::parser::parse_month_name;
use crate::model::StructuredAssessment;
use crate::syllabus::CourseFamily;
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub const SIGNATURE_TABLE_VERSION: u32 = 3;

static NEARBY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedAssessment {
    pub title: &'static str,
    pub time: &'static str,
    /// `(year, month, day)` used when no better date is found.
    pub date: (i32, u32, u32),
    /// Any one of these confirms the item (case-insensitive, `.` spans lines).
    pub evidence: &'static [&'static str],
    /// Prefer a month-day date printed on the evidence line or close to it.
    pub date_from_text: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSignature {
    pub family: CourseFamily,
    /// Three digit course number, or `None` for every course in the family.
    pub course_number: Option<&'static str>,
    pub term: &'static str,
    pub items: &'static [ExpectedAssessment],
}

const ENTI_674_W25: &[ExpectedAssessment] = &[
    ExpectedAssessment {
        title: "Midterm Quiz",
        time: "during class",
        date: (2025, 3, 27),
        evidence: &[
            r"March\s+27,?\s+202[45].*?(?:Midterm|Quiz|Exam)",
            r"(?:Midterm|Mid-term|Mid)[\s\-]*(?:Quiz|Exam|Test).*?March\s+\d{1,2}",
        ],
        date_from_text: false,
    },
    ExpectedAssessment {
        title: "Group Project (Part 1)",
        time: "during class",
        date: (2025, 4, 10),
        evidence: &[
            r"April\s+10\s*&\s*April\s+14,\s*2025",
            r"April\s+10.*?(?:Group|Project|Presentation)",
        ],
        date_from_text: false,
    },
    ExpectedAssessment {
        title: "Group Project (Part 2)",
        time: "during class",
        date: (2025, 4, 14),
        evidence: &[
            r"April\s+10\s*&\s*April\s+14,\s*2025",
            r"April\s+14.*?(?:Group|Project|Presentation)",
        ],
        date_from_text: false,
    },
    ExpectedAssessment {
        title: "Lab Exercises",
        time: "see course schedule",
        date: (2025, 1, 13),
        evidence: &[r"(?:Laboratory|Lab).*?(?:throughout|see course schedule|schedule)"],
        date_from_text: false,
    },
];

const FNCE_674_W25: &[ExpectedAssessment] = &[
    ExpectedAssessment {
        title: "Quiz #1",
        time: "during class",
        date: (2025, 3, 12),
        evidence: &[r"Quiz\s*(?:#|No\.?)?\s*1\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Quiz #2",
        time: "during class",
        date: (2025, 3, 26),
        evidence: &[r"Quiz\s*(?:#|No\.?)?\s*2\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Quiz #3",
        time: "during class",
        date: (2025, 4, 9),
        evidence: &[r"Quiz\s*(?:#|No\.?)?\s*3\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "In-Class Exercise #1",
        time: "during class",
        date: (2025, 3, 5),
        evidence: &[r"In[\s\-]*Class\s+Exercise\s*#?\s*1\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "In-Class Exercise #2",
        time: "during class",
        date: (2025, 3, 19),
        evidence: &[r"In[\s\-]*Class\s+Exercise\s*#?\s*2\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "In-Class Exercise #3",
        time: "during class",
        date: (2025, 4, 2),
        evidence: &[r"In[\s\-]*Class\s+Exercise\s*#?\s*3\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Case Write-up #1",
        time: "before class",
        date: (2025, 3, 17),
        evidence: &[r"Case\s+Write[\s\-]*ups?\s*#?\s*1\b"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Case Write-up #2",
        time: "before class",
        date: (2025, 4, 7),
        evidence: &[r"Case\s+Write[\s\-]*ups?\s*#?\s*2\b"],
        date_from_text: true,
    },
];

const OBHR_W25: &[ExpectedAssessment] = &[
    ExpectedAssessment {
        title: "Team Charter",
        time: "before class",
        date: (2025, 1, 24),
        evidence: &[r"Team\s+Charter"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Reflection Paper",
        time: "11:59pm",
        date: (2025, 2, 14),
        evidence: &[r"(?:Individual\s+)?Reflection\s+Paper"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Midterm Exam",
        time: "during class",
        date: (2025, 2, 28),
        evidence: &[r"Mid[\s\-]*term\s+(?:Exam|Test)"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Final Team Presentation",
        time: "during class",
        date: (2025, 4, 4),
        evidence: &[r"(?:Final\s+)?Team\s+Presentations?"],
        date_from_text: true,
    },
];

const SGMA_W25: &[ExpectedAssessment] = &[
    ExpectedAssessment {
        title: "Midterm Exam",
        time: "during class",
        date: (2025, 2, 27),
        evidence: &[r"Mid[\s\-]*term\s+(?:Exam|Test)"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Strategy Paper",
        time: "11:59pm",
        date: (2025, 3, 20),
        evidence: &[r"(?:Strategic\s+Analysis|Strategy)\s+Paper"],
        date_from_text: true,
    },
    ExpectedAssessment {
        title: "Final Exam",
        time: "see final exam schedule",
        date: (2025, 4, 22),
        evidence: &[r"Final\s+(?:Exam|Examination)"],
        date_from_text: true,
    },
];

pub const KNOWN_SIGNATURES: &[DocumentSignature] = &[
    DocumentSignature {
        family: CourseFamily::Enti,
        course_number: Some("674"),
        term: "W25",
        items: ENTI_674_W25,
    },
    DocumentSignature {
        family: CourseFamily::Fnce,
        course_number: Some("674"),
        term: "W25",
        items: FNCE_674_W25,
    },
    DocumentSignature {
        family: CourseFamily::Obhr,
        course_number: None,
        term: "W25",
        items: OBHR_W25,
    },
    DocumentSignature {
        family: CourseFamily::Sgma,
        course_number: None,
        term: "W25",
        items: SGMA_W25,
    },
];

/// Lookup over a list of signatures; exact course numbers win over
/// family-wide entries.
#[derive(Debug, Clone, Copy)]
pub struct SignatureTable {
    signatures: &'static [DocumentSignature],
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::new(KNOWN_SIGNATURES)
    }
}

impl SignatureTable {
    pub const fn new(signatures: &'static [DocumentSignature]) -> Self {
        Self { signatures }
    }

    pub fn version(&self) -> u32 {
        SIGNATURE_TABLE_VERSION
    }

    pub fn lookup(&self, family: CourseFamily, course_number: &str) -> Option<&DocumentSignature> {
        let family_sigs = || self.signatures.iter().filter(move |s| s.family == family);
        family_sigs()
            .find(|s| s.course_number == Some(course_number))
            .or_else(|| family_sigs().find(|s| s.course_number.is_none()))
    }
}

impl DocumentSignature {
    pub fn match_document(&self, text: &str) -> Vec<StructuredAssessment> {
        self.items
            .iter()
            .filter_map(|item| item.confirm(text))
            .collect()
    }
}

impl ExpectedAssessment {
    fn fallback_date(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.date;
        NaiveDate::from_ymd_opt(y, m, d)
    }

    /// The assessment if the text confirms it, dated from the text when allowed.
    pub fn confirm(&self, text: &str) -> Option<StructuredAssessment> {
        let evidence = self.evidence.iter().find_map(|src| {
            match RegexBuilder::new(src)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
            {
                Ok(re) => re.find(text).map(|m| (m.start(), m.end())),
                Err(e) => {
                    warn!("Bad evidence pattern for '{}': {}", self.title, e);
                    None
                }
            }
        });
        let Some((start, end)) = evidence else {
            debug!("No evidence for '{}'", self.title);
            return None;
        };

        let fallback = self.fallback_date()?;
        let date = if self.date_from_text {
            nearest_date(text, start, end, fallback.year()).unwrap_or(fallback)
        } else {
            fallback
        };

        Some(StructuredAssessment::new(
            self.title,
            date.format("%Y-%m-%d").to_string(),
            self.time,
        ))
    }
}

fn line_bounds(text: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..].find('\n').map(|i| end + i).unwrap_or(text.len());
    (line_start, line_end)
}

/// Month-day date closest to the evidence span `[start, end)`.
///
/// The evidence line is searched first, then a window around it. Ties go
/// to the date that follows the evidence.
pub fn nearest_date(text: &str, start: usize, end: usize, default_year: i32) -> Option<NaiveDate> {
    let (ls, le) = line_bounds(text, start, end);
    best_in(text, ls, le, start, end, default_year).or_else(|| {
        let (ws, we) = crate::model::window_bounds(text, start, 240);
        let we = we.max(crate::model::window_bounds(text, end, 240).1);
        best_in(text, ws, we, start, end, default_year)
    })
}

fn best_in(
    text: &str,
    from: usize,
    to: usize,
    ev_start: usize,
    ev_end: usize,
    default_year: i32,
) -> Option<NaiveDate> {
    let region = &text[from..to];
    NEARBY_DATE
        .captures_iter(region)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let (ds, de) = (from + whole.start(), from + whole.end());
            let month = parse_month_name(&c[1])?;
            let day = c[2].parse::<u32>().ok()?;
            let year = c
                .get(3)
                .and_then(|y| y.as_str().parse::<i32>().ok())
                .unwrap_or(default_year);
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            let (distance, before) = if ds >= ev_end {
                (ds - ev_end, false)
            } else if de <= ev_start {
                (ev_start - de, true)
            } else {
                (0, false)
            };
            Some(((distance, before), date))
        })
        .min_by_key(|(key, _)| *key)
        .map(|(_, date)| date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_evidence_pattern_compiles() {
        for sig in KNOWN_SIGNATURES {
            for item in sig.items {
                assert!(item.fallback_date().is_some(), "{}", item.title);
                for src in item.evidence {
                    assert!(Regex::new(src).is_ok(), "{}: {}", item.title, src);
                }
            }
        }
    }

    #[test]
    fn test_lookup_prefers_exact_course_number() {
        let table = SignatureTable::default();
        let sig = table.lookup(CourseFamily::Fnce, "674").unwrap();
        assert_eq!(sig.course_number, Some("674"));
        assert!(table.lookup(CourseFamily::Fnce, "301").is_none());
        assert!(table.lookup(CourseFamily::Sgma, "501").is_some());
        assert!(table.lookup(CourseFamily::Mktg, "301").is_none());
    }

    #[test]
    fn test_nearest_date_prefers_evidence_line() {
        let text = "Quiz #1 March 12\nQuiz #2 March 26\n";
        let start = text.find("Quiz #2").unwrap();
        let end = start + "Quiz #2".len();
        assert_eq!(
            nearest_date(text, start, end, 2025),
            NaiveDate::from_ymd_opt(2025, 3, 26)
        );
    }

    #[test]
    fn test_nearest_date_uses_explicit_year() {
        let text = "Final Exam: April 21, 2026 (room TBA)";
        assert_eq!(
            nearest_date(text, 0, 10, 2025),
            NaiveDate::from_ymd_opt(2026, 4, 21)
        );
    }

    #[test]
    fn test_unconfirmed_item_is_omitted() {
        let item = FNCE_674_W25[0];
        assert!(item.confirm("Quiz #10 is optional").is_none());
        let found = item.confirm("Quiz #1 (Mar 14) covers chapters 1-3").unwrap();
        assert_eq!(found.date, "2025-03-14");
        assert_eq!(found.time, "during class");
    }
}
