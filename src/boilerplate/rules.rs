//! Built-in boilerplate rules
//!
//! Each entry is `(id, family, pattern)`. Patterns are written for a single
//! trimmed line; [`BoilerplateRule::new`](super::BoilerplateRule::new) anchors
//! them and makes them case-insensitive. Adding a family means adding rows
//! here, the filter itself never changes.

use once_cell::sync::Lazy;

use super::{BoilerplateFamily, BoilerplateRule};

use BoilerplateFamily::*;

const DATE_LABEL: &str = r"(?:Generated|Created|Updated|Printed)";

pub static BUILTIN_RULE_TABLE: Lazy<Vec<(&'static str, BoilerplateFamily, String)>> =
    Lazy::new(|| {
        vec![
            (
                "sas-version-banner",
                VersionBanner,
                r"Version\s+\d+(?:\.\d+)+\s+SAS\s+System\s+Output".to_string(),
            ),
            (
                "sas-system-title",
                VersionBanner,
                r"(?:The\s+)?SAS\s+System".to_string(),
            ),
            (
                "confidential-marker",
                Confidentiality,
                r"\p{P}*\s*(?:Strictly\s+)?Confidential\s*\p{P}*".to_string(),
            ),
            (
                "program-sc-reference",
                ProgramReference,
                r"Program\s*\[SC\]\s*:.*".to_string(),
            ),
            (
                "source-path-reference",
                ProgramReference,
                r"(?:Program|Source|File)(?:\s+(?:Name|Path|File))?\s*:\s*\S*[/\\.]\S*".to_string(),
            ),
            (
                "labelled-iso-timestamp",
                Timestamp,
                format!(r"{DATE_LABEL}\s+on:?\s*\d{{4}}-\d{{2}}-\d{{2}}(?:\s+\d{{2}}:\d{{2}}:\d{{2}})?"),
            ),
            (
                "labelled-us-timestamp",
                Timestamp,
                format!(
                    r"{DATE_LABEL}\s+at:?\s*\d{{2}}/\d{{2}}/\d{{4}}(?:\s+\d{{1,2}}:\d{{2}}(?:\s*[AP]M)?)?"
                ),
            ),
            (
                "day-month-year-timestamp",
                Timestamp,
                r"\d{1,2}-[A-Z]{3}-\d{4}(?:\s+\d{2}:\d{2}(?::\d{2})?)?".to_string(),
            ),
            (
                "us-date-timestamp",
                Timestamp,
                r"\d{1,2}/\d{1,2}/\d{4}(?:\s+\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AP]M)?)?".to_string(),
            ),
            (
                "iso-date-timestamp",
                Timestamp,
                r"\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2})?)?".to_string(),
            ),
            (
                "sas-weekday-timestamp",
                Timestamp,
                r"(?:\d{1,2}:\d{2}\s+)?(?:Mon|Tues|Wednes|Thurs|Fri|Satur|Sun)day,?\s+[A-Z]+\s+\d{1,2},\s+\d{4}"
                    .to_string(),
            ),
            (
                "page-n-of-m",
                PageMarker,
                r"Page\s+\d+\s*(?:of|/)\s*\d+".to_string(),
            ),
            ("page-n", PageMarker, r"Page\s+\d+".to_string()),
            ("dashed-page-number", PageMarker, r"-\s*\d+\s*-".to_string()),
            (
                "numbered-caption",
                Caption,
                r"(?:Table|Listing|Figure)\s+\d+(?:\.\d+){1,2}\b.*".to_string(),
            ),
            ("dash-separator", Separator, r"-+".to_string()),
            ("equals-separator", Separator, r"=+".to_string()),
            ("study-label", Metadata, r"(?:Study|Protocol)\s*:\s*\w+".to_string()),
            ("run-date-label", Metadata, r"(?:Output|Run)\s+Date\s*:.*".to_string()),
            (
                "file-label",
                Metadata,
                r"(?:File\s+Path|Program\s+Name)\s*:.*".to_string(),
            ),
        ]
    });

/// Compiled built-in rules, shared by every filter.
pub static BUILTIN_RULES: Lazy<Vec<BoilerplateRule>> = Lazy::new(|| {
    BUILTIN_RULE_TABLE
        .iter()
        .map(|(id, family, pattern)| {
            BoilerplateRule::new(*id, *family, pattern).expect("built-in boilerplate pattern")
        })
        .collect()
});
