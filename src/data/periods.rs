//! Reporting periods: documents paired with their parsed `end_date`.

use chrono::NaiveDateTime;

use super::fields;
use crate::error::TransformError;
use crate::source::Document;

/// Field holding the end of a reporting period.
pub const END_DATE: &str = "end_date";

/// A document together with its parsed end date.
#[derive(Debug, Clone, Copy)]
pub struct Period<'a> {
    pub end: NaiveDateTime,
    pub doc: &'a Document,
}

/// Parse each document's `end_date` and sort ascending.
///
/// Documents come paired with their position in the fetched collection,
/// which is what [`TransformError::MissingDate`] reports, so callers can
/// filter before calling. The sort is stable, so periods sharing an end
/// date keep their fetched order. The first missing or malformed date
/// aborts with an error.
pub fn chronological<'a, I, F>(docs: I, parse: F) -> Result<Vec<Period<'a>>, TransformError>
where
    I: IntoIterator<Item = (usize, &'a Document)>,
    F: Fn(&str) -> Result<NaiveDateTime, TransformError>,
{
    let mut periods = docs
        .into_iter()
        .map(|(index, doc)| {
            let text =
                fields::text(doc, END_DATE).ok_or(TransformError::MissingDate { index })?;
            Ok(Period {
                end: parse(text)?,
                doc,
            })
        })
        .collect::<Result<Vec<_>, TransformError>>()?;

    periods.sort_by_key(|p| p.end);
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DateFormats;
    use serde_json::json;

    fn docs(values: serde_json::Value) -> Vec<Document> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn test_sorted_ascending_and_stable() {
        let docs = docs(json!([
            { "end_date": "02/02/19-00:00:00", "tag": "late" },
            { "end_date": "01/05/19-00:00:00", "tag": "first" },
            { "end_date": "01/12/19-00:00:00", "tag": "tie-a" },
            { "end_date": "01/12/19-00:00:00", "tag": "tie-b" },
        ]));
        let formats = DateFormats::default();

        let periods = chronological(docs.iter().enumerate(), |t| formats.parse(t)).unwrap();
        let tags: Vec<_> = periods.iter().map(|p| p.doc["tag"].as_str().unwrap()).collect();

        assert_eq!(tags, ["first", "tie-a", "tie-b", "late"]);
        assert!(periods.windows(2).all(|w| w[0].end <= w[1].end));
    }

    #[test]
    fn test_missing_date_is_an_error() {
        let docs = docs(json!([{ "end_date": "01/05/19-00:00:00" }, { "allocated": 3 }]));
        let formats = DateFormats::default();

        let err = chronological(docs.iter().enumerate(), |t| formats.parse(t)).unwrap_err();
        assert_eq!(err, TransformError::MissingDate { index: 1 });
    }

    #[test]
    fn test_missing_date_reports_fetched_position() {
        let docs = docs(json!([
            { "end_date": "01/05/19-00:00:00", "keep": false },
            { "end_date": "01/12/19-00:00:00", "keep": true },
            { "keep": false },
            { "keep": true },
        ]));
        let formats = DateFormats::default();

        let kept = docs.iter().enumerate().filter(|(_, d)| d["keep"] == true);
        let err = chronological(kept, |t| formats.parse(t)).unwrap_err();
        assert_eq!(err, TransformError::MissingDate { index: 3 });
    }

    #[test]
    fn test_malformed_date_aborts() {
        let docs = docs(json!([{ "end_date": "2019-01-05" }]));
        let formats = DateFormats::default();

        assert!(matches!(
            chronological(docs.iter().enumerate(), |t| formats.parse(t)),
            Err(TransformError::MalformedDate { .. })
        ));
    }
}
