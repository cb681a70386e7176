use super::{evaluate, RawScoreInput, ScoreInputError, ScoreResult};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Outcome of scoring one CSV row. Rows are scored independently so a single
/// incomplete line does not abort the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// 1-based data line, not counting the header.
    pub line: usize,
    pub zip_code: Option<String>,
    pub input: RawScoreInput,
    pub outcome: Result<ScoreResult, ScoreInputError>,
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    income: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    market_rent: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    unit_quality: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    zip_code: Option<String>,
}

/// Score every row of a `rent,income,market_rent,unit_quality[,zip_code]` CSV.
///
/// Blank cells count as missing fields; cells that do not parse as numbers
/// abort with the underlying CSV error.
pub fn score_csv<R: Read>(reader: R) -> Result<Vec<BatchRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<ScoreRow>().enumerate() {
        let row = record?;
        let input = RawScoreInput {
            rent: row.rent,
            income: row.income,
            market_rent: row.market_rent,
            unit_quality: row.unit_quality,
        };

        rows.push(BatchRow {
            line: index + 1,
            zip_code: row.zip_code,
            outcome: evaluate(&input),
            input,
        });
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Verdict;
    use std::io::Cursor;

    #[test]
    fn scores_each_row_independently() {
        let csv = "rent,income,market_rent,unit_quality,zip_code\n\
                   1500,5000,1600,8,90210\n\
                   2500,,2000,5,\n\
                   2000,6000,1800,7,10001\n";

        let rows = score_csv(Cursor::new(csv)).expect("csv parses");
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].zip_code.as_deref(), Some("90210"));
        let first = rows[0].outcome.as_ref().expect("first row scores");
        assert_eq!((first.score, first.verdict), (90, Verdict::Fair));

        assert_eq!(
            rows[1].outcome,
            Err(ScoreInputError::MissingFields(vec!["income"]))
        );
        assert_eq!(rows[1].zip_code, None);

        let third = rows[2].outcome.as_ref().expect("third row scores");
        assert_eq!((third.score, third.verdict), (25, Verdict::Predatory));
    }

    #[test]
    fn non_finite_cells_are_rejected_per_row() {
        let csv = "rent,income,market_rent,unit_quality\n\
                   1500,inf,1600,8\n\
                   NaN,5000,1600,8\n\
                   1500,5000,1600,8\n";

        let rows = score_csv(Cursor::new(csv)).expect("csv parses");
        assert_eq!(
            rows[0].outcome,
            Err(ScoreInputError::NonFinite(vec!["income"]))
        );
        assert_eq!(rows[1].outcome, Err(ScoreInputError::NonFinite(vec!["rent"])));
        assert!(rows[2].outcome.is_ok());
    }

    #[test]
    fn non_numeric_cells_abort_the_batch() {
        let csv = "rent,income,market_rent,unit_quality\nabc,5000,1600,8\n";
        assert!(score_csv(Cursor::new(csv)).is_err());
    }
}
