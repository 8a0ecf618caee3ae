use std::collections::HashMap;

use winnow::prelude::*;
use winnow::token::take_while;

use crate::raw::RawAnnotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKey {
    Contributor,
    Date,
    ProvidedBy,
    Source,
    Evidence,
    With,
    Title,
    State,
    ConformsToGpad,
    Comment,
    Other,
}

impl AnnotationKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "contributor" => Self::Contributor,
            "date" => Self::Date,
            "providedBy" => Self::ProvidedBy,
            "source" => Self::Source,
            "evidence" => Self::Evidence,
            "with" => Self::With,
            "title" => Self::Title,
            "state" => Self::State,
            "conforms-to-gpad" => Self::ConformsToGpad,
            "comment" => Self::Comment,
            _ => Self::Other,
        }
    }
}

/// Annotation list decoded once into typed fields.
///
/// Scalar fields keep the last value seen; list fields keep every value in
/// input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub contributors: Vec<String>,
    pub groups: Vec<String>,
    pub evidence: Vec<String>,
    pub comments: Vec<String>,
    pub date: Option<String>,
    pub source: Option<String>,
    pub with: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub conforms_to_gpad: Option<String>,
}

impl Annotations {
    pub fn decode(raw: &[RawAnnotation]) -> Self {
        let mut decoded = Self::default();
        for annotation in raw {
            let value = annotation.value.clone();
            match AnnotationKey::parse(&annotation.key) {
                AnnotationKey::Contributor => decoded.contributors.push(value),
                AnnotationKey::ProvidedBy => decoded.groups.push(value),
                AnnotationKey::Evidence => decoded.evidence.push(value),
                AnnotationKey::Comment => decoded.comments.push(value),
                AnnotationKey::Date => decoded.date = Some(value),
                AnnotationKey::Source => decoded.source = Some(value),
                AnnotationKey::With => decoded.with = Some(value),
                AnnotationKey::Title => decoded.title = Some(value),
                AnnotationKey::State => decoded.state = Some(value),
                AnnotationKey::ConformsToGpad => decoded.conforms_to_gpad = Some(value),
                AnnotationKey::Other => {}
            }
        }
        decoded
    }

    pub fn contributor(&self) -> Option<&str> {
        self.contributors.last().map(String::as_str)
    }

    pub fn group(&self) -> Option<&str> {
        self.groups.last().map(String::as_str)
    }

    pub fn conforms_to_gpad(&self) -> bool {
        self.conforms_to_gpad.as_deref().map(str::trim) == Some("true")
    }
}

/// First occurrence creates an entry with frequency 1; repeats increment it.
/// Entries stay in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTally {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl FrequencyTally {
    pub fn record(&mut self, value: &str) {
        match self.index.get(value) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push((value.to_string(), 1));
            }
        }
    }

    pub fn record_all<'a>(&mut self, values: impl IntoIterator<Item = &'a String>) {
        for value in values {
            self.record(value);
        }
    }

    pub fn into_entries(self) -> Vec<(String, u32)> {
        self.entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

/// Parse the leading `YYYY-MM-DD` of an annotation date. Anything after the
/// day (a time, a zone) is ignored.
pub fn parse_date(value: &str) -> Option<CalendarDate> {
    let mut input = value.trim();
    calendar_date
        .parse_next(&mut input)
        .ok()
        .filter(|d| (1..=12).contains(&d.month) && (1..=31).contains(&d.day))
}

fn calendar_date(input: &mut &str) -> winnow::Result<CalendarDate> {
    let year = digits(4).parse_next(input)?;
    '-'.parse_next(input)?;
    let month = digits(2).parse_next(input)?;
    '-'.parse_next(input)?;
    let day = digits(2).parse_next(input)?;
    Ok(CalendarDate { year, month, day })
}

fn digits<'s>(count: usize) -> impl Parser<&'s str, u32, winnow::error::ContextError> {
    take_while(count, |c: char| c.is_ascii_digit()).try_map(str::parse::<u32>)
}

/// Latest of the given date strings by calendar date. Strings that do not
/// parse are ignored; ties keep the first one seen.
pub fn latest_date<'a>(dates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(CalendarDate, &str)> = None;
    for raw in dates {
        let Some(parsed) = parse_date(raw) else {
            continue;
        };
        if best.is_none_or(|(current, _)| parsed > current) {
            best = Some((parsed, raw));
        }
    }
    best.map(|(_, raw)| raw)
}
