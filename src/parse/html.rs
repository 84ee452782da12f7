//! Extraction rules for competition detail pages.

use scraper::{ElementRef, Html, Selector};

use crate::record::DiscoveredRecord;

use super::{PageParser, ParseError};

/// Label of the `<dt>` whose `<dd>` holds the competition date.
pub const DEFAULT_DATE_LABEL: &str = "日期";

/// Parser for the host's competition page layout.
///
/// Name comes from `h1.heading-title` (last one wins), events from the `dd`
/// right after `dt#events`, date from the `dd` right after the `dt` labelled
/// with the date label. A page with no title is rejected.
#[derive(Debug, Clone)]
pub struct HtmlPageParser {
    title: Selector,
    events: Selector,
    dt: Selector,
    date_label: String,
}

impl HtmlPageParser {
    /// Compiles selectors for the given date label.
    pub fn new(date_label: impl Into<String>) -> Result<Self, ParseError> {
        Ok(Self {
            title: selector("h1.heading-title")?,
            events: selector("dt#events")?,
            dt: selector("dt")?,
            date_label: date_label.into(),
        })
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, id: &str, url: &str, body: &[u8]) -> Result<DiscoveredRecord, ParseError> {
        let text = String::from_utf8_lossy(body);
        let doc = Html::parse_document(&text);

        let name = doc
            .select(&self.title)
            .last()
            .map(element_text)
            .filter(|s| !s.is_empty())
            .ok_or(ParseError::MissingField("name"))?;

        let events = doc
            .select(&self.events)
            .filter_map(next_dd)
            .last()
            .map(element_text)
            .unwrap_or_default();

        let date = doc
            .select(&self.dt)
            .filter(|dt| element_text(*dt) == self.date_label)
            .filter_map(next_dd)
            .last()
            .map(element_text)
            .unwrap_or_default();

        Ok(DiscoveredRecord {
            id: id.to_string(),
            url: url.to_string(),
            name,
            date,
            events,
        })
    }
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{css}: {e:?}")))
}

/// The element sibling immediately after `el`, if it is a `<dd>`.
fn next_dd(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|sib| sib.value().name() == "dd")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <h1 class="heading-title">Beijing Spring 2024</h1>
        <dl>
          <dt>日期</dt><dd> 2024-03-16 ~ 2024-03-17 </dd>
          <dt id="events">项目</dt>
          <dd>3x3x3 2x2x2 Pyraminx</dd>
        </dl>
    </body></html>"#;

    #[test]
    fn extracts_fields() {
        let parser = HtmlPageParser::new(DEFAULT_DATE_LABEL).unwrap();
        let rec = parser
            .parse("Beijing-Spring-2024", "https://host/Beijing-Spring-2024", PAGE.as_bytes())
            .unwrap();
        assert_eq!(rec.name, "Beijing Spring 2024");
        assert_eq!(rec.date, "2024-03-16 ~ 2024-03-17");
        assert_eq!(rec.events, "3x3x3 2x2x2 Pyraminx");
        assert_eq!(rec.id, "Beijing-Spring-2024");
    }

    #[test]
    fn missing_title_is_error() {
        let parser = HtmlPageParser::new(DEFAULT_DATE_LABEL).unwrap();
        let err = parser
            .parse("x", "u", b"<html><body><p>Not found</p></body></html>")
            .unwrap_err();
        assert_eq!(err, ParseError::MissingField("name"));
    }

    #[test]
    fn dt_without_dd_leaves_field_empty() {
        let parser = HtmlPageParser::new(DEFAULT_DATE_LABEL).unwrap();
        let page = r#"<h1 class="heading-title">X</h1><dl><dt id="events">E</dt><dt>日期</dt></dl>"#;
        let rec = parser.parse("x", "u", page.as_bytes()).unwrap();
        assert_eq!(rec.events, "");
        assert_eq!(rec.date, "");
    }
}
