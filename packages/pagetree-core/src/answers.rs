//! Typed views over the per-element `answers` payload.
//!
//! At rest, `answers` is a JSON text blob per row. Layout kinds keep their
//! declared child specification inside it: rows as comma-separated integer
//! lists (`"columns": "4,4,4"`), carousels as a slide count. Everything the
//! engine does not understand stays an opaque [`serde_json::Value`].

use serde_json::{Map, Value};

use crate::model::ElementKind;

/// Declared child specification of a `row` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowAnswers {
    pub columns: Vec<i32>,
    pub mobile_sizes: Vec<i32>,
    pub mobile_order: Vec<i32>,
}

/// Declared child specification of a `carousel` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarouselAnswers {
    pub slides: i32,
}

/// Per-column sizing, written by the reconciler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnAnswers {
    pub size: i32,
    pub mobile_size: Option<i32>,
    pub mobile_order: Option<i32>,
}

/// Zero-based slot index of a carousel slide, written by the reconciler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideAnswers {
    pub slide: i32,
}

/// Kind-tagged configuration payload of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum Answers {
    Row(RowAnswers),
    Carousel(CarouselAnswers),
    Column(ColumnAnswers),
    Slide(SlideAnswers),
    /// Content kinds (text, image, ...) the engine carries through untouched.
    Leaf(Value),
}

impl Answers {
    /// Neutral payload for a kind; layout kinds declare zero children.
    pub fn default_for(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Row => Answers::Row(RowAnswers::default()),
            ElementKind::Carousel => Answers::Carousel(CarouselAnswers::default()),
            ElementKind::Column => Answers::Column(ColumnAnswers::default()),
            ElementKind::Slide => Answers::Slide(SlideAnswers::default()),
            ElementKind::Leaf(_) => Answers::Leaf(Value::Null),
        }
    }

    /// Parse a stored blob, requiring layout kinds to carry a well-formed
    /// child specification.
    pub fn parse(kind: &ElementKind, blob: Option<&str>) -> Result<Self, String> {
        let value = match blob {
            Some(text) if !text.trim().is_empty() => serde_json::from_str::<Value>(text)
                .map_err(|e| format!("answers is not valid JSON: {e}"))?,
            _ => Value::Null,
        };
        match kind {
            ElementKind::Row => RowAnswers::from_value(&value).map(Answers::Row),
            ElementKind::Carousel => CarouselAnswers::from_value(&value).map(Answers::Carousel),
            ElementKind::Column => Ok(Answers::Column(ColumnAnswers::from_value(&value))),
            ElementKind::Slide => Ok(Answers::Slide(SlideAnswers::from_value(&value))),
            ElementKind::Leaf(_) => Ok(Answers::Leaf(value)),
        }
    }

    /// Parse a stored blob, degrading malformed layout specifications to the
    /// kind's default (zero declared children) instead of failing.
    pub fn parse_lenient(kind: &ElementKind, blob: Option<&str>) -> Self {
        Self::parse(kind, blob).unwrap_or_else(|_| Self::default_for(kind))
    }

    /// Serialize back to the stored text form. `None` means no payload.
    pub fn to_blob(&self) -> Result<Option<String>, serde_json::Error> {
        let value = self.to_value();
        if value.is_null() {
            return Ok(None);
        }
        serde_json::to_string(&value).map(Some)
    }

    fn to_value(&self) -> Value {
        match self {
            Answers::Row(row) => {
                let mut obj = Map::new();
                obj.insert("columns".into(), Value::String(encode_csv(&row.columns)));
                if !row.mobile_sizes.is_empty() {
                    obj.insert(
                        "mobileSizes".into(),
                        Value::String(encode_csv(&row.mobile_sizes)),
                    );
                }
                if !row.mobile_order.is_empty() {
                    obj.insert(
                        "mobileOrder".into(),
                        Value::String(encode_csv(&row.mobile_order)),
                    );
                }
                Value::Object(obj)
            }
            Answers::Carousel(carousel) => {
                let mut obj = Map::new();
                obj.insert("slides".into(), Value::from(carousel.slides));
                Value::Object(obj)
            }
            Answers::Column(column) => {
                let mut obj = Map::new();
                obj.insert("size".into(), Value::from(column.size));
                if let Some(mobile_size) = column.mobile_size {
                    obj.insert("mobileSize".into(), Value::from(mobile_size));
                }
                if let Some(mobile_order) = column.mobile_order {
                    obj.insert("mobileOrder".into(), Value::from(mobile_order));
                }
                Value::Object(obj)
            }
            Answers::Slide(slide) => {
                let mut obj = Map::new();
                obj.insert("slide".into(), Value::from(slide.slide));
                Value::Object(obj)
            }
            Answers::Leaf(value) => value.clone(),
        }
    }
}

impl RowAnswers {
    fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "row answers missing".to_string())?;
        let columns = int_list_field(obj, "columns")
            .ok_or_else(|| "row answers has no usable columns list".to_string())?;
        if columns.is_empty() {
            return Err("row answers columns list is empty".into());
        }
        // Mobile overrides are best-effort; a bad list reads as absent.
        Ok(Self {
            columns,
            mobile_sizes: int_list_field(obj, "mobileSizes").unwrap_or_default(),
            mobile_order: int_list_field(obj, "mobileOrder").unwrap_or_default(),
        })
    }
}

impl CarouselAnswers {
    fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "carousel answers missing".to_string())?;
        let slides = obj
            .get("slides")
            .and_then(int_of)
            .ok_or_else(|| "carousel answers has no usable slide count".to_string())?;
        Ok(Self { slides })
    }
}

impl ColumnAnswers {
    fn from_value(value: &Value) -> Self {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => return Self::default(),
        };
        Self {
            size: obj.get("size").and_then(int_of).unwrap_or_default(),
            mobile_size: obj.get("mobileSize").and_then(int_of),
            mobile_order: obj.get("mobileOrder").and_then(int_of),
        }
    }
}

impl SlideAnswers {
    fn from_value(value: &Value) -> Self {
        let slide = value
            .as_object()
            .and_then(|obj| obj.get("slide"))
            .and_then(int_of)
            .unwrap_or_default();
        Self { slide }
    }
}

/// Accepts both JSON numbers and numeric strings; stored payloads mix the two.
fn int_of(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A field holding either a comma-separated list or a single integer.
/// `None` when the field is absent or any entry fails to parse.
fn int_list_field(obj: &Map<String, Value>, key: &str) -> Option<Vec<i32>> {
    match obj.get(key)? {
        Value::String(s) => parse_csv(s),
        other => int_of(other).map(|n| vec![n]),
    }
}

fn parse_csv(s: &str) -> Option<Vec<i32>> {
    s.split(',').map(|part| part.trim().parse().ok()).collect()
}

fn encode_csv(values: &[i32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_row_columns_and_overrides() {
        let blob = r#"{"columns":"4, 4 ,4","mobileSizes":"6,6,12","mobileOrder":"3,1,2"}"#;
        let answers = Answers::parse(&ElementKind::Row, Some(blob)).unwrap();
        assert_eq!(
            answers,
            Answers::Row(RowAnswers {
                columns: vec![4, 4, 4],
                mobile_sizes: vec![6, 6, 12],
                mobile_order: vec![3, 1, 2],
            })
        );
    }

    #[test]
    fn single_integer_column_spec_is_accepted() {
        let answers = Answers::parse(&ElementKind::Row, Some(r#"{"columns":12}"#)).unwrap();
        assert_eq!(
            answers,
            Answers::Row(RowAnswers {
                columns: vec![12],
                ..Default::default()
            })
        );
    }

    #[test]
    fn malformed_row_spec_errors_strictly_and_degrades_leniently() {
        for blob in [None, Some(""), Some("{}"), Some(r#"{"columns":"a,b"}"#), Some(r#"{"columns":""}"#)] {
            assert!(Answers::parse(&ElementKind::Row, blob).is_err(), "blob {blob:?}");
            assert_eq!(
                Answers::parse_lenient(&ElementKind::Row, blob),
                Answers::Row(RowAnswers::default())
            );
        }
    }

    #[test]
    fn bad_mobile_lists_read_as_absent() {
        let blob = r#"{"columns":"6,6","mobileSizes":"x,y"}"#;
        let answers = Answers::parse(&ElementKind::Row, Some(blob)).unwrap();
        assert_eq!(
            answers,
            Answers::Row(RowAnswers {
                columns: vec![6, 6],
                ..Default::default()
            })
        );
    }

    #[test]
    fn carousel_slide_count_accepts_string_form() {
        let answers = Answers::parse(&ElementKind::Carousel, Some(r#"{"slides":"3"}"#)).unwrap();
        assert_eq!(answers, Answers::Carousel(CarouselAnswers { slides: 3 }));
    }

    #[test]
    fn leaf_payload_round_trips_untouched() {
        let kind = ElementKind::Leaf("text".into());
        let blob = r#"{"text":"hello","alignment":"center"}"#;
        let answers = Answers::parse(&kind, Some(blob)).unwrap();
        let back = answers.to_blob().unwrap().unwrap();
        let reparsed = Answers::parse(&kind, Some(&back)).unwrap();
        assert_eq!(answers, reparsed);
    }

    #[test]
    fn row_blob_round_trips() {
        let answers = Answers::Row(RowAnswers {
            columns: vec![4, 8],
            mobile_sizes: vec![12, 12],
            mobile_order: vec![],
        });
        let blob = answers.to_blob().unwrap().unwrap();
        assert_eq!(Answers::parse(&ElementKind::Row, Some(&blob)).unwrap(), answers);
    }
}
