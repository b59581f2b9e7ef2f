//! JSON-tree backend shared by the verbose and concise profiles.

use jadn_pack::Value;
use serde_json::{Map, Number};

use super::decode::Decoder;
use super::encode::Encoder;
use super::{Fault, WireKey};
use crate::format::BinaryText;

type Json = serde_json::Value;

enum Building {
    Array(Vec<Json>),
    Object(Map<String, Json>, Option<String>),
}

/// Builds a `serde_json::Value` bottom-up.
#[derive(Default)]
pub(crate) struct JsonEncoder {
    stack: Vec<Building>,
    root: Option<Json>,
}

impl JsonEncoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(self) -> Json {
        self.root.unwrap_or(Json::Null)
    }

    fn push(&mut self, v: Json) {
        match self.stack.last_mut() {
            Some(Building::Array(items)) => items.push(v),
            Some(Building::Object(obj, key)) => {
                obj.insert(key.take().unwrap_or_default(), v);
            }
            None => self.root = Some(v),
        }
    }
}

impl Encoder for JsonEncoder {
    fn slot(&mut self, present: bool) {
        if !present {
            self.push(Json::Null);
        }
    }

    fn boolean(&mut self, b: bool) {
        self.push(Json::Bool(b));
    }

    fn integer(&mut self, n: i64) {
        self.push(Json::from(n));
    }

    fn number(&mut self, x: f64) -> Result<(), Fault> {
        let n = Number::from_f64(x)
            .ok_or_else(|| Fault::invalid(format!("{x} has no JSON representation")))?;
        self.push(Json::Number(n));
        Ok(())
    }

    fn string(&mut self, s: &str) {
        self.push(Json::String(s.to_string()));
    }

    fn binary(&mut self, b: &[u8], text: BinaryText) -> Result<(), Fault> {
        let s = text
            .encode(b)
            .ok_or_else(|| Fault::invalid(format!("{} bytes have no {text:?} form", b.len())))?;
        self.push(Json::String(s));
        Ok(())
    }

    fn begin_array(&mut self, len: usize) {
        self.stack.push(Building::Array(Vec::with_capacity(len)));
    }

    fn end_array(&mut self) {
        if let Some(Building::Array(items)) = self.stack.pop() {
            self.push(Json::Array(items));
        }
    }

    fn begin_map(&mut self, len: usize) {
        self.stack
            .push(Building::Object(Map::with_capacity(len), None));
    }

    fn key(&mut self, key: WireKey) -> Result<(), Fault> {
        let Some(Building::Object(obj, pending)) = self.stack.last_mut() else {
            return Err(Fault::invalid("key outside of an object"));
        };
        let key = match key {
            WireKey::Tag(t) => t.to_string(),
            WireKey::Text(s) => s,
        };
        if obj.contains_key(&key) {
            return Err(Fault::invalid(format!("duplicate key '{key}'")));
        }
        *pending = Some(key);
        Ok(())
    }

    fn end_map(&mut self) {
        if let Some(Building::Object(obj, _)) = self.stack.pop() {
            self.push(Json::Object(obj));
        }
    }

    fn any(&mut self, value: &Value, max_depth: usize) -> Result<(), Fault> {
        if value.nests_deeper_than(max_depth) {
            return Err(Fault::TooDeep);
        }
        let json = jadn_pack::to_json(value).map_err(|e| Fault::invalid(e.to_string()))?;
        self.push(json);
        Ok(())
    }
}

enum Reading {
    Array(std::iter::Peekable<std::vec::IntoIter<Json>>),
    Object(serde_json::map::IntoIter, Option<Json>),
}

/// Pulls values out of an owned `serde_json::Value` in document order.
pub(crate) struct JsonDecoder {
    root: Option<Json>,
    stack: Vec<Reading>,
}

impl JsonDecoder {
    pub(crate) fn new(json: Json) -> Self {
        Self {
            root: Some(json),
            stack: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<Json, Fault> {
        match self.stack.last_mut() {
            None => self
                .root
                .take()
                .ok_or_else(|| Fault::invalid("unexpected end of document")),
            Some(Reading::Array(items)) => items
                .next()
                .ok_or_else(|| Fault::invalid("array has too few elements")),
            Some(Reading::Object(_, pending)) => pending
                .take()
                .ok_or_else(|| Fault::invalid("object value read before its key")),
        }
    }
}

fn kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn expected(what: &str, got: &Json) -> Fault {
    Fault::invalid(format!("expected {what}, got {}", kind(got)))
}

fn depth(v: &Json) -> usize {
    match v {
        Json::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Json::Object(obj) => 1 + obj.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

impl Decoder for JsonDecoder {
    fn slot(&mut self) -> Result<bool, Fault> {
        match self.stack.last_mut() {
            Some(Reading::Array(items)) => {
                if matches!(items.peek(), Some(Json::Null)) {
                    items.next();
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            _ => Err(Fault::invalid("optional slot outside of an array")),
        }
    }

    fn boolean(&mut self) -> Result<bool, Fault> {
        match self.next()? {
            Json::Bool(b) => Ok(b),
            other => Err(expected("boolean", &other)),
        }
    }

    fn integer(&mut self) -> Result<i64, Fault> {
        match self.next()? {
            Json::Number(n) => n
                .as_i64()
                .ok_or_else(|| Fault::invalid(format!("{n} is not a 64-bit integer"))),
            other => Err(expected("integer", &other)),
        }
    }

    fn number(&mut self) -> Result<f64, Fault> {
        match self.next()? {
            Json::Number(n) => n
                .as_f64()
                .ok_or_else(|| Fault::invalid(format!("{n} is not a number"))),
            other => Err(expected("number", &other)),
        }
    }

    fn string(&mut self) -> Result<String, Fault> {
        match self.next()? {
            Json::String(s) => Ok(s),
            other => Err(expected("string", &other)),
        }
    }

    fn binary(&mut self, text: BinaryText) -> Result<Vec<u8>, Fault> {
        let s = self.string()?;
        text.decode(&s)
            .ok_or_else(|| Fault::invalid(format!("'{s}' is not valid {text:?} text")))
    }

    fn begin_array(&mut self) -> Result<usize, Fault> {
        match self.next()? {
            Json::Array(items) => {
                let len = items.len();
                self.stack.push(Reading::Array(items.into_iter().peekable()));
                Ok(len)
            }
            other => Err(expected("array", &other)),
        }
    }

    fn end_array(&mut self) -> Result<(), Fault> {
        match self.stack.pop() {
            Some(Reading::Array(mut items)) => match items.next() {
                None => Ok(()),
                Some(_) => Err(Fault::invalid("array has too many elements")),
            },
            _ => Err(Fault::invalid("unbalanced array")),
        }
    }

    fn begin_map(&mut self) -> Result<usize, Fault> {
        match self.next()? {
            Json::Object(obj) => {
                let len = obj.len();
                self.stack.push(Reading::Object(obj.into_iter(), None));
                Ok(len)
            }
            other => Err(expected("object", &other)),
        }
    }

    fn key(&mut self) -> Result<WireKey, Fault> {
        match self.stack.last_mut() {
            Some(Reading::Object(entries, pending)) => {
                let (k, v) = entries
                    .next()
                    .ok_or_else(|| Fault::invalid("object has too few entries"))?;
                *pending = Some(v);
                Ok(WireKey::Text(k))
            }
            _ => Err(Fault::invalid("key outside of an object")),
        }
    }

    fn end_map(&mut self) -> Result<(), Fault> {
        match self.stack.pop() {
            Some(Reading::Object(..)) => Ok(()),
            _ => Err(Fault::invalid("unbalanced object")),
        }
    }

    fn any(&mut self, max_depth: usize) -> Result<Value, Fault> {
        let json = self.next()?;
        if depth(&json) > max_depth {
            return Err(Fault::TooDeep);
        }
        Ok(Value::from(json))
    }

    fn finish(&mut self) -> Result<(), Fault> {
        if self.stack.is_empty() && self.root.is_none() {
            Ok(())
        } else {
            Err(Fault::invalid("document has unread content"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encoder_builds_nested_tree() {
        let mut e = JsonEncoder::new();
        e.begin_map(2);
        e.key(WireKey::Tag(1)).unwrap();
        e.integer(3);
        e.key(WireKey::Text("tail".into())).unwrap();
        e.begin_array(2);
        e.slot(false);
        e.string("x");
        e.end_array();
        e.end_map();
        assert_eq!(e.finish(), json!({"1": 3, "tail": [null, "x"]}));
    }

    #[test]
    fn encoder_rejects_non_finite() {
        let mut e = JsonEncoder::new();
        assert!(matches!(e.number(f64::NAN), Err(Fault::Invalid(_))));
    }

    #[test]
    fn decoder_slot_consumes_null_only() {
        let mut d = JsonDecoder::new(json!([null, 5]));
        assert_eq!(d.begin_array().unwrap(), 2);
        assert!(!d.slot().unwrap());
        assert!(d.slot().unwrap());
        assert_eq!(d.integer().unwrap(), 5);
        d.end_array().unwrap();
        d.finish().unwrap();
    }

    #[test]
    fn decoder_reports_kind_mismatch() {
        let mut d = JsonDecoder::new(json!("3"));
        match d.integer() {
            Err(Fault::Invalid(msg)) => assert_eq!(msg, "expected integer, got string"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decoder_any_checks_depth() {
        let mut d = JsonDecoder::new(json!([[[1]]]));
        assert!(matches!(d.any(2), Err(Fault::TooDeep)));
    }
}
