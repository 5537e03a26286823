use std::{
    collections::VecDeque,
    fs::{create_dir_all, File},
    io::{BufWriter, Result as IoResult, Write},
    path::Path,
};

use serde::Serialize;
use serde_json::{
    ser::{Formatter, PrettyFormatter},
    Serializer, Value,
};

pub mod log_intents;

const MAX_INLINE_ARRAY_LEN: usize = 4;

pub fn dump_json<T>(path: impl AsRef<Path>, value: &T) -> anyhow::Result<()>
where
    T: ?Sized + Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let value = serde_json::to_value(value)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_compact(&mut writer, &value, MAX_INLINE_ARRAY_LEN)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn write_compact<W: Write>(
    writer: W,
    value: &Value,
    max_inline_len: usize,
) -> serde_json::Result<()> {
    let formatter = CompactArrayFormatter::new(value, max_inline_len);
    value.serialize(&mut Serializer::with_formatter(writer, formatter))
}

/// Pretty printer that keeps short arrays of scalars, such as `[lon, lat]`
/// pairs, on one line.
struct CompactArrayFormatter {
    inner: PrettyFormatter<'static>,
    // inline flag of every array in the value, in serialization order
    plan: VecDeque<bool>,
    open: Vec<bool>,
}

impl CompactArrayFormatter {
    fn new(value: &Value, max_inline_len: usize) -> Self {
        let mut plan = VecDeque::new();
        Self::plan_arrays(value, max_inline_len, &mut plan);
        Self {
            inner: PrettyFormatter::with_indent(b"  "),
            plan,
            open: Vec::new(),
        }
    }

    fn plan_arrays(value: &Value, max_inline_len: usize, plan: &mut VecDeque<bool>) {
        match value {
            Value::Array(items) => {
                plan.push_back(
                    items.len() <= max_inline_len
                        && items
                            .iter()
                            .all(|v| !matches!(v, Value::Array(_) | Value::Object(_))),
                );
                for item in items {
                    Self::plan_arrays(item, max_inline_len, plan);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    Self::plan_arrays(item, max_inline_len, plan);
                }
            }
            _ => {}
        }
    }

    fn inline(&self) -> bool {
        self.open.last() == Some(&true)
    }
}

impl Formatter for CompactArrayFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        let inline = self.plan.pop_front().unwrap_or(false);
        self.open.push(inline);
        if inline {
            writer.write_all(b"[")
        } else {
            self.inner.begin_array(writer)
        }
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        match self.open.pop() {
            Some(true) => writer.write_all(b"]"),
            _ => self.inner.end_array(writer),
        }
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> IoResult<()> {
        if !self.inline() {
            self.inner.begin_array_value(writer, first)
        } else if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        if self.inline() {
            Ok(())
        } else {
            self.inner.end_array_value(writer)
        }
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> IoResult<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> IoResult<()> {
        self.inner.end_object_value(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value, max_inline_len: usize) -> String {
        let mut out = Vec::new();
        write_compact(&mut out, value, max_inline_len).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn short_scalar_arrays_stay_inline() {
        let value = json!({
            "id": "driver-1",
            "coordinates": [[114.1, 22.3], [114.2, 22.4]],
            "empty": []
        });
        let out = render(&value, 4);
        assert!(out.contains("[114.1, 22.3]"), "{out}");
        assert!(out.contains("\"empty\": []"), "{out}");
        assert!(out.contains("\"coordinates\": [\n"), "{out}");
        let reparsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn long_arrays_and_strings_use_serde_layout() {
        let value = json!([{"id": "say \"hi\"\n", "ticks": [1, 2, 3, 4, 5]}, [true, null]]);
        let out = render(&value, 4);
        assert!(!out.contains("[1, 2"), "{out}");
        assert!(out.contains("[true, null]"), "{out}");
        assert!(out.contains(r#""say \"hi\"\n""#), "{out}");
        let reparsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reparsed, value);
    }
}
