//! Streaming JSON array assembly.
//!
//! Archives hold tens of thousands of instance documents, so records are
//! serialized as they are produced instead of buffering the whole set. The
//! writer emits an opening bracket up front, a 4-space pretty-printed
//! fragment per record with separators in between, and the closing bracket
//! on [`RecordWriter::finish`]. The accumulated text is byte-identical to
//! serializing the full record list at once through [`to_json_pretty`],
//! including `[]` when nothing was written.

use crate::error::Result;
use crate::record::Record;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;

const INDENT: &[u8] = b"    ";

/// Serializes a full record list with the same 4-space layout the
/// streaming writer produces. Mostly useful for tests and small batches;
/// prefer [`RecordWriter`] for whole archives.
pub fn to_json_pretty(records: &[Record]) -> Result<String> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

/// Incremental serializer for a JSON array of [`Record`]s.
///
/// Dropping a writer without calling [`finish`](Self::finish) leaves the
/// sink holding an unterminated fragment; callers treat that path as a
/// failed extraction and discard the sink, so partial text never escapes as
/// a success result.
pub struct RecordWriter<W: Write> {
    sink: W,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Opens the array on `sink`.
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write_all(b"[")?;
        Ok(Self { sink, written: 0 })
    }

    /// Appends one record, with a separator when needed.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        if self.written > 0 {
            self.sink.write_all(b",")?;
        }
        self.sink.write_all(b"\n")?;

        let mut fragment = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut fragment, formatter);
        record.serialize(&mut serializer)?;

        // Re-indent the fragment one level so it sits inside the array.
        for (i, line) in fragment.split(|b| *b == b'\n').enumerate() {
            if i > 0 {
                self.sink.write_all(b"\n")?;
            }
            self.sink.write_all(INDENT)?;
            self.sink.write_all(line)?;
        }

        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Closes the array, flushes, and hands the sink back.
    pub fn finish(mut self) -> Result<W> {
        if self.written > 0 {
            self.sink.write_all(b"\n")?;
        }
        self.sink.write_all(b"]")?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FactValue;
    use chrono::NaiveDate;

    fn sample(mdrm: &str, value: FactValue) -> Record {
        Record::new(
            mdrm,
            "123456",
            NaiveDate::from_ymd_opt(2009, 6, 30).unwrap(),
            value,
        )
    }

    fn stream(records: &[Record]) -> String {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        for record in records {
            writer.write(record).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(stream(&[]), "[]");
    }

    #[test]
    fn test_matches_whole_list_serialization() {
        let records = vec![
            sample("RCFD2170", FactValue::Int(5000)),
            sample("UBPRE001", FactValue::Float(0.1234)),
            sample("TEXT9000", FactValue::Str("2009-06-30".into())),
        ];
        assert_eq!(stream(&records), to_json_pretty(&records).unwrap());
    }

    #[test]
    fn test_single_record_matches() {
        let records = vec![sample("FLAG0001", FactValue::Bool(true))];
        assert_eq!(stream(&records), to_json_pretty(&records).unwrap());
    }

    #[test]
    fn test_four_space_indent() {
        let records = vec![sample("RCFD2170", FactValue::Int(5000))];
        let text = stream(&records);
        assert!(text.starts_with("[\n    {\n        \"mdrm\": \"RCFD2170\","));
        assert!(text.ends_with("\n    }\n]"));
    }

    #[test]
    fn test_output_is_parseable() {
        let records = vec![
            sample("RCFD2170", FactValue::Int(5000)),
            sample("RCFD2170", FactValue::Int(6000)),
        ];
        let text = stream(&records);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_written_count() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        assert_eq!(writer.written(), 0);
        writer.write(&sample("RCFD2170", FactValue::Int(1))).unwrap();
        writer.write(&sample("RCFD2171", FactValue::Int(2))).unwrap();
        assert_eq!(writer.written(), 2);
    }
}
