//! Message parts and their data streams.

use super::{Disposable, PropertyStore};
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use uuid::Uuid;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF32LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// A readable, seekable byte stream owned by a [`Part`].
pub trait DataStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> DataStream for T {}

/// The size of a part's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSize {
    /// Length of the stream in bytes.
    pub bytes: u64,
    /// Whether the size came from the stream itself rather than being
    /// computed by seeking. Always false for in-memory parts.
    pub natively_known: bool,
}

/// A named unit of a message: one data stream plus its own properties.
///
/// The part exclusively owns its stream. Handing the same underlying stream
/// to two parts is a caller error. [`Part::dispose`] releases the stream
/// once; later calls do nothing.
pub struct Part {
    id: Uuid,
    content_type: Option<String>,
    charset: Option<String>,
    data: Option<Box<dyn DataStream>>,
    properties: PropertyStore,
    disposed: bool,
}

impl Part {
    /// Creates an empty part with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            content_type: None,
            charset: None,
            data: None,
            properties: PropertyStore::new(),
            disposed: false,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the data stream.
    #[must_use]
    pub fn with_data<S: DataStream + 'static>(mut self, stream: S) -> Self {
        self.data = Some(Box::new(stream));
        self
    }

    /// Sets the data stream to an in-memory copy of `bytes`.
    #[must_use]
    pub fn with_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_data(Cursor::new(bytes.into()))
    }

    /// Sets the data stream to the UTF-8 encoding of `text`.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.with_bytes(text.as_bytes().to_vec())
    }

    /// Sets the part properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertyStore) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the part identity.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Returns the charset.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Sets the charset.
    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.charset = Some(charset.into());
    }

    /// Returns the part properties.
    #[must_use]
    pub const fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Returns the part properties for mutation.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    /// Replaces the part properties.
    pub fn set_properties(&mut self, properties: PropertyStore) {
        self.properties = properties;
    }

    /// Returns the data stream.
    pub fn data(&mut self) -> Option<&mut (dyn DataStream + 'static)> {
        self.data.as_deref_mut()
    }

    /// Returns the original data stream.
    ///
    /// Parts keep a single stream, so this is the same stream as [`Part::data`].
    pub fn original_data_stream(&mut self) -> Option<&mut (dyn DataStream + 'static)> {
        self.data()
    }

    /// Returns true if the part holds a data stream.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Replaces the data stream, dropping the previous one.
    pub fn set_data<S: DataStream + 'static>(&mut self, stream: S) {
        self.data = Some(Box::new(stream));
    }

    /// Removes and returns the data stream.
    pub fn take_data(&mut self) -> Option<Box<dyn DataStream>> {
        self.data.take()
    }

    /// Reports the stream length without moving the stream position.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the stream cannot seek.
    pub fn size(&mut self) -> io::Result<PartSize> {
        let bytes = match self.data.as_deref_mut() {
            Some(stream) => {
                let position = stream.stream_position()?;
                let end = stream.seek(SeekFrom::End(0))?;
                stream.seek(SeekFrom::Start(position))?;
                end
            }
            None => 0,
        };

        Ok(PartSize {
            bytes,
            natively_known: false,
        })
    }

    /// Reads the whole stream from the start, leaving it rewound.
    ///
    /// Returns `None` if the part has no stream.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the stream cannot be read.
    pub fn read_bytes(&mut self) -> io::Result<Option<Vec<u8>>> {
        let Some(stream) = self.data.as_deref_mut() else {
            return Ok(None);
        };

        stream.rewind()?;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        stream.rewind()?;
        Ok(Some(buf))
    }

    /// Reads the whole stream as UTF-8 text, leaving it rewound.
    ///
    /// A leading UTF-8 byte order mark is dropped.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the stream cannot be read or is not UTF-8.
    pub fn read_text(&mut self) -> io::Result<Option<String>> {
        self.read_bytes()?.map(decode_text).transpose()
    }

    /// Returns true once the part has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Disposable for Part {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if self.data.take().is_some() {
            tracing::trace!(part_id = %self.id, "Released part data stream");
        }
        self.disposed = true;
    }
}

impl Default for Part {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("charset", &self.charset)
            .field("has_data", &self.data.is_some())
            .field("properties", &self.properties.count())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Decodes stream bytes as text.
///
/// A leading UTF-8, UTF-16 or UTF-32 byte order mark selects the encoding and
/// is dropped. Without one the bytes are read as UTF-8.
pub(crate) fn decode_text(mut bytes: Vec<u8>) -> io::Result<String> {
    if bytes.starts_with(UTF32LE_BOM) {
        return decode_utf32(&bytes[UTF32LE_BOM.len()..], u32::from_le_bytes);
    }
    if bytes.starts_with(UTF32BE_BOM) {
        return decode_utf32(&bytes[UTF32BE_BOM.len()..], u32::from_be_bytes);
    }
    if bytes.starts_with(UTF16LE_BOM) {
        return decode_utf16(&bytes[UTF16LE_BOM.len()..], u16::from_le_bytes);
    }
    if bytes.starts_with(UTF16BE_BOM) {
        return decode_utf16(&bytes[UTF16BE_BOM.len()..], u16::from_be_bytes);
    }
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> io::Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(invalid_data("truncated utf-16 code unit"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> io::Result<String> {
    if bytes.len() % 4 != 0 {
        return Err(invalid_data("truncated utf-32 code unit"));
    }
    bytes
        .chunks_exact(4)
        .map(|quad| {
            let value = unit([quad[0], quad[1], quad[2], quad[3]]);
            char::from_u32(value)
                .ok_or_else(|| invalid_data(&format!("invalid utf-32 code point {value:#x}")))
        })
        .collect()
}

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_part_is_empty() {
        let mut part = Part::new();
        assert!(part.content_type().is_none());
        assert!(!part.has_data());
        assert!(part.properties().is_empty());
        assert_eq!(part.read_text().unwrap(), None);
    }

    #[test]
    fn test_parts_have_distinct_ids() {
        assert_ne!(Part::new().id(), Part::new().id());
    }

    #[test]
    fn test_size_keeps_position() {
        let mut part = Part::new().with_text("hello world");
        let stream = part.data().unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();

        let size = part.size().unwrap();
        assert_eq!(size.bytes, 11);
        assert!(!size.natively_known);
        assert_eq!(part.data().unwrap().stream_position().unwrap(), 5);
    }

    #[test]
    fn test_read_text_rewinds() {
        let mut part = Part::new().with_text("<a/>");
        assert_eq!(part.read_text().unwrap().as_deref(), Some("<a/>"));
        assert_eq!(part.read_text().unwrap().as_deref(), Some("<a/>"));
    }

    #[test]
    fn test_read_text_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"hello");
        let mut part = Part::new().with_bytes(bytes);

        assert_eq!(part.read_text().unwrap().as_deref(), Some("hello"));
        assert_eq!(part.size().unwrap().bytes, 8);
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let mut part = Part::new().with_bytes(vec![b'a', 0xC3, 0x28]);
        let err = part.read_text().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_text_decodes_utf16_by_bom() {
        let mut le = UTF16LE_BOM.to_vec();
        le.extend("héllo".encode_utf16().flat_map(u16::to_le_bytes));
        let mut be = UTF16BE_BOM.to_vec();
        be.extend("héllo".encode_utf16().flat_map(u16::to_be_bytes));

        assert_eq!(Part::new().with_bytes(le).read_text().unwrap().as_deref(), Some("héllo"));
        assert_eq!(Part::new().with_bytes(be).read_text().unwrap().as_deref(), Some("héllo"));
    }

    #[test]
    fn test_read_text_decodes_utf32_by_bom() {
        let mut le = UTF32LE_BOM.to_vec();
        le.extend("ok".chars().flat_map(|c| u32::from(c).to_le_bytes()));
        let mut be = UTF32BE_BOM.to_vec();
        be.extend("ok".chars().flat_map(|c| u32::from(c).to_be_bytes()));

        assert_eq!(Part::new().with_bytes(le).read_text().unwrap().as_deref(), Some("ok"));
        assert_eq!(Part::new().with_bytes(be).read_text().unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_read_text_rejects_truncated_utf16() {
        let mut part = Part::new().with_bytes(vec![0xFF, 0xFE, 0x68]);
        let err = part.read_text().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_dispose_releases_stream_once() {
        let mut part = Part::new().with_text("data");
        part.dispose();
        assert!(part.is_disposed());
        assert!(!part.has_data());

        part.dispose();
        assert!(part.is_disposed());
    }

    #[test]
    fn test_file_backed_stream() {
        use std::io::Write;

        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"from disk").unwrap();

        let mut part = Part::new().with_data(file);
        assert_eq!(part.size().unwrap().bytes, 9);
        assert_eq!(part.read_text().unwrap().as_deref(), Some("from disk"));
    }
}
