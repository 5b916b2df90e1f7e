use std::io as std_io;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::io as mod_io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    /// write-only; records span several lines
    JsonPretty,
}

/// Newline-delimited records over any byte stream.
pub struct Serializer<IO, T> {
    _phantom: PhantomData<T>,
    inner: IO,
    format: Format,
}

impl<IO, T> Serializer<IO, T> {
    pub fn new(io: IO, format: Format) -> Self {
        Serializer {
            _phantom: PhantomData,
            inner: io,
            format,
        }
    }
}

impl<IO, T: Serialize> Serializer<IO, T> {
    pub fn serialize(&self, data: &T) -> std_io::Result<Vec<u8>> {
        serialize(data, self.format)
    }
}

impl<'a, IO, T: Deserialize<'a>> Serializer<IO, T> {
    pub fn deserialize(&self, bytes: &'a [u8]) -> std_io::Result<T> {
        deserialize(bytes, self.format)
    }
}

pub fn serialize<T: Serialize>(data: &T, format: Format) -> std_io::Result<Vec<u8>> {
    let result = match format {
        Format::Json => serde_json::to_vec(data),
        Format::JsonPretty => serde_json::to_vec_pretty(data),
    };
    result.map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e))
}

pub fn deserialize<'a, T: Deserialize<'a>>(bytes: &'a [u8], format: Format) -> std_io::Result<T> {
    match format {
        Format::Json | Format::JsonPretty => serde_json::from_slice(bytes)
            .map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e)),
    }
}

impl<T: Serialize, IO: std_io::Write> mod_io::Write for Serializer<IO, T> {
    type Item = T;

    fn write(&mut self, buf: &[Self::Item]) -> std_io::Result<usize> {
        for item in buf {
            let mut bytes = self.serialize(item)?;
            bytes.push(b'\n');
            self.inner.write_all(&bytes)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std_io::Result<()> {
        self.inner.flush()
    }
}

impl<T: DeserializeOwned, IO: std_io::BufRead> mod_io::Read for Serializer<IO, T> {
    type Item = T;

    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> std_io::Result<usize> {
        let mut count = 0;
        let mut line = Vec::new();
        while count < num {
            match self.inner.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if !is_blank(&line) {
                        buf.push(self.deserialize(&line)?);
                        count += 1;
                    }
                }
                Err(ref e) if e.kind() == std_io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
            line.clear();
        }
        Ok(count)
    }
}

#[inline]
fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| b.is_ascii_whitespace())
}
