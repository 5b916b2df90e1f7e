use std::error;
use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::path::Path;
use std::usize::MAX as USIZE_MAX;

pub use self::serialize::*;

pub mod prelude;
mod serialize;

pub trait Read {
    type Item;

    fn read(&mut self, buf: &mut Vec<Self::Item>) -> io::Result<usize> {
        self.read_upto(USIZE_MAX, buf)
    }

    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> io::Result<usize>;
}

pub trait Write {
    type Item;

    fn write(&mut self, buf: &[Self::Item]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Parses one record from a single line; the line terminator may still be attached.
pub trait FromLine: Sized {
    type Err: Into<Box<dyn error::Error + Send + Sync>>;

    fn from_line(line: &str) -> Result<Self, Self::Err>;
}

/// Reads one item per line, keeping count of the lines consumed so far.
#[derive(Debug)]
pub struct Reader<R, T> {
    inner: R,
    lineno: usize,
    _phantom: PhantomData<T>,
}

impl<R: io::BufRead, T> Reader<R, T> {
    pub fn new(inner: R) -> Self {
        Reader {
            inner,
            lineno: 0,
            _phantom: PhantomData,
        }
    }

    /// Number of lines consumed so far.
    pub fn lineno(&self) -> usize {
        self.lineno
    }
}

impl<T> Reader<io::BufReader<File>, T> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(io::BufReader::new(File::open(path)?)))
    }
}

impl<R: io::BufRead, T: FromLine> Read for Reader<R, T> {
    type Item = T;

    /// A line that fails to parse aborts the read with `InvalidData` naming its line number.
    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> io::Result<usize> {
        let mut count = 0;
        let mut line = String::new();
        while count < num {
            line.clear();
            match self.inner.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    self.lineno += 1;
                    let item = T::from_line(&line).map_err(|e| {
                        let e: Box<dyn error::Error + Send + Sync> = e.into();
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("line {}: {}", self.lineno, e),
                        )
                    })?;
                    buf.push(item);
                    count += 1;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }
}
