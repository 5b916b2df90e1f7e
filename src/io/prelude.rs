pub use super::{FromLine, Read, Write};
