use crate::event_detection::SampleIndex;
use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};

pub(crate) trait SavablePoint {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error>;
}

impl<V> SavablePoint for (SampleIndex, V)
where
    V: Display,
{
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{0},{1}", self.0, self.1)
    }
}

/// Writes every `(index, value)` point of an iterator as one line of `path`.
pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        for item in self {
            item.write_to(&mut writer)?;
        }
        writer.flush()
    }
}
