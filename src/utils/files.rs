use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Read a file from the given path into a list of lines
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    BufReader::new(File::open(path)?).lines().collect()
}

/// Write one line per item, then flush and close the file before returning
pub fn write_file<P, I, S>(path: P, lines: I) -> io::Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(File::create(path)?);

    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()
}

/// Create a folder and any missing parents
pub fn create_folder<P: AsRef<Path>>(path: P) -> io::Result<()> {
    fs::create_dir_all(path)
}
