//! Writing the generated tables.

use super::{BuildError, BuildManager};
use crate::log;
use crate::properties::{format_list_entry, write_entries};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

impl BuildManager {
    /// Write the path -> hashed path table. Returns the entry count.
    pub(super) fn write_hash_lookup(&self) -> Result<usize, BuildError> {
        let file = self.settings.map_file();
        let entries = self
            .hash_lookup
            .iter()
            .map(|(path, hashed)| (path.as_str(), hashed.as_str()));
        let count = write_table(&file, |writer| write_entries(writer, entries))?;
        log!("build"; "wrote {} mappings to {}", count, file.display());
        Ok(count)
    }

    /// Write the path -> referenced paths table. Returns the entry count.
    pub(super) fn write_child_links(&self) -> Result<usize, BuildError> {
        let file = self.settings.links_file();
        let count = write_table(&file, |writer| {
            let mut count = 0;
            for (path, links) in self.child_links.iter().filter(|(_, links)| !links.is_empty()) {
                writeln!(writer, "{}", format_list_entry(path, links))?;
                count += 1;
            }
            Ok(count)
        })?;
        log!("build"; "wrote {} child link entries to {}", count, file.display());
        Ok(count)
    }
}

/// Create `file` (and its directory) and fill it with `fill`.
fn write_table<F>(file: &Path, fill: F) -> Result<usize, BuildError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<usize>,
{
    let write = || -> io::Result<usize> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(file)?);
        let count = fill(&mut writer)?;
        writer.flush()?;
        Ok(count)
    };
    write().map_err(|source| BuildError::WriteTable {
        path: file.to_path_buf(),
        source,
    })
}
