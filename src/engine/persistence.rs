use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::info;

use crate::engine::table::{Row, Table};
use crate::value::Value;
use crate::{Error, Result};

const LABELS_FILE: &str = "grid.labels";
const VALUES_FILE: &str = "grid.values";

/// Flat-file codec for a [`Table`].
///
/// The on-disk format is two line-oriented files in one data directory:
/// `grid.labels` holds one label per line in label order, and
/// `grid.values` holds one canonically formatted cell value per line in
/// strict row-major order with no separators between rows. Rows are
/// rebuilt on retrieval by slicing the flat value sequence into
/// column-count-sized chunks, so the total value-line count must be an
/// exact multiple of the label count.
///
/// `store` and `retrieve` serialize against each other through a
/// blocking mutex; the in-memory table itself is left to its single
/// logical caller.
pub struct Persistence {
    labels_path: PathBuf,
    values_path: PathBuf,
    io_gate: Mutex<()>,
}

impl Persistence {
    /// Initializes the codec in `dir`, creating the directory and both
    /// destination files (empty) if absent. Safe to call repeatedly.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let labels_path = dir.join(LABELS_FILE);
        let values_path = dir.join(VALUES_FILE);
        for path in [&labels_path, &values_path] {
            fs::OpenOptions::new().create(true).append(true).open(path)?;
        }

        Ok(Self {
            labels_path,
            values_path,
            io_gate: Mutex::new(()),
        })
    }

    /// Writes the table to the two destination files and clears it.
    ///
    /// Each file is written to a temporary sibling and renamed into
    /// place, so a crash mid-write leaves the previous contents intact.
    pub fn store(&self, table: &mut Table) -> Result<()> {
        let _gate = self.io_gate.lock().unwrap();

        let mut labels = String::new();
        for label in table.labels() {
            labels.push_str(label);
            labels.push('\n');
        }

        let mut values = String::new();
        for row in table.rows() {
            values.push_str(&row.id().to_string());
            values.push('\n');
            for cell in row.cells() {
                values.push_str(&cell.to_string());
                values.push('\n');
            }
        }

        write_atomic(&self.labels_path, &labels)?;
        write_atomic(&self.values_path, &values)?;

        info!(
            "stored {} columns and {} rows",
            table.column_count(),
            table.row_count()
        );
        table.clear();
        Ok(())
    }

    /// Reads both destination files and replaces `table` with their
    /// contents. Every retrieved cell is plain text; the wire format
    /// carries no type tags.
    pub fn retrieve(&self, table: &mut Table) -> Result<()> {
        let _gate = self.io_gate.lock().unwrap();

        let labels = read_lines(&self.labels_path)?;
        let lines = read_lines(&self.values_path)?;

        let cols = labels.len();
        if cols == 0 {
            return Err(Error::CorruptedStore("no labels to retrieve".to_string()));
        }
        if lines.len() % cols != 0 {
            return Err(Error::CorruptedStore(format!(
                "{} value lines do not divide into {} columns",
                lines.len(),
                cols
            )));
        }

        let mut rows = Vec::with_capacity(lines.len() / cols);
        for chunk in lines.chunks_exact(cols) {
            let id = chunk[0].parse::<u64>().map_err(|_| {
                Error::CorruptedStore(format!("unparsable row identifier: {}", chunk[0]))
            })?;
            let cells = chunk[1..]
                .iter()
                .map(|line| Value::Str(line.clone()))
                .collect();
            rows.push(Row::new(id, cells));
        }

        info!("retrieved {} columns and {} rows", cols, rows.len());
        table.restore(labels, rows);
        Ok(())
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn populated() -> Table {
        let mut t = Table::new();
        t.create(&["name", "age"]).unwrap();
        t.add_row(vec!["Ann".into(), "30".into()]).unwrap();
        t.add_row(vec!["Bo".into(), "4".into()]).unwrap();
        t
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = populated();
        p.store(&mut t).unwrap();

        // A second init must not disturb the stored files.
        let p2 = Persistence::new(dir.path()).unwrap();
        let mut back = Table::new();
        p2.retrieve(&mut back).unwrap();
        assert_eq!(back.labels(), &["id", "name", "age"]);
        assert_eq!(back.row_count(), 2);
    }

    #[test]
    fn test_store_clears_memory() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = populated();
        p.store(&mut t).unwrap();
        assert_eq!(t.column_count(), 0);
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = populated();
        p.store(&mut t).unwrap();
        p.retrieve(&mut t).unwrap();

        assert_eq!(t.labels(), &["id", "name", "age"]);
        let ids: Vec<u64> = t.rows().iter().map(Row::id).collect();
        assert_eq!(ids, vec![10_001, 10_002]);
        let cells: Vec<String> = t.rows()[0].cells().iter().map(Value::to_string).collect();
        assert_eq!(cells, vec!["Ann", "30"]);
    }

    #[test]
    fn test_second_store_replaces_not_appends() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = populated();
        p.store(&mut t).unwrap();

        t.create(&["city"]).unwrap();
        t.add_row(vec!["Oslo".into()]).unwrap();
        p.store(&mut t).unwrap();

        p.retrieve(&mut t).unwrap();
        assert_eq!(t.labels(), &["id", "city"]);
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn test_structured_values_come_back_as_text() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = Table::new();
        t.create(&["tags"]).unwrap();
        t.add_row(vec![Value::from(vec!["red", "blue"])]).unwrap();
        p.store(&mut t).unwrap();
        p.retrieve(&mut t).unwrap();

        assert_eq!(t.rows()[0].cells(), &[Value::from("red, blue")]);
    }

    #[test]
    fn test_retrieve_rejects_uneven_line_count() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        fs::write(dir.path().join(LABELS_FILE), "id\nname\n").unwrap();
        fs::write(dir.path().join(VALUES_FILE), "10001\nAnn\n10002\n").unwrap();

        let mut t = Table::new();
        assert!(matches!(p.retrieve(&mut t), Err(Error::CorruptedStore(_))));
    }

    #[test]
    fn test_retrieve_rejects_empty_labels() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();
        fs::write(dir.path().join(VALUES_FILE), "10001\n").unwrap();

        let mut t = Table::new();
        assert!(matches!(p.retrieve(&mut t), Err(Error::CorruptedStore(_))));
    }

    #[test]
    fn test_retrieve_rejects_unparsable_identifier() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        fs::write(dir.path().join(LABELS_FILE), "id\nname\n").unwrap();
        fs::write(dir.path().join(VALUES_FILE), "Ann\n10001\n").unwrap();

        let mut t = Table::new();
        assert!(matches!(p.retrieve(&mut t), Err(Error::CorruptedStore(_))));
    }

    #[test]
    fn test_retrieve_with_no_rows_yields_empty_table() {
        let dir = tempdir().unwrap();
        let p = Persistence::new(dir.path()).unwrap();

        let mut t = Table::new();
        t.create(&["name"]).unwrap();
        p.store(&mut t).unwrap();
        p.retrieve(&mut t).unwrap();

        assert_eq!(t.labels(), &["id", "name"]);
        assert_eq!(t.row_count(), 0);
    }
}
