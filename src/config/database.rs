use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use log::{debug, error, info};

use super::{node::ConfigNode, parser::parse, parser::ParseError, writer};
use crate::error::{Error, Result};

/// One parsed `.cfg` file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Path of the file below the database root, `/`-separated, without the
    /// `.cfg` extension
    pub url: String,
    /// Nameless root holding the file's top-level values and nodes
    pub root: ConfigNode,
}

/// A top-level node together with its url.
///
/// The first node of a given name in a file has url `<file url>/<name>`;
/// later siblings of the same name are `<file url>/<name>@<n>`, counting
/// from 1, so every node has a url of its own.
#[derive(Debug, Clone, Copy)]
pub struct UrlConfig<'a> {
    pub file_url: &'a str,
    pub config: &'a ConfigNode,
    /// Position among the file's top-level nodes with the same name
    pub ordinal: usize,
}

impl UrlConfig<'_> {
    pub fn url(&self) -> String {
        match self.ordinal {
            0 => format!("{}/{}", self.file_url, self.config.name),
            n => format!("{}/{}@{}", self.file_url, self.config.name, n),
        }
    }
}

/// The config database: every `.cfg` file below a root directory, parsed once.
#[derive(Debug, Clone)]
pub struct ConfigDatabase {
    root: PathBuf,
    files: Vec<ConfigFile>,
}

impl ConfigDatabase {
    /// Creates an empty database rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
        }
    }

    /// Loads every `.cfg` file below `root`.
    ///
    /// Directories are walked in sorted order so urls and iteration order are
    /// stable between runs. A file that fails to parse is logged and skipped;
    /// only filesystem errors abort the load.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let start = Instant::now();
        let mut db = Self::new(root);

        let mut paths = Vec::new();
        collect_cfg_files(&db.root, "", &mut paths)?;

        for (url, path) in paths {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            match db.insert_file(&url, &text) {
                Ok(()) => debug!("Loaded config file {}", url),
                Err(e) => error!("Skipping {}: {}", path.display(), e),
            }
        }

        info!(
            "Loaded {} config files from {} ({}ms)",
            db.files.len(),
            db.root.display(),
            start.elapsed().as_millis()
        );
        Ok(db)
    }

    /// Parses `text` and stores it under `file_url`, replacing any file
    /// already stored there
    pub fn insert_file(&mut self, file_url: &str, text: &str) -> std::result::Result<(), ParseError> {
        let root = parse(text)?;
        let file = ConfigFile {
            url: file_url.trim_matches('/').to_string(),
            root,
        };
        match self.files.iter_mut().find(|f| f.url == file.url) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    pub fn file(&self, file_url: &str) -> Option<&ConfigFile> {
        self.files.iter().find(|f| f.url == file_url)
    }

    /// Every top-level node named `tag`, in file order
    pub fn configs_of_type<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = UrlConfig<'a>> + 'a {
        self.files.iter().flat_map(move |file| {
            file.root
                .get_nodes(tag)
                .enumerate()
                .map(move |(ordinal, config)| UrlConfig {
                    file_url: &file.url,
                    config,
                    ordinal,
                })
        })
    }

    /// Looks up a top-level node by its url
    pub fn get_node(&self, url: &str) -> Option<&ConfigNode> {
        let (file_url, node) = url.rsplit_once('/')?;
        let (name, ordinal) = split_ordinal(node);
        self.file(file_url)?.root.nth_node(name, ordinal)
    }

    pub fn get_node_mut(&mut self, url: &str) -> Option<&mut ConfigNode> {
        let (file_url, node) = url.rsplit_once('/')?;
        let (name, ordinal) = split_ordinal(node);
        self.files
            .iter_mut()
            .find(|f| f.url == file_url)?
            .root
            .nth_node_mut(name, ordinal)
    }

    /// The url of the file holding the node at `url`
    pub fn file_url_of(url: &str) -> &str {
        url.rsplit_once('/').map(|(file, _)| file).unwrap_or("")
    }

    /// Where the file with the given url lives on disk
    pub fn physical_path(&self, file_url: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in file_url.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".cfg");
        path.set_file_name(name);
        path
    }

    /// Serializes the file stored under `file_url` back to disk.
    ///
    /// The text goes to a sibling temporary file first and is renamed over the
    /// target only once fully flushed, so a failed write leaves the previous
    /// file intact.
    pub fn write_file(&self, file_url: &str, header: &str) -> Result<PathBuf> {
        let file = self
            .file(file_url)
            .ok_or_else(|| Error::MissingConfigNode(file_url.to_string()))?;
        let path = self.physical_path(file_url);
        let text = writer::to_string(&file.root, header);

        write_atomically(&path, text.as_bytes()).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Splits `NAME@n` into its name and ordinal; a plain name is ordinal 0
fn split_ordinal(node: &str) -> (&str, usize) {
    match node.rsplit_once('@') {
        Some((name, n)) => match n.parse() {
            Ok(ordinal) => (name, ordinal),
            Err(_) => (node, 0),
        },
        None => (node, 0),
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("cfg.tmp");

    let result = write_through(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_through(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(bytes)?;
    out.flush()?;
    out.get_ref().sync_all()
}

fn collect_cfg_files(dir: &Path, prefix: &str, out: &mut Vec<(String, PathBuf)>) -> anyhow::Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let url = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };

        if path.is_dir() {
            collect_cfg_files(&path, &url, out)?;
        } else if path.extension().map_or(false, |ext| ext == "cfg") {
            let url = url.strip_suffix(".cfg").unwrap_or(&url).to_string();
            out.push((url, path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_and_lookup() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file("Town/Hangar/hangar", "STATIC\n{\n mesh = hangar.mu\n}\n")
            .unwrap();
        db.insert_file("Town/Tower/tower", "STATIC\n{\n mesh = tower.mu\n}\nPART\n{\n}\n")
            .unwrap();

        let urls: Vec<String> = db.configs_of_type("STATIC").map(|c| c.url()).collect();
        assert_eq!(urls, vec!["Town/Hangar/hangar/STATIC", "Town/Tower/tower/STATIC"]);

        let node = db.get_node("Town/Tower/tower/STATIC").unwrap();
        assert_eq!(node.get_value("mesh"), Some("tower.mu"));
        assert!(db.get_node("Town/Tower/tower/MISSING").is_none());
        assert!(db.get_node("nourl").is_none());

        assert_eq!(ConfigDatabase::file_url_of("Town/Tower/tower/STATIC"), "Town/Tower/tower");
        assert_eq!(
            db.physical_path("Town/Tower/tower"),
            Path::new("GameData").join("Town").join("Tower").join("tower.cfg")
        );
    }

    #[test]
    fn test_insert_replaces_existing_file() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file("a/b", "STATIC\n{\n mesh = one.mu\n}\n").unwrap();
        db.insert_file("a/b", "STATIC\n{\n mesh = two.mu\n}\n").unwrap();

        assert_eq!(db.files().len(), 1);
        assert_eq!(db.get_node("a/b/STATIC").unwrap().get_value("mesh"), Some("two.mu"));
        assert!(db.insert_file("a/c", "STATIC\n{\n").is_err());
    }

    #[test]
    fn test_load_and_write_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let asset_dir = dir.path().join("Town").join("Hangar");
        fs::create_dir_all(&asset_dir).unwrap();
        fs::write(asset_dir.join("hangar.cfg"), "STATIC\n{\n mesh = hangar.mu\n}\n").unwrap();
        fs::write(asset_dir.join("broken.cfg"), "STATIC\n{\n").unwrap();
        fs::write(asset_dir.join("notes.txt"), "not a config").unwrap();

        let mut db = ConfigDatabase::load(dir.path()).unwrap();
        assert_eq!(db.files().len(), 1);
        assert_eq!(db.files()[0].url, "Town/Hangar/hangar");

        db.get_node_mut("Town/Hangar/hangar/STATIC")
            .unwrap()
            .add_value("scale", "2");
        let path = db.write_file("Town/Hangar/hangar", "test").unwrap();
        assert_eq!(path, asset_dir.join("hangar.cfg"));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "// test\nSTATIC\n{\n\tmesh = hangar.mu\n\tscale = 2\n}\n");
        assert!(!asset_dir.join("hangar.cfg.tmp").exists());

        assert!(matches!(
            db.write_file("Town/Missing/missing", "test"),
            Err(Error::MissingConfigNode(_))
        ));
    }

    #[test]
    fn test_same_named_nodes_get_distinct_urls() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file(
            "Town/Pack/pack",
            "STATIC\n{\n mesh = a.mu\n}\nOTHER\n{\n}\nSTATIC\n{\n mesh = b.mu\n}\n",
        )
        .unwrap();

        let urls: Vec<String> = db.configs_of_type("STATIC").map(|c| c.url()).collect();
        assert_eq!(urls, vec!["Town/Pack/pack/STATIC", "Town/Pack/pack/STATIC@1"]);
        assert_eq!(db.get_node("Town/Pack/pack/STATIC").unwrap().get_value("mesh"), Some("a.mu"));
        assert_eq!(db.get_node("Town/Pack/pack/STATIC@1").unwrap().get_value("mesh"), Some("b.mu"));
        assert!(db.get_node("Town/Pack/pack/STATIC@2").is_none());

        db.get_node_mut("Town/Pack/pack/STATIC@1")
            .unwrap()
            .add_value("scale", "2");
        assert!(!db.get_node("Town/Pack/pack/STATIC").unwrap().has_value("scale"));
        assert_eq!(ConfigDatabase::file_url_of("Town/Pack/pack/STATIC@1"), "Town/Pack/pack");
    }

    #[test]
    fn test_failed_write_removes_temporary_and_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = ConfigDatabase::new(dir.path());
        db.insert_file("Town/Tower/tower", "STATIC\n{\n mesh = tower.mu\n}\n").unwrap();

        // a non-empty directory where the file should go makes the final rename fail
        let target = dir.path().join("Town").join("Tower").join("tower.cfg");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep"), "untouched").unwrap();

        let result = db.write_file("Town/Tower/tower", "test");
        assert!(matches!(result, Err(Error::Write { ref path, .. }) if *path == target));
        assert!(!dir.path().join("Town").join("Tower").join("tower.cfg.tmp").exists());
        assert_eq!(fs::read_to_string(target.join("keep")).unwrap(), "untouched");
    }
}
