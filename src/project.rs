use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const MANIFEST_EXTENSION: &str = "files";
const TEXT_SNIFF_BYTES: u64 = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProjectFile {
    name: String,
}

impl ProjectFile {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Path relative to the project root, `/`-separated.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProjectSource {
    Directory,
    Manifest(PathBuf),
}

#[derive(Debug)]
pub(crate) struct Project {
    root: PathBuf,
    source: ProjectSource,
    ignore_dirs: Vec<String>,
    files: Vec<ProjectFile>,
}

impl Project {
    /// Open a project from a directory or a `.files` manifest.
    pub(crate) fn open(path: &Path, ignore_dirs: &[String]) -> io::Result<Self> {
        let (root, source) = if path.is_dir() {
            (path.to_path_buf(), ProjectSource::Directory)
        } else if path.is_file()
            && path.extension().is_some_and(|e| e == MANIFEST_EXTENSION)
        {
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (root, ProjectSource::Manifest(path.to_path_buf()))
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} is neither a directory nor a .{MANIFEST_EXTENSION} manifest",
                    path.display()
                ),
            ));
        };
        let mut project = Self {
            root,
            source,
            ignore_dirs: ignore_dirs.to_vec(),
            files: Vec::new(),
        };
        project.reload()?;
        Ok(project)
    }

    #[cfg(test)]
    pub(crate) fn from_names(root: &Path, names: &[&str]) -> Self {
        Self {
            root: root.to_path_buf(),
            source: ProjectSource::Directory,
            ignore_dirs: Vec::new(),
            files: names.iter().map(|n| ProjectFile::new(*n)).collect(),
        }
    }

    pub(crate) fn reload(&mut self) -> io::Result<()> {
        self.files = match &self.source {
            ProjectSource::Directory => {
                let mut names = Vec::new();
                collect_text_files(&self.root, &self.root, &self.ignore_dirs, &mut names);
                names.sort();
                names.into_iter().map(ProjectFile::new).collect()
            }
            ProjectSource::Manifest(manifest) => parse_manifest(&fs::read_to_string(manifest)?),
        };
        tracing::debug!(
            root = %self.root.display(),
            files = self.files.len(),
            "project loaded"
        );
        Ok(())
    }

    pub(crate) fn for_each_text_file<F: FnMut(&ProjectFile)>(&self, mut f: F) {
        for file in &self.files {
            f(file);
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn manifest(&self) -> Option<&Path> {
        match &self.source {
            ProjectSource::Manifest(path) => Some(path),
            ProjectSource::Directory => None,
        }
    }

    pub(crate) fn absolute_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub(crate) fn parse_manifest(raw: &str) -> Vec<ProjectFile> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ProjectFile::new)
        .collect()
}

pub(crate) fn is_text_file(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = Vec::new();
    if file.take(TEXT_SNIFF_BYTES).read_to_end(&mut head).is_err() {
        return false;
    }
    !head.contains(&0)
}

fn collect_text_files(root: &Path, dir: &Path, ignore_dirs: &[String], out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let Ok(ft) = fs::symlink_metadata(&path).map(|m| m.file_type()) else {
            continue;
        };
        if ft.is_symlink() {
            continue;
        }
        if ft.is_dir() {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if name.starts_with('.') || ignore_dirs.iter().any(|d| d.as_str() == name.as_ref()) {
                continue;
            }
            collect_text_files(root, &path, ignore_dirs, out);
        } else if is_text_file(&path) {
            out.push(relative_name(root, &path));
        }
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
