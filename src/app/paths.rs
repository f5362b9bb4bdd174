use crate::app::error::CheckError;
use std::ffi::{OsStr, OsString};
use std::path::{is_separator, Component, Path, PathBuf};

/// How a path given on the command line is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Absolute,
    HomeRelative,
    Relative,
}

pub fn classify(path: &Path) -> PathKind {
    if path.has_root() {
        return PathKind::Absolute;
    }
    match path.components().next() {
        Some(Component::Normal(first)) if first == "~" => PathKind::HomeRelative,
        _ => PathKind::Relative,
    }
}

/// Replaces a leading `~` with `home`. `~user` forms are left untouched.
pub fn expand_home(path: &Path, home: Option<&Path>) -> Result<PathBuf, CheckError> {
    if classify(path) != PathKind::HomeRelative {
        return Ok(path.to_path_buf());
    }
    let home = home.ok_or_else(|| CheckError::NoHome(path.to_path_buf()))?;
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => Ok(home.to_path_buf()),
        Ok(rest) => Ok(home.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// The parent folder that has to exist before `expanded` can be created.
/// Only absolute and home-anchored paths carry this requirement.
pub fn required_parent<'a>(raw: &Path, expanded: &'a Path) -> Option<&'a Path> {
    if classify(raw) == PathKind::Relative {
        return None;
    }
    expanded.parent().filter(|p| !p.as_os_str().is_empty())
}

/// True when the path, as typed, can only name a folder: a trailing
/// separator, or a final `.`/`..` segment.
pub fn names_folder(raw: &Path) -> bool {
    let text = raw.to_string_lossy();
    if text.ends_with(is_separator) {
        return true;
    }
    let last = text.rsplit(is_separator).next().unwrap_or_default();
    last == "." || last == ".."
}

/// File name used for a source's listing inside a tree group's folder.
pub fn listing_name(source: &Path) -> OsString {
    source
        .file_name()
        .map(OsStr::to_os_string)
        .or_else(|| {
            source
                .canonicalize()
                .ok()
                .and_then(|full| full.file_name().map(OsStr::to_os_string))
        })
        .unwrap_or_else(|| OsString::from("root"))
}

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved.
pub fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.has_root() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
