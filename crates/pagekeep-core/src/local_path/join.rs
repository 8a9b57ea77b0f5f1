//! Joining relative references onto local (archive-relative) paths.

/// Resolves `reference` against the local file `base`, URL-join style.
///
/// The reference replaces the last segment of `base`; `.` and `..` segments are
/// then removed. Excess `..` stops at the archive root, and a rooted reference
/// (leading `/`) is taken relative to the root so it never escapes it.
pub fn join_local(base: &str, reference: &str) -> String {
    let combined = match reference.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => match base.rfind('/') {
            Some(idx) => format!("{}{}", &base[..=idx], reference),
            None => reference.to_string(),
        },
    };

    let mut out: Vec<&str> = Vec::new();
    for segment in combined.split('/') {
        match segment {
            "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Expresses the archive-relative path `to` relative to the directory of the
/// archive-relative file `from_file`, e.g. for a reference written inside a
/// stylesheet that lives in a subdirectory.
pub fn relative_to(from_file: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from_file.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();
    let to_dirs = match to_parts.split_last() {
        Some((_, dirs)) => dirs,
        None => &[][..],
    };

    let common = from_dir
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = vec![".."; from_dir.len() - common];
    out.extend_from_slice(&to_parts[common..]);
    out.join("/")
}
