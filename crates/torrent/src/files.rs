//! File name extraction and archive classification

use crate::constants::RAR_SUFFIX;
use crate::metainfo::TorrentMetadata;

/// Get all the file names contained in the torrent metadata
///
/// Multi-file torrents yield the last path component of every entry, in
/// list order. Torrents without a file list yield their display name.
pub fn file_names(metadata: &TorrentMetadata) -> Vec<String> {
    match metadata.files.as_deref() {
        Some(files) if !files.is_empty() => files
            .iter()
            .filter_map(|file| file.path.last().cloned())
            .collect(),
        _ => vec![metadata.name.clone()],
    }
}

/// Whether a file name marks a rar archive volume
///
/// Only the literal, case-sensitive `.rar` suffix counts. Old-style split
/// volumes (`.r00`, `.r01`, ...) are not matched.
pub fn is_rar_file(name: &str) -> bool {
    name.ends_with(RAR_SUFFIX)
}

/// Filter file names down to the ones that look like rar archives
pub fn rar_files(names: &[String]) -> Vec<String> {
    names.iter().filter(|name| is_rar_file(name)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metainfo::FileEntry;

    fn entry(path: &[&str]) -> FileEntry {
        FileEntry {
            path: path.iter().map(|p| p.to_string()).collect(),
            length: 1,
        }
    }

    #[test]
    fn test_file_names_multi_file() {
        let meta = TorrentMetadata {
            name: "pack".to_string(),
            files: Some(vec![entry(&["dir", "movie.rar"]), entry(&["dir", "movie.nfo"])]),
        };
        let names = file_names(&meta);
        assert_eq!(names, vec!["movie.rar", "movie.nfo"]);
        assert_eq!(rar_files(&names), vec!["movie.rar"]);
    }

    #[test]
    fn test_file_names_single_file() {
        let meta = TorrentMetadata {
            name: "single.rar".to_string(),
            files: None,
        };
        let names = file_names(&meta);
        assert_eq!(names, vec!["single.rar"]);
        assert_eq!(rar_files(&names), vec!["single.rar"]);
    }

    #[test]
    fn test_empty_file_list_falls_back_to_name() {
        let meta = TorrentMetadata {
            name: "ubuntu.iso".to_string(),
            files: Some(Vec::new()),
        };
        assert_eq!(file_names(&meta), vec!["ubuntu.iso"]);
    }

    #[test]
    fn test_is_rar_file() {
        assert!(is_rar_file("movie.rar"));
        assert!(is_rar_file("movie.part01.rar"));

        assert!(!is_rar_file("movie.RAR"));
        assert!(!is_rar_file("movie.r00"));
        assert!(!is_rar_file("movie.rar.nfo"));
        assert!(!is_rar_file("rar"));
    }

    #[test]
    fn test_rar_files_keeps_order() {
        let names: Vec<String> = ["b.rar", "a.mkv", "a.rar", "c.rar"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(rar_files(&names), vec!["b.rar", "a.rar", "c.rar"]);
    }
}
