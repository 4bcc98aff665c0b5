//! Whole-file JSON persistence for the two collections.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};

/// Read a collection from `path`, or its empty value if the file does not exist yet.
pub fn load<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Overwrite `path` with the full collection.
///
/// The JSON is written to a sibling `.tmp` file and renamed into place, so a
/// concurrent reader sees either the old or the new contents, never a prefix.
pub fn save<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, raw).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use findit_types::models::{Item, Report, ReportStatus};
    use std::collections::BTreeMap;

    fn sample_item(n: i64) -> Item {
        Item {
            id: 1_700_000_000 + n,
            owner: format!("사용자{}", n % 7),
            item: format!("잃어버린 우산 #{n} ☂"),
            point: n * 5,
            characteristic: "파란색, 손잡이에 스티커, «très» usé".into(),
            start_lat: "37.5665".into(),
            start_lng: "126.9780".into(),
            lat: "37.5700".into(),
            lng: "126.9820".into(),
            start_address: "서울특별시 중구".into(),
            end_address: "東京都千代田区".into(),
            photo: if n % 3 == 0 { format!("umbrella_{n}.jpg") } else { String::new() },
            reports: (0..n % 3)
                .map(|r| Report {
                    reporter: format!("신고자{r}"),
                    status: if r == 0 { ReportStatus::Yes } else { ReportStatus::Pending },
                })
                .collect(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<Item> = load(&dir.path().join("lost_items.json")).unwrap();
        assert!(items.is_empty());
        let users: BTreeMap<String, u32> = load(&dir.path().join("users.json")).unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn malformed_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lost_items.json");
        fs::write(&path, "[{\"id\": ").unwrap();
        let err = load::<Vec<Item>>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn items_survive_save_and_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lost_items.json");
        let items: Vec<Item> = (0..60).map(sample_item).collect();

        save(&items, &path).unwrap();
        let loaded: Vec<Item> = load(&path).unwrap();
        assert_eq!(loaded, items);
    }

    #[test]
    fn saved_file_is_indented_and_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lost_items.json");
        save(&vec![sample_item(1)], &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("잃어버린 우산"));
        assert!(!raw.contains("\\u"));
        assert!(raw.contains("\n  {"));
        assert!(!tmp_path(&path).exists());
    }
}
