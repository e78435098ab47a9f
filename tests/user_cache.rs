//! 用户数据缓存行为测试

use kou_grade_fetch::models::{CourseInfo, SemesterData, SemesterMap};
use kou_grade_fetch::services::UserDataCache;

const USERNAME: &str = "190201001";

fn course(code: &str, name: &str) -> CourseInfo {
    CourseInfo {
        sequence: "1".to_string(),
        code: code.to_string(),
        name: name.to_string(),
        ects: "6".to_string(),
        bd: "BA".to_string(),
        ..Default::default()
    }
}

fn sample_data() -> SemesterMap {
    let mut data = SemesterMap::new();
    data.insert(
        "20242",
        SemesterData {
            semester_name: "2024-2025 Bahar".to_string(),
            courses: vec![course("BLM101", "Algoritmalar"), course("MAT102", "Matematik II")],
        },
    );
    data.insert(
        "20241",
        SemesterData {
            semester_name: "2024-2025 Güz".to_string(),
            courses: vec![course("FIZ101", "Fizik I")],
        },
    );
    data
}

fn cache_file(dir: &std::path::Path) -> std::path::PathBuf {
    // 每个用户一个文件
    let entries: Vec<_> = std::fs::read_dir(dir).unwrap().flatten().collect();
    assert_eq!(entries.len(), 1);
    entries[0].path()
}

#[test]
fn save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());
    let data = sample_data();

    assert!(cache.save(USERNAME, &data));
    let loaded = cache.load(USERNAME).unwrap();

    assert_eq!(loaded, data);
    // 学期顺序保持原样
    let keys: Vec<&str> = loaded.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["20242", "20241"]);
}

#[test]
fn metadata_counts_recomputed_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());
    let info = cache.info(USERNAME).unwrap();

    assert_eq!(info.total_semesters, Some(2));
    assert_eq!(info.total_courses, Some(3));
    assert!(info.last_updated.is_some());
    assert_eq!(info.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
}

#[test]
fn zero_byte_file_is_deleted_and_absent() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());
    let path = cache_file(dir.path());
    std::fs::write(&path, b"").unwrap();

    assert!(cache.load(USERNAME).is_none());
    assert!(!path.exists());
}

#[test]
fn invalid_shape_is_deleted_and_absent() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());
    let path = cache_file(dir.path());
    // 合法 JSON 但缺少 {metadata, semesters} 结构
    std::fs::write(&path, br#"{"foo": 1}"#).unwrap();

    assert!(cache.load(USERNAME).is_none());
    assert!(!path.exists());
}

#[test]
fn exists_requires_non_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    assert!(!cache.exists(USERNAME));
    cache.save(USERNAME, &sample_data());
    assert!(cache.exists(USERNAME));

    std::fs::write(cache_file(dir.path()), b"").unwrap();
    assert!(!cache.exists(USERNAME));
}

#[test]
fn info_degrades_to_fs_stat_when_unparseable() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());
    let path = cache_file(dir.path());
    // 头部带 "metadata" 标记但整体解析失败
    std::fs::write(&path, br#"{"metadata": {{{"#).unwrap();

    let info = cache.info(USERNAME).unwrap();
    assert!(info.file_size > 0);
    assert_eq!(info.total_semesters, None);
    assert_eq!(info.total_courses, None);
}

#[test]
fn info_absent_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());
    assert!(cache.info(USERNAME).is_none());
}

#[test]
fn clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());
    assert!(cache.clear(USERNAME));
    assert!(!cache.clear(USERNAME));
    assert!(!cache.exists(USERNAME));
}

#[test]
fn overwrite_replaces_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = UserDataCache::new(dir.path());

    cache.save(USERNAME, &sample_data());

    let mut smaller = SemesterMap::new();
    smaller.insert(
        "20251",
        SemesterData {
            semester_name: "2025-2026 Güz".to_string(),
            courses: vec![course("BLM301", "İşletim Sistemleri")],
        },
    );
    cache.save(USERNAME, &smaller);

    let loaded = cache.load(USERNAME).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get("20242").is_none());
    let info = cache.info(USERNAME).unwrap();
    assert_eq!(info.total_semesters, Some(1));
    assert_eq!(info.total_courses, Some(1));
}
