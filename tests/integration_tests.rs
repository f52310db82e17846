use foldersort::cli::{RunOptions, RunOutcome, RunReport, run};
use foldersort::config::Config;
use foldersort::scanner::ScanError;
/// Integration tests for foldersort
///
/// These tests run the whole pipeline against temporary directories:
/// 1. Live organization
/// 2. Destination conflicts
/// 3. Dry-run mode
/// 4. Empty and missing folders
/// 5. Configuration
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary folder to organize plus a separate place for the report.
struct TestFixture {
    temp_dir: TempDir,
    report_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            report_dir: TempDir::new().expect("Failed to create report directory"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn report_path(&self) -> PathBuf {
        self.report_dir.path().join("reports").join("report.csv")
    }

    fn options(&self, dry_run: bool) -> RunOptions {
        RunOptions::new(self.path())
            .dry_run(dry_run)
            .report_path(self.report_path())
    }

    fn create_file(&self, name: &str, content: &str) {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name, &format!("content of {}", name));
        }
    }

    fn organize(&self, dry_run: bool) -> RunOutcome {
        run(&self.options(dry_run), &Config::default()).expect("run should not fail")
    }

    fn organize_completed(&self, dry_run: bool) -> RunReport {
        match self.organize(dry_run) {
            RunOutcome::Completed(report) => report,
            other => panic!("expected a completed run, got {:?}", other),
        }
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn count_dirs(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .filter(|e| e.path().is_dir())
            .count()
    }

    /// Every file under the folder with its content, keyed by relative path.
    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        Self::walk_dir(self.path(), self.path(), &mut files);
        files
    }

    fn walk_dir(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    let rel = path.strip_prefix(root).unwrap().to_path_buf();
                    files.insert(rel, fs::read(&path).unwrap());
                } else if path.is_dir() {
                    Self::walk_dir(root, &path, files);
                }
            }
        }
    }

    fn report_rows(&self) -> Vec<BTreeMap<String, String>> {
        let mut reader = csv::Reader::from_path(self.report_path()).expect("report should exist");
        let headers = reader.headers().unwrap().clone();
        reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.to_string(), v.to_string()))
                    .collect()
            })
            .collect()
    }
}

// ============================================================================
// Test Suite 1: Live Organization
// ============================================================================

#[test]
fn test_scenario_a_live_run() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.txt", "c.unknownext"]);

    let report = fixture.organize_completed(false);

    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Documents/b.txt");
    fixture.assert_file_exists("Other/c.unknownext");
    fixture.assert_file_not_exists("a.jpg");
    fixture.assert_file_not_exists("b.txt");
    fixture.assert_file_not_exists("c.unknownext");

    assert_eq!(report.summary.successful, 3);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.report_path, Some(fixture.report_path()));

    let rows = fixture.report_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row["status"] == "success"));
}

#[test]
fn test_report_columns() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.md", "12345");

    fixture.organize_completed(false);

    let mut reader = csv::Reader::from_path(fixture.report_path()).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "timestamp",
            "filename",
            "original_path",
            "new_path",
            "category",
            "size_bytes",
            "status"
        ]
    );

    let rows = fixture.report_rows();
    let row = &rows[0];
    assert_eq!(row["filename"], "notes.md");
    assert_eq!(row["category"], "Documents");
    assert_eq!(row["size_bytes"], "5");
    assert_eq!(
        PathBuf::from(&row["original_path"]),
        fixture.path().join("notes.md")
    );
    assert_eq!(
        PathBuf::from(&row["new_path"]),
        fixture.path().join("Documents").join("notes.md")
    );
    assert!(chrono::DateTime::parse_from_rfc3339(&row["timestamp"]).is_ok());
}

#[test]
fn test_organize_every_category() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "photo.PNG",
        "report.pdf",
        "clip.mkv",
        "song.flac",
        "backup.tar.gz",
        "main.rs",
        "setup.exe",
        "novel.epub",
        "README",
    ]);

    let report = fixture.organize_completed(false);

    fixture.assert_file_exists("Images/photo.PNG");
    fixture.assert_file_exists("Documents/report.pdf");
    fixture.assert_file_exists("Videos/clip.mkv");
    fixture.assert_file_exists("Audio/song.flac");
    fixture.assert_file_exists("Archives/backup.tar.gz");
    fixture.assert_file_exists("Code/main.rs");
    fixture.assert_file_exists("Executables/setup.exe");
    fixture.assert_file_exists("Books/novel.epub");
    fixture.assert_file_exists("Other/README");
    assert_eq!(report.summary.by_category.len(), 9);
    assert_eq!(fixture.count_dirs(), 9);
}

#[test]
fn test_subdirectories_are_left_alone() {
    let fixture = TestFixture::new();
    fixture.create_file("nested/inner.txt", "inner");
    fixture.create_file("outer.txt", "outer");

    let report = fixture.organize_completed(false);

    assert_eq!(report.operations.len(), 1);
    fixture.assert_file_exists("nested/inner.txt");
    fixture.assert_file_exists("Documents/outer.txt");
}

#[test]
fn test_records_follow_category_order() {
    let fixture = TestFixture::new();
    fixture.create_files(&["z.zip", "b.txt", "a.jpg", "a.txt"]);

    let report = fixture.organize_completed(false);

    let names: Vec<&str> = report
        .operations
        .iter()
        .map(|op| op.filename.as_str())
        .collect();
    assert_eq!(names, vec!["a.jpg", "a.txt", "b.txt", "z.zip"]);
}

#[test]
fn test_second_run_finds_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.txt"]);

    fixture.organize_completed(false);
    let before = fixture.snapshot();

    assert!(matches!(fixture.organize(false), RunOutcome::NothingToOrganize));
    assert_eq!(fixture.snapshot(), before);
}

// ============================================================================
// Test Suite 2: Destination Conflicts
// ============================================================================

#[test]
fn test_scenario_b_existing_destination() {
    let fixture = TestFixture::new();
    fixture.create_file("Images/a.jpg", "existing image");
    fixture.create_file("a.jpg", "incoming image");

    let report = fixture.organize_completed(false);

    assert_eq!(
        fs::read_to_string(fixture.path().join("Images/a.jpg")).unwrap(),
        "existing image"
    );
    assert_eq!(
        fs::read_to_string(fixture.path().join("Images/a_1.jpg")).unwrap(),
        "incoming image"
    );
    fixture.assert_file_not_exists("a.jpg");

    let rows = fixture.report_rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["new_path"].ends_with("a_1.jpg"));
    assert_eq!(report.operations[0].new_path, fixture.path().join("Images/a_1.jpg"));
}

#[test]
fn test_several_conflicts_use_increasing_suffixes() {
    let fixture = TestFixture::new();
    fixture.create_file("Documents/notes.txt", "v0");
    fixture.create_file("Documents/notes_1.txt", "v1");
    fixture.create_file("notes.txt", "v2");

    fixture.organize_completed(false);

    fixture.assert_file_exists("Documents/notes_2.txt");
    assert_eq!(
        fs::read_to_string(fixture.path().join("Documents/notes_1.txt")).unwrap(),
        "v1"
    );
}

#[cfg(unix)]
#[test]
fn test_failed_move_does_not_abort_batch() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.txt"]);
    // A plain file where the Images folder should be makes that move fail.
    fixture.create_file("Images", "not a folder");

    let report = fixture.organize_completed(false);

    assert_eq!(report.operations.len(), 3);
    let image = report
        .operations
        .iter()
        .find(|op| op.filename == "a.jpg")
        .unwrap();
    assert!(image.status.to_string().starts_with("error: "));
    fixture.assert_file_exists("a.jpg");
    fixture.assert_file_exists("Documents/b.txt");
    assert_eq!(report.summary.failed, 1);

    let rows = fixture.report_rows();
    assert_eq!(
        rows.iter().filter(|row| row["status"].starts_with("error: ")).count(),
        1
    );
}

// ============================================================================
// Test Suite 3: Dry-Run Mode
// ============================================================================

#[test]
fn test_scenario_c_dry_run() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.txt", "c.unknownext"]);
    let before = fixture.snapshot();

    let report = fixture.organize_completed(true);

    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.count_dirs(), 0, "Dry-run should not create directories");
    assert_eq!(report.summary.successful, 0);

    let rows = fixture.report_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row["status"] == "dry-run"));
}

#[test]
fn test_dry_run_reports_resolved_names() {
    let fixture = TestFixture::new();
    fixture.create_file("Images/a.jpg", "existing");
    fixture.create_file("a.jpg", "incoming");
    let before = fixture.snapshot();

    let report = fixture.organize_completed(true);

    assert_eq!(report.operations[0].new_path, fixture.path().join("Images/a_1.jpg"));
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_dry_run_then_live_run() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.pdf"]);

    let preview = fixture.organize_completed(true);
    let live = fixture.organize_completed(false);

    let planned: Vec<_> = preview.operations.iter().map(|op| op.new_path.clone()).collect();
    let actual: Vec<_> = live.operations.iter().map(|op| op.new_path.clone()).collect();
    assert_eq!(planned, actual);
}

// ============================================================================
// Test Suite 4: Empty and Missing Folders
// ============================================================================

#[test]
fn test_scenario_d_empty_directory() {
    let fixture = TestFixture::new();

    let outcome = fixture.organize(false);

    assert!(matches!(outcome, RunOutcome::NothingToOrganize));
    assert_eq!(fixture.count_dirs(), 0);
    assert!(!fixture.report_path().exists(), "No report for an empty run");
    assert_eq!(outcome.exit_code(true), 0);
}

#[test]
fn test_missing_directory_is_reported_distinctly() {
    let fixture = TestFixture::new();
    let options = RunOptions::new(fixture.path().join("does-not-exist"))
        .report_path(fixture.report_path());

    let outcome = run(&options, &Config::default()).unwrap();

    assert!(matches!(
        outcome,
        RunOutcome::DirectoryUnavailable(ScanError::NotFound { .. })
    ));
    assert_eq!(outcome.exit_code(false), 0);
    assert_eq!(outcome.exit_code(true), 2);
    assert!(!fixture.report_path().exists());
}

// ============================================================================
// Test Suite 5: Configuration
// ============================================================================

#[test]
fn test_config_filters_and_mappings() {
    let fixture = TestFixture::new();
    fixture.create_files(&["keep.json", "skip.part", ".hidden"]);
    let config = Config::from_toml(
        r#"
        [categories]
        Documents = ["json"]

        [filters]
        enable_hidden_files = false

        [filters.exclude]
        patterns = ["*.part"]
        "#,
    )
    .unwrap();

    let outcome = run(&fixture.options(false), &config).unwrap();
    let RunOutcome::Completed(report) = outcome else {
        panic!("expected a completed run");
    };

    assert_eq!(report.operations.len(), 1);
    fixture.assert_file_exists("Documents/keep.json");
    fixture.assert_file_exists("skip.part");
    fixture.assert_file_exists(".hidden");
}

#[test]
fn test_invalid_config_stops_before_touching_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg"]);
    let config = Config::from_toml("[categories]\nFonts = [\"ttf\"]\n").unwrap();

    let result = run(&fixture.options(false), &config);

    assert!(result.is_err());
    fixture.assert_file_exists("a.jpg");
}

#[test]
fn test_config_file_on_disk() {
    let fixture = TestFixture::new();
    let config_path = fixture.report_dir.path().join("foldersort.toml");
    fs::write(&config_path, "[organizer]\nmax_probes = 3\n").unwrap();

    let (config, source) = Config::load(Some(&config_path)).unwrap();
    assert_eq!(source.as_deref(), Some(config_path.as_path()));
    assert_eq!(config.max_probes().unwrap(), 3);
}
