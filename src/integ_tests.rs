//! Integration tests for the export pipeline
//!
//! These tests drive `runner::run_once` end to end against in-memory Forms and
//! Sheets services, writing real configuration and output files to temporary
//! directories.

#[cfg(test)]
mod tests {
    use crate::{
        io::forms::{FormMetadata, ResponseDestination},
        io::{CredentialProvider, ValueInputOption},
        runner::{CycleStats, RunArgs, run_once},
        test_support::{MockForms, MockProvider, MockSheets, SheetCall, grid, response},
    };
    use calamine::{Reader, Xlsx, open_workbook};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    // ============ Test Helpers ============

    /// Write `yaml` as config.yml in `dir` and return its path
    async fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("config.yml");
        tokio::fs::write(&path, yaml).await.unwrap();
        path
    }

    /// Run one pass with the given services injected
    async fn run_with(
        dir: &TempDir,
        yaml: &str,
        provider: Arc<dyn CredentialProvider>,
    ) -> CycleStats {
        let config_path = write_config(dir, yaml).await;
        let mut args = RunArgs::new(config_path);
        args.test_credentials = Some(provider);
        run_once(args).await.unwrap()
    }

    fn services(forms: MockForms, sheets: MockSheets) -> (Arc<MockProvider>, Arc<MockSheets>) {
        let sheets = Arc::new(sheets);
        let provider = Arc::new(MockProvider::new(Arc::new(forms), sheets.clone()));
        (provider, sheets)
    }

    fn linked(sheet_id: &str) -> FormMetadata {
        FormMetadata {
            response_destination: Some(ResponseDestination {
                destination_type: Some("SPREADSHEET".to_string()),
                spreadsheet: Some(sheet_id.to_string()),
            }),
            linked_sheet_id: None,
        }
    }

    fn two_responses() -> MockForms {
        MockForms::new().with_responses(
            "form-a",
            vec![
                response("ACYDBN0001", "2024-03-02T10:00:00Z", &[("name", "Ada")]),
                response("ACYDBN0002", "2024-03-01T09:00:00Z", &[("name", "Bob")]),
            ],
        )
    }

    async fn read_lines(path: PathBuf) -> Vec<String> {
        tokio::fs::read_to_string(path)
            .await
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    // ============ Tests ============

    #[tokio::test]
    async fn test_direct_responses_exported_sorted() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    fileName: out.txt\n",
            provider,
        )
        .await;

        assert_eq!(stats.forms_exported, 1);
        assert_eq!(stats.rows_exported, 2);

        let lines = read_lines(dir.path().join("out.txt")).await;
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("responseId"));
        assert!(lines[0].contains("createTime"));
        assert!(lines[0].ends_with("name"));
        // earlier creation time first, ids masked to their last three characters
        assert!(lines[1].starts_with("...002"));
        assert!(lines[1].ends_with("Bob"));
        assert!(lines[2].starts_with("...001"));
    }

    #[tokio::test]
    async fn test_no_data_and_no_destination_skips_export() {
        let dir = TempDir::new().unwrap();
        let (provider, sheets) = services(MockForms::new(), MockSheets::new());

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    fileName: out.txt\n",
            provider,
        )
        .await;

        assert_eq!(stats.forms_without_data, 1);
        assert_eq!(stats.forms_exported, 0);
        assert!(sheets.calls().is_empty());
        assert!(!dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_falls_back_to_linked_sheet() {
        let dir = TempDir::new().unwrap();
        let forms = MockForms::new()
            .with_list_error("form-a", "HTTP 403 Forbidden")
            .with_metadata("form-a", linked("linked-1"));
        let sheets = MockSheets::new().with_spreadsheet(
            "linked-1",
            &["Form Responses 1"],
            grid(&[
                &["Timestamp", "Name", "Color"],
                &["3/1/2024 9:00:00", "Ada", "red"],
                &["3/2/2024 9:00:00", "Bob"],
            ]),
        );
        let (provider, _) = services(forms, sheets);

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    fileName: out.txt\n",
            provider,
        )
        .await;

        assert_eq!(stats.forms_exported, 1);
        assert_eq!(stats.rows_exported, 2);

        let lines = read_lines(dir.path().join("out.txt")).await;
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Timestamp"));
        assert!(lines[0].ends_with("Color"));
        assert!(lines[1].ends_with("red"));
        // the short row has an empty Color cell, trimmed away
        assert!(lines[2].ends_with("Bob"));
    }

    #[tokio::test]
    async fn test_linked_sheet_with_repeated_headers_keeps_all_columns() {
        let dir = TempDir::new().unwrap();
        let forms = MockForms::new().with_metadata("form-a", linked("linked-1"));
        let sheets = MockSheets::new()
            .with_spreadsheet(
                "linked-1",
                &["Form Responses 1"],
                grid(&[&["Timestamp", "Name", "Name"], &["t1", "first", "second"]]),
            )
            .with_spreadsheet("dest-1", &["Sheet1"], Vec::new());
        let (provider, sheets) = services(forms, sheets);

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    exportFormat: spreadsheet\n    spreadsheetId: dest-1\n",
            provider,
        )
        .await;

        assert_eq!(stats.forms_exported, 1);
        let update = sheets
            .calls()
            .into_iter()
            .find_map(|call| match call {
                SheetCall::Update(_, _, values, _) => Some(values),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            update,
            grid(&[&["Timestamp", "Name", "Name.1"], &["t1", "first", "second"]])
        );
    }

    #[tokio::test]
    async fn test_spreadsheet_target_cleared_then_written() {
        let dir = TempDir::new().unwrap();
        let (provider, sheets) = services(two_responses(), MockSheets::new());

        let stats = run_with(
            &dir,
            r#"
forms:
  - formId: form-a
    exportFormat: spreadsheet
    spreadsheetId: dest-1
    sheetName: Responses
"#,
            provider,
        )
        .await;

        assert_eq!(stats.forms_exported, 1);

        let calls = sheets.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            SheetCall::Clear("dest-1".to_string(), "'Responses'".to_string())
        );
        match &calls[1] {
            SheetCall::Update(id, range, values, input) => {
                assert_eq!(id, "dest-1");
                assert_eq!(range, "'Responses'!A1");
                assert_eq!(values[0], ["responseId", "createTime", "name"]);
                assert_eq!(values.len(), 3);
                assert_eq!(*input, ValueInputOption::UserEntered);
            }
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_xlsx_export() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    exportFormat: xlsx\n    fileName: exports/out.xlsx\n",
            provider,
        )
        .await;

        assert_eq!(stats.forms_exported, 1);

        let mut workbook: Xlsx<_> = open_workbook(dir.path().join("exports/out.xlsx")).unwrap();
        assert_eq!(workbook.sheet_names().len(), 1);
        let range = workbook.worksheet_range("Sheet1").unwrap();
        assert_eq!(range.start(), Some((0, 0)));

        let cells: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        assert_eq!(cells[0], ["responseId", "createTime", "name"]);
        // sorted by creation time, ids masked
        assert_eq!(cells[1], ["...002", "2024-03-01T09:00:00Z", "Bob"]);
        assert_eq!(cells[2], ["...001", "2024-03-02T10:00:00Z", "Ada"]);
    }

    #[tokio::test]
    async fn test_config_error_does_not_stop_other_forms() {
        let dir = TempDir::new().unwrap();
        let forms = two_responses().with_responses(
            "form-b",
            vec![response("r-b-1", "2024-01-01T00:00:00Z", &[("q", "x")])],
        );
        let (provider, _) = services(forms, MockSheets::new());

        let stats = run_with(
            &dir,
            r#"
forms:
  - formId: form-a
  - formId: form-b
    exportFormat: parquet
    fileName: b.parquet
  - formId: form-b
    fileName: b.txt
"#,
            provider,
        )
        .await;

        assert_eq!(stats.forms_processed, 3);
        assert_eq!(stats.forms_failed, 2);
        assert_eq!(stats.forms_exported, 1);
        assert!(dir.path().join("b.txt").exists());
        assert!(!dir.path().join("b.parquet").exists());
    }

    #[tokio::test]
    async fn test_disabled_form_is_skipped() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    fileName: out.txt\n    enabled: false\n",
            provider.clone(),
        )
        .await;

        assert_eq!(stats.forms_disabled, 1);
        assert_eq!(provider.acquisitions(), 0);
        assert!(!dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_credential_failure_is_per_form() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(
            MockProvider::new(Arc::new(two_responses()), Arc::new(MockSheets::new())).failing(),
        );

        let stats = run_with(
            &dir,
            "forms:\n  - formId: form-a\n    fileName: a.txt\n  - formId: form-b\n    fileName: b.txt\n",
            provider.clone(),
        )
        .await;

        assert_eq!(stats.forms_failed, 2);
        assert_eq!(provider.acquisitions(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let (provider, sheets) = services(two_responses(), MockSheets::new().failing_writes());

        let stats = run_with(
            &dir,
            r#"
forms:
  - formId: form-a
    exportFormat: spreadsheet
    spreadsheetId: dest-1
  - formId: form-a
    fileName: out.txt
"#,
            provider,
        )
        .await;

        assert_eq!(stats.forms_failed, 1);
        assert_eq!(stats.forms_exported, 1);
        assert!(
            !sheets
                .calls()
                .iter()
                .any(|c| matches!(c, SheetCall::Update(..)))
        );
        assert!(dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_mapping_overrides_rename_columns() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());

        run_with(
            &dir,
            r#"
forms:
  - formId: form-a
    fileName: out.txt
mappingOverrides:
  name: Full Name
  createTime: Submitted
"#,
            provider,
        )
        .await;

        let lines = read_lines(dir.path().join("out.txt")).await;
        assert!(lines[0].contains("Submitted"));
        assert!(lines[0].ends_with("Full Name"));
        assert!(!lines[0].contains("createTime"));
    }

    #[tokio::test]
    async fn test_repeated_passes_produce_identical_output() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());
        let yaml = "forms:\n  - formId: form-a\n    fileName: out.txt\nmappingOverrides:\n  name: Name\n";

        run_with(&dir, yaml, provider.clone()).await;
        let first = tokio::fs::read_to_string(dir.path().join("out.txt"))
            .await
            .unwrap();

        run_with(&dir, yaml, provider).await;
        let second = tokio::fs::read_to_string(dir.path().join("out.txt"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_output_dir_override() {
        let config_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let (provider, _) = services(two_responses(), MockSheets::new());

        let config_path = write_config(
            &config_dir,
            "forms:\n  - formId: form-a\n    fileName: out.txt\n",
        )
        .await;
        let mut args = RunArgs::new(config_path);
        args.output_dir = Some(output_dir.path().to_path_buf());
        args.test_credentials = Some(provider);

        let stats = run_once(args).await.unwrap();

        assert_eq!(stats.forms_exported, 1);
        assert!(output_dir.path().join("out.txt").exists());
        assert!(!config_dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "forms:\n  - formId: form-a\nmappingOverrides:\n  a: X\n  b: X\n",
        )
        .await;

        let err = run_once(RunArgs::new(config_path)).await.unwrap_err();
        assert!(format!("{:#}", err).contains("both rename to 'X'"));
    }
}
