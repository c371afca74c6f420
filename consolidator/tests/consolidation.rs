//! End-to-end consolidation over temporary batch directories

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use consolidator::{Consolidator, ConsolidatorConfig, ConsolidatorError, SkipReason};
use shared::{ConsolidatedPersona, Persona};

const TIMESTAMP: i64 = 1722945600;

fn persona(name: &str, traits: &[&str]) -> Persona {
    Persona {
        name: name.to_string(),
        username: Some(name.to_lowercase().replace(' ', ".")),
        age: 44,
        traits: traits.iter().map(|t| t.to_string()).collect(),
        background: format!("{name} runs a night market stall."),
        chatting_style: "Lots of questions back.".to_string(),
    }
}

fn write_list(dir: &Path, file_name: &str, personas: &[Persona]) {
    let body = serde_json::to_string_pretty(personas).unwrap();
    std::fs::write(dir.join(file_name), body).unwrap();
}

fn write_lines(dir: &Path, file_name: &str, personas: &[Persona]) {
    let body: String = personas
        .iter()
        .map(|p| format!("{}\n", p.to_json_line().unwrap()))
        .collect();
    std::fs::write(dir.join(file_name), body).unwrap();
}

fn read_corpus(path: &Path) -> Vec<ConsolidatedPersona> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn consolidator_for(input: &Path, output: &Path) -> Consolidator {
    Consolidator::new(ConsolidatorConfig {
        input_dirs: vec![input.to_path_buf()],
        output_dir: output.to_path_buf(),
        output_file: None,
    })
}

#[tokio::test]
async fn test_two_batches_with_one_shared_persona() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let shared_persona = persona("Oda Lind", &["brisk", "loyal"]);
    let mut reordered = shared_persona.clone();
    reordered.traits.reverse();

    write_list(
        input.path(),
        "data_GLM_4.5_Air_1722900000.json",
        &[persona("Anu Rao", &["calm"]), shared_persona, persona("Bex Hart", &["loud"])],
    );
    write_list(
        input.path(),
        "data_Qwen3-8B_1722900001.json",
        &[reordered, persona("Cai Wen", &["shy"])],
    );

    let report = consolidator_for(input.path(), output.path()).run_at(TIMESTAMP).await.unwrap();

    assert_eq!(report.files_found, 2);
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.records_loaded, 5);
    assert_eq!(report.unique_records, 4);
    assert_eq!(report.duplicates_removed(), 1);

    let output_path = report.output_path.unwrap();
    assert_eq!(
        output_path,
        output.path().join(format!("processed_personas_{TIMESTAMP}.jsonl"))
    );

    let corpus = read_corpus(&output_path);
    let labels: Vec<(&str, &str)> = corpus
        .iter()
        .map(|r| (r.persona.name.as_str(), r.model.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("Anu Rao", "GLM_4.5_Air"),
            ("Oda Lind", "GLM_4.5_Air"),
            ("Bex Hart", "GLM_4.5_Air"),
            ("Cai Wen", "Qwen3-8B"),
        ]
    );

    let ids: HashSet<&str> = corpus.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
    assert!(corpus
        .iter()
        .all(|r| r.id.len() == 32 && r.id.chars().all(|c| c.is_ascii_hexdigit())));
}

#[tokio::test]
async fn test_bad_inputs_are_skipped_without_aborting() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_list(input.path(), "data_good_1.json", &[persona("Dov Kern", &["warm"])]);
    std::fs::write(input.path().join("data_object_2.json"), r#"{"not": "a list"}"#).unwrap();
    std::fs::write(input.path().join("data_broken_3.json"), "[{").unwrap();
    write_list(input.path(), "personas.json", &[persona("No Model", &["x"])]);
    std::fs::write(input.path().join("notes.txt"), "ignored").unwrap();

    let report = consolidator_for(input.path(), output.path()).run_at(TIMESTAMP).await.unwrap();

    assert_eq!(report.files_found, 4);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.unique_records, 1);

    let reasons: Vec<(String, SkipReason)> = report
        .skipped
        .iter()
        .map(|s| (s.path.file_name().unwrap().to_string_lossy().into_owned(), s.reason.clone()))
        .collect();
    assert_eq!(reasons.len(), 3);
    assert!(reasons.contains(&("data_object_2.json".to_string(), SkipReason::NotAList)));
    assert!(reasons.contains(&("personas.json".to_string(), SkipReason::UnrecognizedName)));
    assert!(reasons
        .iter()
        .any(|(name, reason)| name == "data_broken_3.json" && matches!(reason, SkipReason::InvalidJson(_))));
}

#[tokio::test]
async fn test_checkpoint_lines_and_multiple_dirs() {
    let run_a = TempDir::new().unwrap();
    let run_b = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let explicit = output.path().join("nested").join("corpus.jsonl");

    write_lines(
        run_a.path(),
        "data_Kimi-K2-Instruct_1722900000.jsonl",
        &[persona("Eli Moss", &["dry"]), persona("Fay Ng", &["bold"])],
    );
    write_lines(run_b.path(), "data_Kimi-K2-Instruct_1722999999.jsonl", &[persona("Eli Moss", &["dry"])]);

    let consolidator = Consolidator::new(ConsolidatorConfig {
        input_dirs: vec![run_a.path().to_path_buf(), run_b.path().to_path_buf()],
        output_dir: output.path().to_path_buf(),
        output_file: Some(explicit.clone()),
    });
    let report = assert_ok!(consolidator.run_at(TIMESTAMP).await);

    assert_eq!(report.files_processed, 2);
    assert_eq!(report.records_loaded, 3);
    assert_eq!(report.unique_records, 2);
    assert_eq!(report.output_path, Some(explicit.clone()));
    assert!(read_corpus(&explicit).iter().all(|r| r.model == "Kimi-K2-Instruct"));
}

#[tokio::test]
async fn test_consolidating_output_again_changes_nothing() {
    let input = TempDir::new().unwrap();
    let first_out = TempDir::new().unwrap();
    let second_in = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();

    write_list(
        input.path(),
        "data_m_1.json",
        &[persona("Gus Orr", &["a", "b"]), persona("Gus Orr", &["b", "a"]), persona("Hal Ito", &["c"])],
    );
    let first = consolidator_for(input.path(), first_out.path()).run_at(1).await.unwrap();
    let first_corpus: Vec<Persona> = read_corpus(&first.output_path.unwrap())
        .into_iter()
        .map(|r| r.persona)
        .collect();

    write_lines(second_in.path(), "data_m_2.jsonl", &first_corpus);
    let second = consolidator_for(second_in.path(), second_out.path()).run_at(2).await.unwrap();

    assert_eq!(first.unique_records, 2);
    assert_eq!(second.unique_records, first.unique_records);
    assert_eq!(second.duplicates_removed(), 0);
}

#[tokio::test]
async fn test_no_batches_writes_nothing() {
    let output = TempDir::new().unwrap();
    let missing: PathBuf = output.path().join("does-not-exist");

    let report = consolidator_for(&missing, output.path()).run_at(TIMESTAMP).await.unwrap();

    assert_eq!(report.files_found, 0);
    assert!(report.output_path.is_none());
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unwritable_output_is_an_error() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_list(input.path(), "data_m_1.json", &[persona("Ivy Cole", &["keen"])]);

    let blocker = output.path().join("file-not-dir");
    std::fs::write(&blocker, "x").unwrap();

    let consolidator = Consolidator::new(ConsolidatorConfig {
        input_dirs: vec![input.path().to_path_buf()],
        output_dir: blocker,
        output_file: None,
    });
    let err = assert_err!(consolidator.run_at(TIMESTAMP).await);
    assert!(matches!(err, ConsolidatorError::OutputError { .. }));
}

#[tokio::test]
async fn test_previous_corpus_in_input_dir_is_not_reingested() {
    let data = TempDir::new().unwrap();
    write_list(
        data.path(),
        "data_m_1.json",
        &[persona("Jo Park", &["wry"]), persona("Kit Vos", &["bold"])],
    );

    let first = assert_ok!(consolidator_for(data.path(), data.path()).run_at(1).await);
    let second = assert_ok!(consolidator_for(data.path(), data.path()).run_at(2).await);

    assert_eq!(first.files_found, 1);
    assert_eq!(second.files_found, 1);
    assert_eq!(second.records_loaded, 2);
    assert!(second.skipped.is_empty());

    let corpus = read_corpus(&second.output_path.unwrap());
    assert_eq!(corpus.len(), 2);
    assert!(corpus.iter().all(|r| r.model == "m"));
}
