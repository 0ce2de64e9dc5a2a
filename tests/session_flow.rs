use image::{DynamicImage, ImageBuffer, Rgb};
use posematch::capture::{FrameSource, ImageDirSource};
use posematch::common::Label;
use posematch::pose::ReplayModelLoader;
use posematch::render::{RecordingRenderer, RenderEvent};
use posematch::store::{CAPTURED_POSES_KEY, FINAL_SCORE_KEY, MemoryStore, ResultStore};
use posematch::{App, AppError, Configuration};
use std::path::Path;
use std::sync::Arc;

fn write_model(dir: &Path, labels: &[&str], replay: &str) {
    let metadata = serde_json::json!({ "modelName": "test-poses", "labels": labels });
    std::fs::write(dir.join("model.json"), "{}").unwrap();
    std::fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
    std::fs::write(dir.join("replay.json"), replay).unwrap();
}

fn model_url(dir: &Path) -> String {
    format!("{}/", dir.display())
}

fn app(store: &MemoryStore, renderer: &RecordingRenderer, picks: &[&str]) -> App {
    App::new(
        Configuration::default(),
        Arc::new(ReplayModelLoader::new()),
        Arc::new(renderer.clone()),
    )
    .with_store(Arc::new(store.clone()))
    .with_frame_source(|configuration: &Configuration| -> Box<dyn FrameSource> {
        Box::new(ImageDirSource::from_images(
            vec![DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
                32,
                32,
                Rgb([200, 100, 50]),
            ))],
            configuration.frame_size,
            configuration.flip,
        ))
    })
    .with_picks(picks.iter().map(|l| Label::from(*l)).collect())
}

#[tokio::test(start_paused = true)]
async fn completing_all_labels_hands_results_to_the_score_page() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        &["sit", "stand"],
        r#"[
            {"probabilities": {"sit": 0.95, "stand": 0.1}},
            {"probabilities": {"sit": 0.1, "stand": 0.8}}
        ]"#,
    );
    let store = MemoryStore::new();
    let renderer = RecordingRenderer::new();

    let results = app(&store, &renderer, &["sit", "stand"])
        .run(&model_url(dir.path()))
        .await
        .unwrap();

    // Two matches plus the bonus for ~173 seconds left.
    assert_eq!(results.score_text(), "3.7");
    let labels: Vec<&str> = results
        .captures()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["sit", "stand"]);
    assert!(results.captures()[0]
        .image
        .as_data_uri()
        .starts_with("data:image/png;base64,"));

    assert!(store.get(FINAL_SCORE_KEY).is_some());
    assert!(store.get(CAPTURED_POSES_KEY).is_some());

    let events = renderer.events();
    assert!(events.contains(&RenderEvent::Score(2)));
    assert!(events.contains(&RenderEvent::Labels(vec![
        posematch::render::LabelButton {
            label: "sit".into(),
            enabled: false
        },
        posematch::render::LabelButton {
            label: "stand".into(),
            enabled: false
        },
    ])));
}

#[tokio::test(start_paused = true)]
async fn running_out_of_time_keeps_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        &["sit", "stand", "wave"],
        r#"[{"probabilities": {"sit": 0.9}}]"#,
    );
    let store = MemoryStore::new();
    let renderer = RecordingRenderer::new();

    let results = app(&store, &renderer, &[])
        .run(&model_url(dir.path()))
        .await
        .unwrap();

    assert_eq!(results.score(), Some(1.0));
    assert_eq!(results.score_text(), "1.0");
    assert_eq!(results.captures().len(), 1);
    assert_eq!(results.captures()[0].label, Label::from("sit"));
    assert!(renderer.events().contains(&RenderEvent::Time(0)));
}

#[tokio::test]
async fn empty_model_url_never_leaves_setup() {
    let store = MemoryStore::new();
    store.put(FINAL_SCORE_KEY, "9.9".to_string());
    let renderer = RecordingRenderer::new();

    let result = app(&store, &renderer, &[]).run("").await;
    assert!(matches!(result, Err(AppError::ConfigurationMissing)));
    assert_eq!(renderer.alerts(), vec!["Please enter a model URL.".to_string()]);
    assert!(store.is_empty());
}

#[tokio::test]
async fn broken_model_sends_the_player_back() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.json"), "{}").unwrap();
    std::fs::write(dir.path().join("metadata.json"), "{ not json").unwrap();
    let store = MemoryStore::new();
    let renderer = RecordingRenderer::new();

    let result = app(&store, &renderer, &[]).run(&model_url(dir.path())).await;
    assert!(matches!(result, Err(AppError::ModelLoad(_))));
    assert_eq!(
        renderer.alerts(),
        vec!["Failed to load model. Please check the URL and try again.".to_string()]
    );
}

#[tokio::test]
async fn model_with_a_repeated_label_sends_the_player_back() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), &["sit", "sit"], "[]");
    let store = MemoryStore::new();
    let renderer = RecordingRenderer::new();

    let result = app(&store, &renderer, &[]).run(&model_url(dir.path())).await;
    assert!(matches!(result, Err(AppError::ModelLoad(_))));
    assert!(result.is_err_and(|e| e.is_setup_failure()));
    assert_eq!(
        renderer.alerts(),
        vec!["Failed to load model. Please check the URL and try again.".to_string()]
    );
    assert!(store.get(FINAL_SCORE_KEY).is_none());
}
