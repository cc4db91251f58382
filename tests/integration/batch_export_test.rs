// Batch export over real files

use super::support::{write_png, BoxGlyphs};
use firemark::batch::{output_file_name, BatchExporter, DiskSaver, FileSaver, SaveOutcome};
use firemark::imaging::{decode_file, OutputFormat};
use firemark::persistence::{load_settings, save_settings, FileStore};
use firemark::state::AppState;
use std::cell::RefCell;
use std::path::Path;

/// Records every save request and writes nothing.
#[derive(Default)]
struct RecordingSaver {
    calls: RefCell<Vec<String>>,
}

impl FileSaver for RecordingSaver {
    fn save(&self, data: &[u8], directory: &Path, original_name: &str, format: OutputFormat) -> SaveOutcome {
        assert!(!data.is_empty());
        self.calls.borrow_mut().push(original_name.to_string());
        SaveOutcome::Saved(directory.join(output_file_name(original_name, format)))
    }
}

#[test]
fn test_batch_continues_past_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 1..=5 {
        let name = format!("img{}.png", i);
        let path = write_png(dir.path(), &name, 40, 30);
        if i == 3 {
            std::fs::write(&path, b"corrupt").unwrap();
        }
        paths.push(path);
    }

    let mut state = AppState::new();
    state.add_images(&paths);
    state.add_text_layer();
    state.output_dir = Some(dir.path().join("out"));

    let saver = RecordingSaver::default();
    let mut progress = Vec::new();
    let report = BatchExporter::new(&saver)
        .run(&mut state, &BoxGlyphs, |p| progress.push((p.done, p.total, p.percent())))
        .unwrap();

    assert_eq!(
        *saver.calls.borrow(),
        vec!["img1.png", "img2.png", "img4.png", "img5.png"]
    );
    assert_eq!(report.saved.len(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].image, "img3.png");

    let done: Vec<usize> = progress.iter().map(|p| p.0).collect();
    assert_eq!(done, vec![1, 2, 3, 4, 5]);
    assert_eq!(progress.last().map(|p| p.2), Some(100));
}

#[test]
fn test_disk_export_writes_decodable_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "holiday.png", 120, 80);
    let out = dir.path().join("export");
    std::fs::create_dir_all(&out).unwrap();

    let mut state = AppState::new();
    state.add_images([&source]);
    state.add_icon_layer();
    state.settings.output.format = OutputFormat::Webp;
    state.output_dir = Some(out.clone());

    let report = BatchExporter::new(&DiskSaver)
        .run(&mut state, &BoxGlyphs, |_| {})
        .unwrap();

    let written = out.join("holiday-watermarked.webp");
    assert_eq!(report.saved, vec![written.clone()]);
    assert_eq!(decode_file(&written).unwrap().dimensions(), (120, 80));
}

#[test]
fn test_saved_logo_settings_restore_bitmaps() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_png(dir.path(), "brand.png", 16, 8);
    let store = FileStore::open(dir.path().join("store")).unwrap();

    let mut state = AppState::new();
    state.add_logo_layer(&logo).unwrap();
    save_settings(&store, &state.settings).unwrap();

    let restored = AppState::with_settings(load_settings(&store));
    assert_eq!(restored.settings, state.settings);
    assert_eq!(restored.logos.dimensions(&logo), Some((16, 8)));
    assert!(restored.active_layer.is_none());
}
