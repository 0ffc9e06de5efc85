//! End-to-end pipeline tests: region spec -> OCR -> report -> fields.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma};
use pretty_assertions::assert_eq;

use dropscan_core::error::OcrError;
use dropscan_core::extract::{parse_report_file, FieldRecord};
use dropscan_core::ocr::{run_pipeline, OcrBackend};
use dropscan_core::regions::parse_regions;

/// Backend that answers with a fixed text per call order, standing in
/// for the local engine.
struct FixedBackend {
    answers: std::sync::Mutex<Vec<&'static str>>,
}

impl FixedBackend {
    fn new(answers: Vec<&'static str>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers),
        }
    }
}

impl OcrBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract_region_text(&self, _crop: &GrayImage) -> Result<String, OcrError> {
        let mut answers = self.answers.lock().unwrap();
        Ok(if answers.is_empty() {
            String::new()
        } else {
            answers.remove(0).to_string()
        })
    }
}

fn write_test_image(path: &Path) {
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(120, 120, Luma([255]));
    img.save(path).unwrap();
}

#[test]
fn region_spec_to_field_record() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("invoice.png");
    let report_path = dir.path().join("detected_text.txt");
    write_test_image(&image_path);

    let regions = parse_regions("area_1: [0, 0, 50, 20]\narea_2: [0, 30, 50, 20]\n").unwrap();
    let backend = FixedBackend::new(vec!["INV-100", "2024-03-01"]);

    let result = run_pipeline(&backend, &image_path, &regions, &report_path).unwrap();
    assert_eq!(result.len(), 2);

    let record = parse_report_file(&report_path);
    assert_eq!(
        record,
        FieldRecord {
            invoice_number: Some("INV-100".to_string()),
            date: Some("2024-03-01".to_string()),
            second_product_amount: None,
            total_amount: None,
        }
    );

    // The report is working state; after parsing the caller removes it.
    std::fs::remove_file(&report_path).unwrap();
    assert!(!report_path.exists());
}

#[test]
fn unknown_regions_flow_through_report_but_not_record() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("invoice.png");
    let report_path = dir.path().join("detected_text.txt");
    write_test_image(&image_path);

    let regions = parse_regions("area_9: [0, 0, 50, 20]\narea_4: [0, 30, 50, 20]\n").unwrap();
    let backend = FixedBackend::new(vec!["mystery", "205.00"]);

    let result = run_pipeline(&backend, &image_path, &regions, &report_path).unwrap();
    assert_eq!(result.len(), 2);

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("Text in area_9: mystery"));

    let record = parse_report_file(&report_path);
    assert_eq!(record.total_amount.as_deref(), Some("205.00"));
    assert_eq!(record.invoice_number, None);
}

#[test]
fn concurrent_runs_with_separate_reports_stay_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("invoice.png");
    write_test_image(&image_path);

    let regions = parse_regions("area_1: [0, 0, 50, 20]\n").unwrap();

    // Two extractions in flight at once, each with its own report file.
    std::thread::scope(|s| {
        for (label, answer) in [("first", "INV-100"), ("second", "INV-200")] {
            let image_path = &image_path;
            let regions = &regions;
            let report_path = dir.path().join(format!("report-{label}.txt"));
            s.spawn(move || {
                let backend = FixedBackend::new(vec![answer]);
                run_pipeline(&backend, image_path, regions, &report_path).unwrap();
                let record = parse_report_file(&report_path);
                assert_eq!(record.invoice_number.as_deref(), Some(answer));
            });
        }
    });
}

#[test]
fn out_of_bounds_region_yields_empty_field() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("invoice.png");
    let report_path = dir.path().join("detected_text.txt");
    write_test_image(&image_path);

    // area_1 lies wholly outside the 120x120 image and is clipped away.
    let regions = parse_regions("area_1: [500, 500, 40, 40]\narea_2: [0, 0, 40, 40]\n").unwrap();
    let backend = FixedBackend::new(vec!["2024-06-15"]);

    let result = run_pipeline(&backend, &image_path, &regions, &report_path).unwrap();
    assert_eq!(result.len(), 2);

    let record = parse_report_file(&report_path);
    assert_eq!(record.invoice_number.as_deref(), Some(""));
    assert_eq!(record.date.as_deref(), Some("2024-06-15"));
}
