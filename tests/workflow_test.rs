//! End-to-end sorter and label workflows against a mock API.

use qrmagic::capture::ndjson;
use qrmagic::client::LabelPdfRequest;
use qrmagic::config::ImageSortConfig;
use qrmagic::imagesort::RELOCATE_FN;
use qrmagic::{ImageSortSession, LabelSheet, QrMagicClient};

mod common;

#[tokio::test]
async fn test_scan_sort_autofill_and_script() {
    let dir = tempfile::tempdir().unwrap();
    // Server answers in arbitrary order; capture times decide the sequence.
    let state = common::MockState::new()
        .with_scan("IMG_0003.jpg", &[], "2021-05-03T12:00:25")
        .with_scan("IMG_0001.jpg", &["KDM001"], "2021-05-03T12:00:00")
        .with_scan("IMG_0002.jpg", &[], "2021-05-03T12:00:20")
        .with_scan("IMG_0004.jpg", &["KDM002", "AA"], "2021-05-03T12:05:00")
        .with_scan("IMG_0005.jpg", &[], "2021-05-03T12:10:00");
    let (addr, _state) = common::start_mock_api(state).await;

    let paths = common::write_images(
        dir.path(),
        &["IMG_0005.jpg", "IMG_0003.jpg", "IMG_0001.jpg", "IMG_0004.jpg", "IMG_0002.jpg", "IMG_0006.jpg"],
    );

    let client = QrMagicClient::new(&common::config_for(addr, 2)).unwrap();
    let mut session = ImageSortSession::new(ImageSortConfig::default());
    let report = session.scan_files(&client, &paths).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(session.progress().unwrap().done, 6);

    let order: Vec<_> = session.records().iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(
        order,
        vec!["IMG_0001.jpg", "IMG_0002.jpg", "IMG_0003.jpg", "IMG_0004.jpg", "IMG_0005.jpg"]
    );
    assert_eq!(session.records()[3].id, "AA_KDM002");

    // Only the first of a run of empty IDs is filled.
    assert_eq!(session.autofill_all(), 1);
    let ids: Vec<_> = session.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["KDM001", "KDM001", "", "AA_KDM002", ""]);

    // A second pass carries the ID one step further.
    assert_eq!(session.autofill_all(), 1);
    assert_eq!(session.records()[2].id, "KDM001");
    assert_eq!(session.unlabelled_count(), 1);

    let script = session.renamer_script().unwrap();
    let lines: Vec<_> = script.lines().collect();
    assert_eq!(lines[0], RELOCATE_FN);
    assert_eq!(lines.len(), 5);
    assert_eq!(
        shlex::split(lines[4]).unwrap(),
        vec!["relocate", "IMG_0004.jpg", "AA_KDM002/IMG_0004.jpg"]
    );
}

#[tokio::test]
async fn test_ndjson_round_trip_into_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = common::MockState::new()
        .with_scan("b.jpg", &[], "2021-05-03T12:00:10")
        .with_scan("a.jpg", &["KDM009"], "2021-05-03T12:00:00");
    let (addr, _state) = common::start_mock_api(state).await;
    let client = QrMagicClient::new(&common::config_for(addr, 2)).unwrap();

    let mut responses = Vec::new();
    for path in common::write_images(dir.path(), &["b.jpg", "a.jpg"]) {
        responses.push(client.scan_file(&path).await.unwrap());
    }
    let saved = dir.path().join("scans.ndjson");
    ndjson::save_ndjson_file(&saved, &responses).unwrap();

    let mut session = ImageSortSession::new(ImageSortConfig::default());
    assert_eq!(session.import_ndjson(&saved).unwrap(), 2);
    assert!(session.fill_one(1).unwrap());
    assert_eq!(session.records()[1].id, "KDM009");
    assert_eq!(session.records()[0].lat, Some(-35.27));
}

#[tokio::test]
async fn test_label_pdf_requests() {
    let (addr, state) = common::start_mock_api(common::MockState::new()).await;
    let client = QrMagicClient::new(&common::config_for(addr, 1)).unwrap();

    let mut sheet = LabelSheet::new();
    sheet.select("Zweckform6252").unwrap();
    sheet.set_layout("qr_left_verticaltext").unwrap();
    sheet.fill(["KDM001", "KDM002"]);

    let pdf = client.generate_labels(&sheet.id_list_request().unwrap()).await.unwrap();
    assert_eq!(pdf, common::MOCK_PDF);

    let range = sheet.range_request("KDM{:03d}", 1, 40).unwrap();
    let pdf = client.generate_labels(&range).await.unwrap();
    assert_eq!(pdf, common::MOCK_PDF);

    let requests = state.label_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0]["label_type"], "Zweckform6252");
    assert_eq!(requests[0]["layout"], "qr_left_verticaltext");
    let ids_txt = requests[0]["ids_txt"].as_str().unwrap();
    assert!(ids_txt.starts_with("KDM001\nKDM002\n"));
    assert_eq!(ids_txt.split('\n').count(), 20);
    assert!(requests[0].get("id_format").is_none());

    assert_eq!(requests[1]["id_format"], "KDM{:03d}");
    assert_eq!(requests[1]["id_start"], 1);
    assert_eq!(requests[1]["id_end"], 40);
    assert!(requests[1].get("ids_txt").is_none());

    // Bodies decode back into the same request shapes.
    let decoded: LabelPdfRequest = serde_json::from_value(requests[1].clone()).unwrap();
    assert_eq!(decoded, range);
}
