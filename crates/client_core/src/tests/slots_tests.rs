use super::*;

fn png(name: &str) -> SlotFile {
    SlotFile::new(name, Some("image/png".to_string()), vec![0x89, b'P', b'N', b'G'])
}

#[test]
fn ready_only_when_both_slots_hold_a_file() {
    let cases = [(false, false), (true, false), (false, true), (true, true)];
    for (fill_first, fill_second) in cases {
        let mut slots = UploadSlots::new();
        if fill_first {
            slots.select_file(SlotId::Slot1, Some(png("a.png")));
        }
        if fill_second {
            slots.select_file(SlotId::Slot2, Some(png("b.png")));
        }
        assert_eq!(slots.is_ready(), fill_first && fill_second);
    }
}

#[test]
fn cancelled_selection_keeps_previous_file() {
    let mut slots = UploadSlots::new();
    assert!(slots.select_file(SlotId::Slot1, Some(png("a.png"))));
    let generation = slots.slot(SlotId::Slot1).generation();

    assert!(!slots.select_file(SlotId::Slot1, None));
    assert_eq!(slots.file(SlotId::Slot1).map(SlotFile::name), Some("a.png"));
    assert_eq!(slots.slot(SlotId::Slot1).generation(), generation);
}

#[test]
fn last_selection_wins_and_bumps_generation() {
    let mut slots = UploadSlots::new();
    slots.select_file(SlotId::Slot2, Some(png("first.png")));
    slots.select_file(SlotId::Slot2, Some(png("second.png")));

    assert_eq!(slots.file(SlotId::Slot2).map(SlotFile::name), Some("second.png"));
    assert_eq!(slots.slot(SlotId::Slot2).generation(), 2);
    assert_eq!(slots.slot(SlotId::Slot1).generation(), 0);
}

#[test]
fn zero_byte_file_does_not_fill_a_slot() {
    let mut slots = UploadSlots::new();
    slots.select_file(SlotId::Slot1, Some(png("a.png")));
    slots.select_file(SlotId::Slot2, Some(SlotFile::new("empty.png", None, Vec::new())));

    assert!(!slots.is_ready());
    assert_eq!(slots.missing(), vec![SlotId::Slot2]);
    assert!(slots.ready_pair().is_none());
}

#[test]
fn ready_pair_shares_file_bytes() {
    let mut slots = UploadSlots::new();
    slots.select_file(SlotId::Slot1, Some(png("a.png")));
    slots.select_file(SlotId::Slot2, Some(png("b.png")));

    let (first, second) = slots.ready_pair().expect("pair");
    assert_eq!(first.name(), "a.png");
    assert_eq!(second.name(), "b.png");
    let held = slots.file(SlotId::Slot1).expect("slot 1").shared_bytes();
    assert!(Arc::ptr_eq(&held, &first.shared_bytes()));
}

#[test]
fn recognizes_image_filenames() {
    assert!(is_image_filename("photo.PNG"));
    assert!(is_image_filename("scan.tiff"));
    assert!(!is_image_filename("notes.txt"));
    assert!(!is_image_filename("png"));
}

#[tokio::test]
async fn reads_file_bytes_and_guesses_mime_type() {
    let dir = std::env::temp_dir().join(format!("combiner_slots_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("dir");
    let path = dir.join("left.jpg");
    tokio::fs::write(&path, b"jpeg-bytes").await.expect("write");

    let file = SlotFile::read_from_path(&path).await.expect("read");
    assert_eq!(file.name(), "left.jpg");
    assert_eq!(file.mime_type(), Some("image/jpeg"));
    assert_eq!(file.bytes(), b"jpeg-bytes");

    let missing = SlotFile::read_from_path(&dir.join("missing.png")).await;
    assert!(missing.is_err());

    tokio::fs::remove_dir_all(dir).await.expect("cleanup");
}
