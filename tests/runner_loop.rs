mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{FakeSource, RecordingBackend, TestEnvironment};
use wallloop::images::{Downloader, ImageSource, ensure_images};
use wallloop::runner::{CancellationToken, Runner};
use wallloop::store::{MetadataEntry, MetadataStore, SessionStore};
use wallloop::wallpaper::WallpaperSetter;

struct Rig {
    setter: WallpaperSetter,
    metadata: MetadataStore,
    sessions: SessionStore,
    applied: Arc<Mutex<Vec<std::path::PathBuf>>>,
    token: CancellationToken,
}

fn rig(env: &TestEnvironment, stop_after: usize) -> Rig {
    let token = CancellationToken::new();
    let applied = Arc::new(Mutex::new(Vec::new()));
    let setter = WallpaperSetter::new(Box::new(RecordingBackend::new(
        applied.clone(),
        token.clone(),
        stop_after,
    )));
    Rig {
        setter,
        metadata: MetadataStore::new(&env.paths.metadata_file),
        sessions: SessionStore::new(&env.paths.session_file),
        applied,
        token,
    }
}

#[tokio::test]
async fn unshuffled_loop_cycles_in_order_and_logs_each_step() {
    let env = TestEnvironment::new().unwrap();
    let a = env.add_session_image("a.png");
    let b = env.add_session_image("b.png");
    let images = vec![a.clone(), b.clone()];
    let rig = rig(&env, 5);

    let steps = Runner::new(&rig.setter, &rig.metadata, &rig.sessions, rig.token.clone())
        .run(&images, 0, false)
        .await;

    assert_eq!(steps, 5);
    assert_eq!(
        *rig.applied.lock().unwrap(),
        vec![a.clone(), b.clone(), a.clone(), b.clone(), a.clone()]
    );

    let counts: Vec<u64> = rig
        .metadata
        .entries()
        .iter()
        .map(|entry| match entry {
            MetadataEntry::Run { count, .. } => *count,
            other => panic!("unexpected entry {:?}", other),
        })
        .collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);

    let checkpoint = rig.sessions.load().unwrap();
    assert_eq!(checkpoint.images, images);
    assert_eq!(checkpoint.duration, 0);
    assert!(!checkpoint.shuffle);
}

#[tokio::test]
async fn checkpoint_keeps_earlier_session_preferences() {
    let env = TestEnvironment::new().unwrap();
    let a = env.add_session_image("a.png");
    let rig = rig(&env, 1);
    rig.sessions
        .save(&wallloop::store::Session {
            theme: Some("graffiti".into()),
            online_count: 7,
            ..Default::default()
        })
        .unwrap();

    Runner::new(&rig.setter, &rig.metadata, &rig.sessions, rig.token.clone())
        .run(&[a.clone()], 0, true)
        .await;

    let checkpoint = rig.sessions.load().unwrap();
    assert_eq!(checkpoint.theme.as_deref(), Some("graffiti"));
    assert_eq!(checkpoint.online_count, 7);
    assert_eq!(checkpoint.images, vec![a]);
    assert!(checkpoint.shuffle);
    assert!(checkpoint.timestamp.is_some());
}

#[tokio::test]
async fn cancel_interrupts_a_long_wait() {
    let env = TestEnvironment::new().unwrap();
    let a = env.add_session_image("a.png");
    let rig = rig(&env, usize::MAX);

    let token = rig.token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let steps = Runner::new(&rig.setter, &rig.metadata, &rig.sessions, rig.token.clone())
        .run(&[a], 3600, false)
        .await;

    assert_eq!(steps, 1);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(rig.sessions.load().is_some());
}

#[tokio::test]
async fn download_then_step_appends_two_typed_entries() {
    let env = TestEnvironment::new().unwrap();
    assert!(env.metadata_json().is_empty());

    let source = Arc::new(FakeSource::default());
    let metadata = MetadataStore::new(&env.paths.metadata_file);
    let downloader = Downloader::new(
        &env.paths.images_dir,
        metadata,
        source.clone() as Arc<dyn ImageSource>,
    )
    .with_polite_delay(Duration::ZERO);

    let downloaded = downloader.download("nature", 1, true).await;
    assert_eq!(downloaded.len(), 1);

    let rig = rig(&env, 1);
    Runner::new(&rig.setter, &rig.metadata, &rig.sessions, rig.token.clone())
        .run(&downloaded, 0, false)
        .await;

    let entries = env.metadata_json();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["type"], "download");
    assert_eq!(entries[0]["theme"], "nature");
    assert_eq!(entries[1]["type"], "run");
    assert_eq!(entries[1]["count"], 1);
}

#[tokio::test]
async fn empty_list_triggers_forced_download() {
    let env = TestEnvironment::new().unwrap();
    let source = Arc::new(FakeSource::default());
    let downloader = Downloader::new(
        &env.paths.images_dir,
        MetadataStore::new(&env.paths.metadata_file),
        source.clone() as Arc<dyn ImageSource>,
    )
    .with_polite_delay(Duration::ZERO);

    let images = ensure_images(Vec::new(), &env.paths.images_dir, Some(&downloader), "graffiti", 2)
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(source.calls(), 2);
    assert!(images.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn unwritable_stores_do_not_stop_the_loop() {
    let env = TestEnvironment::new().unwrap();
    let a = env.add_session_image("a.png");
    let blocked = env.path().join("blocked");
    std::fs::create_dir_all(&blocked).unwrap();

    let token = CancellationToken::new();
    let applied = Arc::new(Mutex::new(Vec::new()));
    let setter = WallpaperSetter::new(Box::new(RecordingBackend::new(
        applied.clone(),
        token.clone(),
        3,
    )));
    // directories in place of the files make every write fail
    let metadata = MetadataStore::new(&blocked);
    let sessions = SessionStore::new(&blocked);

    let steps = Runner::new(&setter, &metadata, &sessions, token)
        .run(&[a], 0, false)
        .await;

    assert_eq!(steps, 3);
    assert_eq!(applied.lock().unwrap().len(), 3);
    assert!(metadata.entries().is_empty());
    assert!(sessions.load().is_none());
    assert!(blocked.is_dir());
}
