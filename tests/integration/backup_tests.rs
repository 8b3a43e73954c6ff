//! End-to-end backup runs against a mock site

use crate::fixtures::{fetcher, list_page, lists_page, scraper, test_config, watched_page};
use rating_vault::backup::{BackupOptions, BackupOutcome, BackupRunner};
use rating_vault::output::{read_backup_csv_from_path, DatasetOrigin};
use rating_vault::session::{Session, SESSION_FILE};
use rating_vault::Language;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "42";

async fn mount(server: &MockServer, route: &str, params: &[(&str, &str)], body: String, hits: u64) {
    let mut mock = Mock::given(method("GET")).and(path(route));
    for (key, value) in params {
        mock = mock.and(query_param(*key, *value));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_not_found(server: &MockServer, route: &str, params: &[(&str, &str)]) {
    let mut mock = Mock::given(method("GET")).and(path(route));
    for (key, value) in params {
        mock = mock.and(query_param(*key, *value));
    }
    mock.respond_with(ResponseTemplate::new(404)).mount(server).await;
}

/// A user with one list of two movies and three rated movies
async fn mount_site(server: &MockServer, watched_hits: u64) {
    // Later pages first: the catch-all user-lists mock also answers validation
    mount_not_found(server, "/en/userlists.php", &[("p", "2")]).await;
    mount(
        server,
        "/en/userlists.php",
        &[],
        lists_page(&[("Best: of all", "/en/mylist.php?list_id=5")]),
        2,
    )
    .await;

    mount_not_found(server, "/en/mylist.php", &[("page", "2")]).await;
    mount(
        server,
        "/en/mylist.php",
        &[("list_id", "5"), ("page", "1")],
        list_page("Best: of all", &[("1", "Alien", "9"), ("2", "Heat", "8")]),
        1,
    )
    .await;

    mount_not_found(server, "/en/userratings.php", &[("p", "2")]).await;
    mount(
        server,
        "/en/userratings.php",
        &[("user_id", USER), ("p", "1")],
        watched_page(&[("1", "Alien", "9"), ("3", "Ran", "10"), ("4", "Jaws", " 7 ")]),
        watched_hits,
    )
    .await;
}

#[tokio::test]
async fn test_full_backup() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, 1).await;

    let data_dir = TempDir::new().unwrap();
    let user_dir = data_dir.path().join(USER);
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("stale.csv"), "old").unwrap();

    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);
    let mut options = BackupOptions::new(USER, data_dir.path());
    options.letterboxd = true;

    let outcome = BackupRunner::new(scraper(&fetcher, &config), options, |_: &str| {
        panic!("no confirmation expected")
    })
    .run()
    .await
    .unwrap();

    let BackupOutcome::Completed(stats) = outcome else {
        panic!("backup was not completed");
    };
    assert_eq!(stats.datasets.len(), 2);
    assert_eq!(stats.count(DatasetOrigin::Scraped), 2);
    assert_eq!(stats.get("list - Best: of all").map(|d| d.rows), Some(2));
    assert_eq!(stats.get("watched").map(|d| d.rows), Some(3));

    // Fresh runs start from an empty directory
    assert!(!user_dir.join("stale.csv").exists());

    let list = read_backup_csv_from_path(&user_dir.join("list - Best_ of all.csv")).unwrap();
    assert_eq!(list.column("title").unwrap(), &["Alien", "Heat"]);

    let watched = read_backup_csv_from_path(&user_dir.join("watched.csv")).unwrap();
    assert_eq!(watched.names().next(), Some("genre"));
    assert_eq!(watched.column("movie id").unwrap(), &["1", "3", "4"]);

    let letterboxd = std::fs::read_to_string(user_dir.join("letterboxd.csv")).unwrap();
    assert_eq!(
        letterboxd,
        "Title,Year,Rating10,WatchedDate\nAlien,2001,9,\nRan,2001,10,\nJaws,2001,7,\n"
    );

    // A completed run leaves no checkpoint behind
    assert!(!user_dir.join(SESSION_FILE).exists());
}

#[tokio::test]
async fn test_resume_skips_finished_datasets() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, 0).await;

    let data_dir = TempDir::new().unwrap();
    let user_dir = data_dir.path().join(USER);
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(
        user_dir.join("watched.csv"),
        "genre;title;original title;year;country;user score;avg score;movie id;directors\n\
         ;Stalker;;1979;Soviet Union;10;8.1;77;Andrei Tarkovsky\n",
    )
    .unwrap();

    let mut session = Session::in_dir(&user_dir);
    session.begin(&user_dir.display().to_string());
    session.mark_processed("watched", 1);
    session.save().unwrap();

    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);
    let mut options = BackupOptions::new(USER, data_dir.path());
    options.resume = true;

    let outcome = BackupRunner::new(scraper(&fetcher, &config), options, |_: &str| true)
        .run()
        .await
        .unwrap();

    let BackupOutcome::Completed(stats) = outcome else {
        panic!("backup was not completed");
    };
    let watched = stats.get("watched").unwrap();
    assert_eq!(watched.origin, DatasetOrigin::Resumed);
    assert_eq!(watched.rows, 1);
    assert_eq!(
        stats.get("list - Best: of all").map(|d| d.origin),
        Some(DatasetOrigin::Scraped)
    );

    // The reused file is untouched
    let reloaded = read_backup_csv_from_path(&user_dir.join("watched.csv")).unwrap();
    assert_eq!(reloaded.column("title").unwrap(), &["Stalker"]);
    assert!(!user_dir.join(SESSION_FILE).exists());
}

#[tokio::test]
async fn test_declining_without_lists_aborts() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/en/userlists.php", &[], lists_page(&[]), 2).await;
    mount(
        &mock_server,
        "/en/userratings.php",
        &[],
        watched_page(&[("1", "Alien", "9")]),
        0,
    )
    .await;

    let data_dir = TempDir::new().unwrap();
    let user_dir = data_dir.path().join(USER);
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("list - Keep.csv"), "title\nKept\n").unwrap();

    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);
    let mut asked = Vec::new();

    let outcome = BackupRunner::new(
        scraper(&fetcher, &config),
        BackupOptions::new(USER, data_dir.path()),
        |prompt: &str| {
            asked.push(prompt.to_string());
            false
        },
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, BackupOutcome::Aborted);
    assert_eq!(asked.len(), 1);
    // Nothing is erased when the user declines
    assert!(user_dir.join("list - Keep.csv").exists());
}

#[tokio::test]
async fn test_unknown_user_writes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/userlists.php"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);

    let result = BackupRunner::new(
        scraper(&fetcher, &config),
        BackupOptions::new(USER, data_dir.path()),
        |_: &str| true,
    )
    .run()
    .await;

    assert!(matches!(
        result,
        Err(rating_vault::VaultError::UserNotFound { .. })
    ));
    assert!(!data_dir.path().join(USER).exists());
}

#[tokio::test]
async fn test_path_like_user_id_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(watched_page(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let data_dir = root.path().join("data");
    let victim = root.path().join("victim");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::create_dir_all(&victim).unwrap();
    std::fs::write(victim.join("precious.txt"), "keep me").unwrap();

    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);
    let mut options = BackupOptions::new("../victim", &data_dir);
    options.skip_lists = true;

    let result = BackupRunner::new(scraper(&fetcher, &config), options, |_: &str| true)
        .run()
        .await;

    assert!(matches!(
        result,
        Err(rating_vault::VaultError::InvalidUserId { .. })
    ));
    assert!(victim.join("precious.txt").exists());
    let entries: Vec<_> = std::fs::read_dir(&victim).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_lists_with_colliding_file_names_are_kept_apart() {
    let mock_server = MockServer::start().await;

    mount_not_found(&mock_server, "/en/userlists.php", &[("p", "2")]).await;
    mount(
        &mock_server,
        "/en/userlists.php",
        &[],
        lists_page(&[
            ("A/B", "/en/mylist.php?list_id=5"),
            ("A:B", "/en/mylist.php?list_id=6"),
        ]),
        2,
    )
    .await;

    mount_not_found(&mock_server, "/en/mylist.php", &[("page", "2")]).await;
    mount(
        &mock_server,
        "/en/mylist.php",
        &[("list_id", "5"), ("page", "1")],
        list_page("A/B", &[("1", "Alien", "9")]),
        1,
    )
    .await;
    mount(
        &mock_server,
        "/en/mylist.php",
        &[("list_id", "6"), ("page", "1")],
        list_page("A:B", &[("2", "Heat", "8"), ("3", "Ran", "10")]),
        1,
    )
    .await;

    mount_not_found(&mock_server, "/en/userratings.php", &[("p", "2")]).await;
    mount(
        &mock_server,
        "/en/userratings.php",
        &[("user_id", USER), ("p", "1")],
        watched_page(&[("1", "Alien", "9")]),
        1,
    )
    .await;

    let data_dir = TempDir::new().unwrap();
    let user_dir = data_dir.path().join(USER);
    let config = test_config(&mock_server.uri(), Language::En);
    let fetcher = fetcher(&config);

    let outcome = BackupRunner::new(
        scraper(&fetcher, &config),
        BackupOptions::new(USER, data_dir.path()),
        |_: &str| true,
    )
    .run()
    .await
    .unwrap();

    let BackupOutcome::Completed(stats) = outcome else {
        panic!("backup was not completed");
    };
    assert_eq!(stats.get("list - A/B").map(|d| d.rows), Some(1));
    assert_eq!(stats.get("list - A:B (2)").map(|d| d.rows), Some(2));

    let first = read_backup_csv_from_path(&user_dir.join("list - A_B.csv")).unwrap();
    assert_eq!(first.column("title").unwrap(), &["Alien"]);
    let second = read_backup_csv_from_path(&user_dir.join("list - A_B (2).csv")).unwrap();
    assert_eq!(second.column("title").unwrap(), &["Heat", "Ran"]);
}
