use honyaku_core::model::{
    Difficulty, Question, QuestionFilter, QuestionId, ScoreSubmission, SessionId, SessionSummary,
};
use honyaku_core::time::fixed_now;
use storage::repository::{QuestionSource, ScoreSink, StorageError};
use storage::sqlite::SqliteRepository;

fn build_question(id: u64, prompt: &str, answer: &str, difficulty: Difficulty) -> Question {
    Question::new(QuestionId::new(id), prompt, answer, difficulty).unwrap()
}

fn build_submission(session_id: SessionId, score: u32) -> ScoreSubmission {
    let started = fixed_now();
    let completed = started + chrono::Duration::milliseconds(42_300);
    let summary = SessionSummary::from_parts(started, completed, 1, 1, 0, 0).unwrap();
    let mut submission =
        ScoreSubmission::from_summary(session_id, Difficulty::Normal, 1, &summary, completed);
    submission.score = score;
    submission
}

#[tokio::test]
async fn sqlite_roundtrips_the_question_bank() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_questions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let easy = build_question(1, "私は学生です。", "I am a student.", Difficulty::Easy)
        .with_category("daily-life")
        .with_sub_category("introductions");
    let normal = build_question(
        2,
        "彼は昨日ここに来ました。",
        "He came here yesterday.",
        Difficulty::Normal,
    )
    .with_category("daily-life");
    let travel = build_question(3, "駅はどこですか？", "Where is the station?", Difficulty::Normal)
        .with_category("travel");

    repo.upsert_question(&easy).await.unwrap();
    repo.upsert_question(&normal).await.unwrap();
    repo.upsert_question(&travel).await.unwrap();

    let fetched = repo
        .fetch_questions(&QuestionFilter::difficulty(Difficulty::Easy))
        .await
        .unwrap();
    assert_eq!(fetched, vec![easy.clone()]);

    let by_category = repo
        .fetch_questions(&QuestionFilter::difficulty(Difficulty::Normal).with_category("travel"))
        .await
        .unwrap();
    assert_eq!(by_category, vec![travel]);

    let with_sub = repo
        .fetch_questions(
            &QuestionFilter::difficulty(Difficulty::Easy)
                .with_category("daily-life")
                .with_sub_category("introductions"),
        )
        .await
        .unwrap();
    assert_eq!(with_sub, vec![easy.clone()]);

    let fetched_by_id = repo.get_question(QuestionId::new(1)).await.unwrap();
    assert_eq!(fetched_by_id, easy);
}

#[tokio::test]
async fn upsert_replaces_the_existing_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let original = build_question(1, "これはペンです。", "This is a pen.", Difficulty::Easy);
    repo.upsert_question(&original).await.unwrap();

    let revised = build_question(1, "これはペンです。", "It is a pen.", Difficulty::Easy);
    repo.upsert_question(&revised).await.unwrap();

    let fetched = repo
        .fetch_questions(&QuestionFilter::difficulty(Difficulty::Easy))
        .await
        .unwrap();
    assert_eq!(fetched, vec![revised]);
}

#[tokio::test]
async fn malformed_persisted_rows_are_skipped() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_question(&build_question(
        1,
        "猫が好きです。",
        "I like cats.",
        Difficulty::Easy,
    ))
    .await
    .unwrap();

    // Blank answers cannot be written through the repository API, so force
    // one directly to simulate a corrupted bank.
    sqlx::query(
        "INSERT INTO questions (id, prompt, expected_answer, difficulty) VALUES (2, '犬', ' ', 1)",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let fetched = repo
        .fetch_questions(&QuestionFilter::difficulty(Difficulty::Easy))
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id(), QuestionId::new(1));
}

#[tokio::test]
async fn delete_all_questions_empties_the_bank() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_delete?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_question(&build_question(
        1,
        "私は学生です。",
        "I am a student.",
        Difficulty::Easy,
    ))
    .await
    .unwrap();
    repo.upsert_question(&build_question(
        2,
        "これはペンです。",
        "This is a pen.",
        Difficulty::Easy,
    ))
    .await
    .unwrap();

    let removed = repo.delete_all_questions().await.unwrap();
    assert_eq!(removed, 2);

    let fetched = repo
        .fetch_questions(&QuestionFilter::difficulty(Difficulty::Easy))
        .await
        .unwrap();
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn persisting_a_session_score_twice_keeps_one_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scores?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let session_id = SessionId::generate();
    let submission = build_submission(session_id, 70);

    let first = repo.persist_score(&submission).await.unwrap();
    let second = repo.persist_score(&submission).await.unwrap();
    assert_eq!(first, second);

    let stored = repo.get_score(session_id).await.unwrap();
    assert_eq!(stored.session_id, session_id);
    assert_eq!(stored.score, 70);
    assert_eq!(stored.difficulty, 2);
    assert_eq!(stored.stage, 1);
    assert!((stored.elapsed_seconds - 42.3).abs() < f64::EPSILON);
}

#[tokio::test]
async fn scores_for_distinct_sessions_get_distinct_rows() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scores_two?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = repo
        .persist_score(&build_submission(SessionId::generate(), 10))
        .await
        .unwrap();
    let second = repo
        .persist_score(&build_submission(SessionId::generate(), 20))
        .await
        .unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn missing_score_reports_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo.get_score(SessionId::generate()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    repo.upsert_question(&build_question(
        1,
        "私は学生です。",
        "I am a student.",
        Difficulty::Easy,
    ))
    .await
    .unwrap();
}
