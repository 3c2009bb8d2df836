/*!
 * Key store behaviour against an on-disk database
 */

use locsync::database::KeyStore;
use locsync::errors::StoreError;

use crate::common;

#[tokio::test]
async fn test_upsert_twiceWithSameText_shouldLeaveOneEntry() {
    let dir = common::create_temp_dir().unwrap();
    let repo = common::file_repository(&dir);

    repo.upsert("en", "common.speed", "Speed").await.unwrap();
    repo.upsert("en", "common.speed", "Speed").await.unwrap();

    assert_eq!(repo.count_keys("en").await.unwrap(), 1);
    assert_eq!(repo.get_text("en", "common.speed").await.unwrap().as_deref(), Some("Speed"));
}

#[tokio::test]
async fn test_entries_shouldSurviveReopen() {
    let dir = common::create_temp_dir().unwrap();

    {
        let repo = common::file_repository(&dir);
        repo.upsert("ru", "common.up", "Вверх").await.unwrap();
    }

    let reopened = common::file_repository(&dir);
    assert_eq!(
        reopened.export_locale("ru").await.unwrap(),
        common::text_map(&[("common.up", "Вверх")])
    );
}

/// The third of five rows is rejected by the database; nothing may be committed
#[tokio::test]
async fn test_bulkImport_withFailingRow_shouldCommitNone() {
    let dir = common::create_temp_dir().unwrap();
    let repo = common::file_repository(&dir);
    repo.upsert("de", "vpn.connect", "Verbinden").await.unwrap();

    repo.connection()
        .execute(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_k3 BEFORE INSERT ON translations
                 WHEN NEW.key = 'k3'
                 BEGIN SELECT RAISE(ABORT, 'rejected k3'); END;",
            )?;
            Ok(())
        })
        .unwrap();

    let entries = common::text_map(&[
        ("batch.k1", "Eins"),
        ("batch.k2", "Zwei"),
        ("batch.k3", "Drei"),
        ("batch.k4", "Vier"),
        ("batch.k5", "Fünf"),
    ]);

    let result = repo.bulk_import("de", &entries).await;

    match result {
        Err(StoreError::Import { locale, reason }) => {
            assert_eq!(locale, "de");
            assert!(reason.contains("rejected k3"), "reason was: {}", reason);
        }
        other => panic!("expected import failure, got {:?}", other),
    }
    assert_eq!(
        repo.export_locale("de").await.unwrap(),
        common::text_map(&[("vpn.connect", "Verbinden")])
    );
}

#[tokio::test]
async fn test_bulkImport_withValidRows_shouldCommitAll() {
    let dir = common::create_temp_dir().unwrap();
    let repo = common::file_repository(&dir);

    let entries = common::text_map(&[("a.one", "1"), ("a.two", "2"), ("b.one", "3")]);
    repo.bulk_import("fr", &entries).await.unwrap();

    assert_eq!(repo.export_locale("fr").await.unwrap(), entries);
    assert_eq!(repo.connection().stats().unwrap().entry_count, 3);
}

#[tokio::test]
async fn test_exportLocale_asJson_shouldPreserveUnicode() {
    let repo = common::repository_with(&[("zh", "common.up", "向上"), ("zh", "common.down", "向下")]).await;

    let json = serde_json::to_string_pretty(&repo.export_locale("zh").await.unwrap()).unwrap();

    assert!(json.contains("\"common.up\": \"向上\""));
    assert!(json.find("common.down").unwrap() < json.find("common.up").unwrap());
}

#[tokio::test]
async fn test_getText_withInvalidKey_shouldBeInvalidKey() {
    let repo = common::repository_with(&[]).await;
    assert_eq!(
        repo.get_text("en", ".speed").await,
        Err(StoreError::InvalidKey(".speed".to_string()))
    );
}
