//! Service-level tests: access checks, quotas and the media lifecycle over a
//! real SQLite store and an in-memory blob store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use boxrepo::blob::{BlobError, BlobStore, MemoryBlobStore};
use boxrepo::error::Error;
use boxrepo::policy::has_access;
use boxrepo::service::{BoxPatch, MAX_MEDIA_SIZE_BYTES, MediaPatch, Services, Upload};
use boxrepo::store::{SqliteStore, Store};
use boxrepo::types::{AccountType, MediaState, Role, RoleSet, User};

struct Harness {
    _temp: TempDir,
    store: Arc<SqliteStore>,
    blobs: Arc<MemoryBlobStore>,
    services: Services,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let store = Arc::new(SqliteStore::new(temp.path().join("boxrepo.db")).expect("open db"));
        store.initialize().expect("initialize");
        let blobs = Arc::new(MemoryBlobStore::new());

        let services = Services::new(store.clone(), blobs.clone());
        Self {
            _temp: temp,
            store,
            blobs,
            services,
        }
    }

    fn user(&self, name: &str, tier: Option<AccountType>) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.store.create_user(&user).expect("create user");

        if let Some(tier) = tier {
            let months = (tier == AccountType::Paid).then_some(12);
            self.services
                .accounts
                .create_account(&user, tier, months)
                .expect("create account");
        }
        user
    }
}

fn upload(name: &str, data: &[u8]) -> Upload {
    Upload {
        file_name: name.to_string(),
        data: Some(Bytes::copy_from_slice(data)),
    }
}

/// Blob store whose puts and deletes can be made to fail.
#[derive(Default)]
struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
}

#[async_trait::async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(BlobError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BlobError::Io(std::io::Error::other("backend unavailable")));
        }
        self.inner.delete(key).await
    }
}

#[test]
fn repo_creation_grants_exactly_one_owner_row() {
    let h = Harness::new();
    let alice = h.user("alice", None);

    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();

    let access = h.store.list_repo_access(repo.id).unwrap();
    assert_eq!(access.len(), 1);
    assert_eq!(access[0].user_id, alice.id);
    assert_eq!(access[0].role, Role::Owner);
}

#[test]
fn user_without_access_row_is_denied_everything() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let bob = h.user("bob", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();

    for required in [RoleSet::ANY, RoleSet::MANAGE, RoleSet::OWNER] {
        assert!(!has_access(h.store.as_ref(), &bob.id, repo.id, required).unwrap());
    }
}

#[test]
fn free_tier_sixth_repo_is_denied_and_paid_is_not() {
    let h = Harness::new();
    let free = h.user("free", Some(AccountType::Free));
    let paid = h.user("paid", Some(AccountType::Paid));

    for i in 0..5 {
        h.services.repos.create_repo(&free, &format!("r{i}")).unwrap();
        h.services.repos.create_repo(&paid, &format!("r{i}")).unwrap();
    }

    let err = h.services.repos.create_repo(&free, "r5").unwrap_err();
    assert!(matches!(
        err,
        Error::QuotaExceeded {
            resource: "repo",
            limit: 5
        }
    ));
    assert!(err.is_denial());
    assert_eq!(h.store.count_user_repos(&free.id).unwrap(), 5);

    h.services.repos.create_repo(&paid, "r5").unwrap();
    assert_eq!(h.store.count_user_repos(&paid.id).unwrap(), 6);
}

#[test]
fn user_without_account_is_held_to_free_limits() {
    let h = Harness::new();
    let alice = h.user("alice", None);

    for i in 0..5 {
        h.services.repos.create_repo(&alice, &format!("r{i}")).unwrap();
    }
    assert!(matches!(
        h.services.repos.create_repo(&alice, "r5"),
        Err(Error::QuotaExceeded { .. })
    ));
}

#[test]
fn free_tier_sixth_box_is_denied_until_upgrade() {
    let h = Harness::new();
    let alice = h.user("alice", Some(AccountType::Free));
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();

    for i in 0..5 {
        h.services
            .boxes
            .create_box(&alice, repo.id, &format!("b{i}"), "")
            .unwrap();
    }

    assert!(matches!(
        h.services.boxes.create_box(&alice, repo.id, "b5", ""),
        Err(Error::QuotaExceeded {
            resource: "box",
            limit: 5
        })
    ));
    assert_eq!(h.store.count_boxes(repo.id).unwrap(), 5);

    h.services
        .accounts
        .create_account(&alice, AccountType::Paid, Some(3))
        .unwrap();
    h.services
        .boxes
        .create_box(&alice, repo.id, "b5", "")
        .unwrap();
    assert_eq!(h.store.count_boxes(repo.id).unwrap(), 6);
}

#[test]
fn upgrading_keeps_one_current_account() {
    let h = Harness::new();
    let alice = h.user("alice", Some(AccountType::Free));

    h.services
        .accounts
        .create_account(&alice, AccountType::Paid, Some(1))
        .unwrap();

    let current = h.services.accounts.current_account(&alice).unwrap();
    assert_eq!(current.account_type, AccountType::Paid);

    let history = h.services.accounts.list_accounts(&alice).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|a| a.is_current()).count(), 1);

    assert!(matches!(
        h.services
            .accounts
            .create_account(&alice, AccountType::Paid, Some(2)),
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn upload_size_limit_applies_to_owner() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();

    let limit = MAX_MEDIA_SIZE_BYTES as usize;
    let err = h
        .services
        .media
        .upload(&alice, repo_box.id, upload("big.bin", &vec![0u8; limit + 1]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FileTooLarge { max, .. } if max == MAX_MEDIA_SIZE_BYTES));
    assert!(h.store.list_media(repo_box.id).unwrap().is_empty());
    assert!(h.blobs.is_empty());

    let media = h
        .services
        .media
        .upload(&alice, repo_box.id, upload("exact.bin", &vec![0u8; limit]))
        .await
        .unwrap();
    assert_eq!(media.state, MediaState::Ready);
    assert_eq!(media.size_bytes, limit as i64);
    assert!(h.blobs.contains(&media.storage_key()));
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();

    let result = h
        .services
        .media
        .upload(
            &alice,
            repo_box.id,
            Upload {
                file_name: "a.jpg".to_string(),
                data: None,
            },
        )
        .await;
    assert!(matches!(result, Err(Error::Validation(msg)) if msg == "file is required"));
}

#[tokio::test]
async fn viewer_reads_but_cannot_mutate() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let vera = h.user("vera", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();
    let media = h
        .services
        .media
        .upload(&alice, repo_box.id, upload("a.jpg", b"jpeg bytes"))
        .await
        .unwrap();

    h.services
        .repos
        .grant_access(&alice, repo.id, &vera.id, Role::Viewer)
        .unwrap();

    let (meta, data) = h.services.media.download(&vera, media.id).await.unwrap();
    assert_eq!(meta.id, media.id);
    assert_eq!(&data[..], b"jpeg bytes");
    assert!(h.services.media.metadata(&vera, media.id).is_ok());

    assert!(matches!(
        h.services.boxes.update_box(
            &vera,
            repo_box.id,
            BoxPatch {
                name: Some("renamed".into()),
                description: None
            }
        ),
        Err(Error::AccessDenied)
    ));
    assert!(matches!(
        h.services
            .media
            .upload(&vera, repo_box.id, upload("b.jpg", b"x"))
            .await,
        Err(Error::AccessDenied)
    ));
    assert!(matches!(
        h.services
            .media
            .update(
                &vera,
                media.id,
                MediaPatch {
                    file_name: Some("c.jpg".into()),
                    data: None
                }
            )
            .await,
        Err(Error::AccessDenied)
    ));
    assert!(matches!(
        h.services.media.delete(&vera, media.id).await,
        Err(Error::AccessDenied)
    ));
    assert!(h.blobs.contains(&media.storage_key()));
}

#[test]
fn end_to_end_grant_flow() {
    let h = Harness::new();
    let a = h.user("user-a", None);
    let b = h.user("user-b", None);

    let r1 = h.services.repos.create_repo(&a, "R1").unwrap();
    assert_eq!(
        h.store.list_user_roles(&a.id, r1.id).unwrap(),
        vec![Role::Owner]
    );

    h.services.boxes.create_box(&a, r1.id, "B1", "").unwrap();

    assert!(matches!(
        h.services.repos.get_repo(&b, r1.id),
        Err(Error::AccessDenied)
    ));

    h.services
        .repos
        .grant_access(&a, r1.id, &b.id, Role::Viewer)
        .unwrap();

    assert_eq!(h.services.repos.get_repo(&b, r1.id).unwrap().name, "R1");
    assert!(matches!(
        h.services.boxes.create_box(&b, r1.id, "B2", ""),
        Err(Error::AccessDenied)
    ));
    assert_eq!(h.services.boxes.list_boxes(&b, r1.id).unwrap().len(), 1);
}

#[test]
fn denied_grant_persists_nothing() {
    let h = Harness::new();
    let a = h.user("user-a", None);
    let b = h.user("user-b", None);
    let c = h.user("user-c", None);
    let r1 = h.services.repos.create_repo(&a, "R1").unwrap();
    h.services
        .repos
        .grant_access(&a, r1.id, &b.id, Role::Viewer)
        .unwrap();

    assert!(matches!(
        h.services.repos.grant_access(&b, r1.id, &c.id, Role::Admin),
        Err(Error::AccessDenied)
    ));
    assert!(h.store.list_user_roles(&c.id, r1.id).unwrap().is_empty());

    assert!(matches!(
        h.services.repos.grant_access(&a, r1.id, "no-such-user", Role::Viewer),
        Err(Error::NotFound("user"))
    ));
}

#[test]
fn missing_resources_are_not_found_before_access() {
    let h = Harness::new();
    let a = h.user("user-a", None);

    assert!(matches!(
        h.services.repos.get_repo(&a, 404),
        Err(Error::NotFound("repo"))
    ));
    assert!(matches!(
        h.services.boxes.get_box(&a, 404),
        Err(Error::NotFound("box"))
    ));
    assert!(matches!(
        h.services.media.metadata(&a, 404),
        Err(Error::NotFound("media"))
    ));
}

#[tokio::test]
async fn only_owner_deletes_repo() {
    let h = Harness::new();
    let a = h.user("user-a", None);
    let b = h.user("user-b", None);
    let r1 = h.services.repos.create_repo(&a, "R1").unwrap();
    h.services
        .repos
        .grant_access(&a, r1.id, &b.id, Role::Admin)
        .unwrap();

    assert!(matches!(
        h.services.repos.delete_repo(&b, r1.id).await,
        Err(Error::AccessDenied)
    ));

    let renamed = h.services.repos.rename_repo(&b, r1.id, "Renamed").unwrap();
    assert!(renamed.updated_at > r1.updated_at);
}

#[tokio::test]
async fn deleting_media_removes_blob_and_row() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();
    let media = h
        .services
        .media
        .upload(&alice, repo_box.id, upload("a.jpg", b"bytes"))
        .await
        .unwrap();
    let key = media.storage_key();
    assert_eq!(
        key,
        format!("repo_{}/box_{}/file_{}", repo.id, repo_box.id, media.id)
    );

    h.services.media.delete(&alice, media.id).await.unwrap();

    assert!(!h.blobs.contains(&key));
    assert!(matches!(
        h.services.media.metadata(&alice, media.id),
        Err(Error::NotFound("media"))
    ));
    assert!(matches!(
        h.services.media.download(&alice, media.id).await,
        Err(Error::NotFound("media"))
    ));
}

#[tokio::test]
async fn media_update_overwrites_blob_and_metadata() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();
    let media = h
        .services
        .media
        .upload(&alice, repo_box.id, upload("a.jpg", b"old"))
        .await
        .unwrap();

    let updated = h
        .services
        .media
        .update(
            &alice,
            media.id,
            MediaPatch {
                file_name: Some("b.jpg".into()),
                data: Some(Bytes::from_static(b"newer")),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.file_name, "b.jpg");
    assert_eq!(updated.size_bytes, 5);
    assert_ne!(updated.checksum, media.checksum);
    assert!(updated.updated_at > media.updated_at);

    let (_, data) = h.services.media.download(&alice, media.id).await.unwrap();
    assert_eq!(&data[..], b"newer");

    assert!(matches!(
        h.services
            .media
            .update(&alice, media.id, MediaPatch::default())
            .await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn deleting_box_and_repo_cleans_up_blobs() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let b1 = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();
    let b2 = h.services.boxes.create_box(&alice, repo.id, "B2", "").unwrap();
    for (i, b) in [&b1, &b1, &b2].into_iter().enumerate() {
        h.services
            .media
            .upload(&alice, b.id, upload(&format!("{i}.jpg"), b"x"))
            .await
            .unwrap();
    }
    assert_eq!(h.blobs.len(), 3);

    h.services.boxes.delete_box(&alice, b1.id).await.unwrap();
    assert_eq!(h.blobs.len(), 1);
    assert!(matches!(
        h.services.boxes.get_box(&alice, b1.id),
        Err(Error::NotFound("box"))
    ));

    h.services.repos.delete_repo(&alice, repo.id).await.unwrap();
    assert!(h.blobs.is_empty());
    assert!(h.store.get_repo(repo.id).unwrap().is_none());
    assert!(h.services.repos.list_repos(&alice).unwrap().is_empty());
}

#[tokio::test]
async fn blob_failures_keep_metadata_consistent() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::new(temp.path().join("boxrepo.db")).unwrap());
    store.initialize().unwrap();
    let blobs = Arc::new(FlakyBlobStore::default());
    let services = Services::new(store.clone(), blobs.clone());

    let now = Utc::now();
    let alice = User {
        id: "alice".into(),
        name: "alice".into(),
        created_at: now,
        updated_at: now,
    };
    store.create_user(&alice).unwrap();
    let repo = services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();

    // A failed put leaves no PENDING row behind.
    blobs.fail_put.store(true, Ordering::SeqCst);
    let result = services
        .media
        .upload(&alice, repo_box.id, upload("a.jpg", b"x"))
        .await;
    assert!(matches!(result, Err(Error::Blob(_))));
    assert!(store.list_media(repo_box.id).unwrap().is_empty());
    blobs.fail_put.store(false, Ordering::SeqCst);

    // A failed delete keeps the row and the blob.
    let media = services
        .media
        .upload(&alice, repo_box.id, upload("a.jpg", b"x"))
        .await
        .unwrap();
    blobs.fail_delete.store(true, Ordering::SeqCst);
    assert!(matches!(
        services.media.delete(&alice, media.id).await,
        Err(Error::Blob(_))
    ));
    assert!(store.get_media(media.id).unwrap().is_some());
    assert!(blobs.inner.contains(&media.storage_key()));

    assert!(matches!(
        services.repos.delete_repo(&alice, repo.id).await,
        Err(Error::Blob(_))
    ));
    assert!(store.get_repo(repo.id).unwrap().is_some());
}

#[tokio::test]
async fn pending_media_is_not_downloadable() {
    let h = Harness::new();
    let alice = h.user("alice", None);
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    let repo_box = h.services.boxes.create_box(&alice, repo.id, "B1", "").unwrap();

    let pending = h
        .store
        .create_media(&boxrepo::types::NewBoxMedia {
            box_id: repo_box.id,
            user_id: alice.id.clone(),
            file_name: "stuck.jpg".into(),
        })
        .unwrap();

    assert!(matches!(
        h.services.media.download(&alice, pending.id).await,
        Err(Error::NotFound("media"))
    ));

    // Deleting a pending row succeeds even though no blob was written.
    h.services.media.delete(&alice, pending.id).await.unwrap();
    assert!(h.store.get_media(pending.id).unwrap().is_none());
}

#[test]
fn concurrent_box_creates_at_the_limit_admit_one() {
    let h = Harness::new();
    let alice = h.user("alice", Some(AccountType::Free));
    let repo = h.services.repos.create_repo(&alice, "R1").unwrap();
    for i in 0..4 {
        h.services
            .boxes
            .create_box(&alice, repo.id, &format!("B{i}"), "")
            .unwrap();
    }

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (h, alice) = (&h, &alice);
                s.spawn(move || {
                    h.services
                        .boxes
                        .create_box(alice, repo.id, &format!("racer-{i}"), "")
                })
            })
            .collect();
        handles.into_iter().map(|t| t.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, Error::QuotaExceeded { .. }))
    );
    assert_eq!(h.store.count_boxes(repo.id).unwrap(), 5);
}

#[test]
fn concurrent_repo_creates_at_the_limit_admit_one() {
    let h = Harness::new();
    let alice = h.user("alice", Some(AccountType::Free));
    for i in 0..4 {
        h.services
            .repos
            .create_repo(&alice, &format!("R{i}"))
            .unwrap();
    }

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (h, alice) = (&h, &alice);
                s.spawn(move || h.services.repos.create_repo(alice, &format!("racer-{i}")))
            })
            .collect();
        handles.into_iter().map(|t| t.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(h.store.count_user_repos(&alice.id).unwrap(), 5);
}
